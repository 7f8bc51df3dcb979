//! Mutable per-actor simulation state shared by creatures and NPCs.

use std::collections::{BTreeMap, BTreeSet};

use crate::magic::{EffectId, MagicEffects};
use crate::state::{ActiveSpells, ActorId, AiSequence, RefId, Spells};
use crate::stats::{
    AiSetting, AiSettingValue, Attribute, AttributeValue, DynamicKind, DynamicStat,
};

/// Identifies one summoning source: the effect and the spell or item that carries it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummonKey {
    pub effect: EffectId,
    pub source: RefId,
}

impl SummonKey {
    pub fn new(effect: EffectId, source: impl Into<RefId>) -> Self {
        Self {
            effect,
            source: source.into(),
        }
    }
}

/// What the actor currently holds ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrawState {
    #[default]
    Nothing,
    Weapon,
    Spell,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureStats {
    pub level: i32,
    attributes: [AttributeValue; 8],
    dynamic: [DynamicStat; 3],
    ai_settings: [AiSettingValue; 4],

    pub magic_effects: MagicEffects,
    pub active_spells: ActiveSpells,
    pub spells: Spells,
    pub ai: AiSequence,

    dead: bool,
    death_anim_finished: bool,
    pub knocked_down: bool,
    pub draw_state: DrawState,

    /// Bound-item effects whose item is currently conjured.
    pub bound_items: BTreeSet<EffectId>,
    /// Item id displaced by each conjured bound item id, restored on dismissal.
    pub previous_items: BTreeMap<RefId, RefId>,
    pub summons: BTreeMap<SummonKey, ActorId>,
    /// Dismissed summons that could not be located yet.
    pub summon_graveyard: Vec<ActorId>,

    /// Last actor this one exchanged a hit attempt with.
    pub hit_attempt_actor: ActorId,
    pub werewolf: bool,
}

impl CreatureStats {
    pub fn new(level: i32) -> Self {
        Self {
            level,
            attributes: [AttributeValue::default(); 8],
            dynamic: [DynamicStat::default(); 3],
            ai_settings: [AiSettingValue::default(); 4],
            magic_effects: MagicEffects::new(),
            active_spells: ActiveSpells::new(),
            spells: Spells::new(),
            ai: AiSequence::new(),
            dead: false,
            death_anim_finished: false,
            knocked_down: false,
            draw_state: DrawState::Nothing,
            bound_items: BTreeSet::new(),
            previous_items: BTreeMap::new(),
            summons: BTreeMap::new(),
            summon_graveyard: Vec::new(),
            hit_attempt_actor: ActorId::NONE,
            werewolf: false,
        }
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn attribute(&self, attribute: Attribute) -> &AttributeValue {
        &self.attributes[attribute as usize]
    }

    pub fn attribute_mut(&mut self, attribute: Attribute) -> &mut AttributeValue {
        &mut self.attributes[attribute as usize]
    }

    pub fn set_attribute_base(&mut self, attribute: Attribute, base: f32) {
        self.attributes[attribute as usize].set_base(base);
    }

    // ========================================================================
    // Dynamic stats
    // ========================================================================

    pub fn dynamic(&self, kind: DynamicKind) -> &DynamicStat {
        &self.dynamic[kind as usize]
    }

    pub fn health(&self) -> &DynamicStat {
        self.dynamic(DynamicKind::Health)
    }

    pub fn magicka(&self) -> &DynamicStat {
        self.dynamic(DynamicKind::Magicka)
    }

    pub fn fatigue(&self) -> &DynamicStat {
        self.dynamic(DynamicKind::Fatigue)
    }

    /// Replaces a dynamic stat. Health dropping below 1 kills the actor.
    pub fn set_dynamic(&mut self, kind: DynamicKind, mut value: DynamicStat) {
        if kind == DynamicKind::Health && value.current() < 1.0 {
            value.set_current_modifier(0.0, false);
            value.set_current(0.0, false, false);
            self.dead = true;
        }
        self.dynamic[kind as usize] = value;
    }

    /// Edits a dynamic stat in place, then re-runs the death check.
    pub fn update_dynamic(&mut self, kind: DynamicKind, f: impl FnOnce(&mut DynamicStat)) {
        let mut value = self.dynamic[kind as usize];
        f(&mut value);
        self.set_dynamic(kind, value);
    }

    // ========================================================================
    // AI settings
    // ========================================================================

    pub fn ai_setting(&self, setting: AiSetting) -> &AiSettingValue {
        &self.ai_settings[setting as usize]
    }

    pub fn ai_setting_mut(&mut self, setting: AiSetting) -> &mut AiSettingValue {
        &mut self.ai_settings[setting as usize]
    }

    pub fn set_ai_setting_base(&mut self, setting: AiSetting, base: i32) {
        self.ai_settings[setting as usize].base = base;
    }

    // ========================================================================
    // Death and status
    // ========================================================================

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_death_anim_finished(&self) -> bool {
        self.death_anim_finished
    }

    pub fn set_death_anim_finished(&mut self, finished: bool) {
        self.death_anim_finished = finished;
    }

    /// Restores a dead actor to full health and forgets its death animation.
    pub fn resurrect(&mut self) {
        if !self.dead {
            return;
        }
        self.dead = false;
        self.death_anim_finished = false;
        let health = self.dynamic[DynamicKind::Health as usize];
        let full = health.modified();
        self.dynamic[DynamicKind::Health as usize] = health.with_current(full);
    }

    pub fn is_paralyzed(&self) -> bool {
        self.magic_effects.is_active(EffectId::Paralyze)
    }

    /// Actor can currently act on its own (not knocked down, paralyzed or dead).
    pub fn is_conscious(&self) -> bool {
        !self.dead && !self.knocked_down && !self.is_paralyzed()
    }

    pub fn has_active_summon(&self) -> bool {
        self.summons.values().any(|id| id.is_some())
    }
}

impl Default for CreatureStats {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_below_one_kills_and_zeroes() {
        let mut stats = CreatureStats::default();
        stats.set_dynamic(DynamicKind::Health, DynamicStat::new(40.0));
        assert!(!stats.is_dead());

        stats.update_dynamic(DynamicKind::Health, |health| {
            health.set_current(0.5, false, false)
        });
        assert!(stats.is_dead());
        assert_eq!(stats.health().current(), 0.0);
    }

    #[test]
    fn magicka_may_go_negative_without_death() {
        let mut stats = CreatureStats::default();
        stats.set_dynamic(DynamicKind::Health, DynamicStat::new(40.0));
        stats.set_dynamic(DynamicKind::Magicka, DynamicStat::new(10.0).with_current(-5.0));
        assert!(!stats.is_dead());
        assert_eq!(stats.magicka().current(), -5.0);
    }

    #[test]
    fn resurrect_restores_full_health() {
        let mut stats = CreatureStats::default();
        stats.set_dynamic(DynamicKind::Health, DynamicStat::new(40.0).with_current(0.0));
        stats.set_death_anim_finished(true);
        stats.resurrect();
        assert!(!stats.is_dead());
        assert!(!stats.is_death_anim_finished());
        assert_eq!(stats.health().current(), 40.0);
    }
}
