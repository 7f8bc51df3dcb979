//! Timed spell instances currently affecting an actor.

use crate::magic::{EffectId, EffectKey};
use crate::state::{ActorId, ItemHandle, RefId};

/// Where an active spell instance came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceKind {
    Spell,
    Enchantment,
    Potion,
    Ingredient,
}

/// One effect of an active spell instance.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub key: EffectKey,
    pub magnitude: f32,
    /// Total duration in seconds.
    pub duration: f32,
    pub time_left: f32,
    /// Instant part of the effect has been applied.
    pub applied: bool,
}

impl ActiveEffect {
    pub fn new(key: impl Into<EffectKey>, magnitude: f32, duration: f32) -> Self {
        Self {
            key: key.into(),
            magnitude,
            duration,
            time_left: duration,
            applied: false,
        }
    }

    pub fn id(&self) -> EffectId {
        self.key.id
    }
}

/// A spell (or potion, or enchantment cast) currently running on an actor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveSpellParams {
    /// Spell id, or the record id of the item that produced the effects.
    pub source_id: RefId,
    pub source_kind: SourceKind,
    pub caster: ActorId,
    pub item: Option<ItemHandle>,
    pub effects: Vec<ActiveEffect>,
}

impl ActiveSpellParams {
    pub fn new(
        source_id: impl Into<RefId>,
        source_kind: SourceKind,
        caster: ActorId,
        effects: Vec<ActiveEffect>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            source_kind,
            caster,
            item: None,
            effects,
        }
    }
}

/// Ordered list of active spell instances.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveSpells {
    spells: Vec<ActiveSpellParams>,
}

impl ActiveSpells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, params: ActiveSpellParams) {
        self.spells.push(params);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveSpellParams> {
        self.spells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActiveSpellParams> {
        self.spells.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    pub fn is_spell_active(&self, source_id: &RefId) -> bool {
        self.spells.iter().any(|spell| &spell.source_id == source_id)
    }

    /// Spell `source_id` is running here and was cast by `caster`.
    pub fn is_spell_active_from(&self, caster: ActorId, source_id: &RefId) -> bool {
        self.spells
            .iter()
            .any(|spell| spell.caster == caster && &spell.source_id == source_id)
    }

    /// Longest remaining time among the effects of `source_id`.
    pub fn remaining_duration(&self, source_id: &RefId) -> f32 {
        self.spells
            .iter()
            .filter(|spell| &spell.source_id == source_id)
            .flat_map(|spell| spell.effects.iter())
            .map(|effect| effect.time_left)
            .fold(0.0, f32::max)
    }

    /// Removes effect `id` from instances produced by `source_id`.
    pub fn purge_effect_from(&mut self, id: EffectId, source_id: &RefId) {
        for spell in self.spells.iter_mut().filter(|s| &s.source_id == source_id) {
            spell.effects.retain(|effect| effect.id() != id);
        }
        self.drop_empty();
    }

    /// Removes effect `id` from every instance.
    pub fn purge_effect(&mut self, id: EffectId) {
        for spell in &mut self.spells {
            spell.effects.retain(|effect| effect.id() != id);
        }
        self.drop_empty();
    }

    /// Removes every instance cast by `caster`.
    pub fn purge_caster(&mut self, caster: ActorId) {
        self.spells.retain(|spell| spell.caster != caster);
    }

    pub fn purge_source(&mut self, source_id: &RefId) {
        self.spells.retain(|spell| &spell.source_id != source_id);
    }

    pub fn clear(&mut self) {
        self.spells.clear();
    }

    /// Drops expired effects and instances left without effects.
    pub fn remove_expired(&mut self) {
        for spell in &mut self.spells {
            spell.effects.retain(|effect| effect.time_left > 0.0);
        }
        self.drop_empty();
    }

    fn drop_empty(&mut self) {
        self.spells.retain(|spell| !spell.effects.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spell(id: &str, caster: i32, effects: Vec<ActiveEffect>) -> ActiveSpellParams {
        ActiveSpellParams::new(id, SourceKind::Spell, ActorId(caster), effects)
    }

    #[test]
    fn purge_caster_removes_only_their_spells() {
        let mut active = ActiveSpells::new();
        active.add(spell(
            "fire bite",
            1,
            vec![ActiveEffect::new(EffectId::FireDamage, 5.0, 3.0)],
        ));
        active.add(spell(
            "shield",
            2,
            vec![ActiveEffect::new(EffectId::Shield, 10.0, 30.0)],
        ));

        active.purge_caster(ActorId(1));
        assert_eq!(active.len(), 1);
        assert!(active.is_spell_active(&RefId::new("shield")));
    }

    #[test]
    fn purging_last_effect_drops_the_instance() {
        let mut active = ActiveSpells::new();
        active.add(spell(
            "summon scamp",
            1,
            vec![ActiveEffect::new(EffectId::SummonScamp, 1.0, 60.0)],
        ));
        active.purge_effect_from(EffectId::SummonScamp, &RefId::new("summon scamp"));
        assert!(active.is_empty());
    }
}
