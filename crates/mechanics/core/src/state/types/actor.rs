//! A simulated actor and its transient character controller.

use bitflags::bitflags;

use crate::state::{ActorId, CreatureStats, NpcStats, ObjectHandle, RefId};
use crate::stats::{Skill, Specialization};

bitflags! {
    /// Movement capabilities and special markers of a creature record.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CreatureFlags: u8 {
        const BIPEDAL = 1 << 0;
        const FLIES = 1 << 1;
        const SWIMS = 1 << 2;
        const WALKS = 1 << 3;
        const ESSENTIAL = 1 << 4;
        /// Creature is allowed to use weapons.
        const WEAPON_AND_SHIELD = 1 << 5;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreatureKind {
    #[default]
    Creature,
    Daedra,
    Undead,
    Humanoid,
}

/// Creatures rate every skill by its specialization.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureSkills {
    pub combat: f32,
    pub magic: f32,
    pub stealth: f32,
}

impl CreatureSkills {
    pub const fn new(combat: f32, magic: f32, stealth: f32) -> Self {
        Self {
            combat,
            magic,
            stealth,
        }
    }

    pub fn value(&self, skill: Skill) -> f32 {
        match skill.specialization() {
            Specialization::Combat => self.combat,
            Specialization::Magic => self.magic,
            Specialization::Stealth => self.stealth,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureData {
    pub kind: CreatureKind,
    pub flags: CreatureFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: CreatureSkills,
}

impl CreatureData {
    pub const fn new(kind: CreatureKind, flags: CreatureFlags) -> Self {
        Self {
            kind,
            flags,
            skills: CreatureSkills::new(0.0, 0.0, 0.0),
        }
    }

    pub const fn with_skills(mut self, skills: CreatureSkills) -> Self {
        self.skills = skills;
        self
    }

    pub fn is_pure_water_creature(&self) -> bool {
        self.flags.contains(CreatureFlags::SWIMS)
            && !self
                .flags
                .intersects(CreatureFlags::WALKS | CreatureFlags::BIPEDAL | CreatureFlags::FLIES)
    }

    pub fn is_pure_flying_creature(&self) -> bool {
        self.flags.contains(CreatureFlags::FLIES)
            && !self
                .flags
                .intersects(CreatureFlags::WALKS | CreatureFlags::BIPEDAL | CreatureFlags::SWIMS)
    }

    pub fn is_pure_land_creature(&self) -> bool {
        !self
            .flags
            .intersects(CreatureFlags::SWIMS | CreatureFlags::FLIES)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorKind {
    Npc { essential: bool },
    Creature(CreatureData),
}

/// Outcome of one [`Actor::kill`] step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KillResult {
    DeathAnimStarted,
    DeathAnimPlaying,
    DeathAnimJustFinished,
    DeathAnimFinished,
    NoEffect,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum DeathPhase {
    #[default]
    Alive,
    Playing {
        elapsed: f32,
    },
    Done,
}

/// Animation-side state the registry owns next to each actor.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterController {
    death: DeathPhase,
    pub running: bool,
    pub sneaking: bool,
    pub ready_to_block: bool,
    pub attacking_or_spell: bool,
    pub casting_spell: bool,
    /// Animation updates run; false beyond the actors processing range.
    pub active: bool,
    pub visible: bool,
    /// Frozen in place by paralysis.
    pub frozen: bool,
    pub head_track_target: Option<ActorId>,
    pub light_equipped: bool,
    pub time_underwater: f32,
}

impl CharacterController {
    pub fn new() -> Self {
        Self {
            active: true,
            visible: true,
            ..Self::default()
        }
    }

    pub fn is_death_anim_playing(&self) -> bool {
        matches!(self.death, DeathPhase::Playing { .. })
    }

    fn reset_death(&mut self) {
        self.death = DeathPhase::Alive;
    }
}

/// A live simulated entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Actor {
    pub id: ActorId,
    pub handle: ObjectHandle,
    /// Record id shared by every instance of this actor type.
    pub record: RefId,
    pub kind: ActorKind,
    pub is_player: bool,
    pub stats: CreatureStats,
    pub npc: Option<NpcStats>,
    pub has_inventory: bool,
    pub controller: CharacterController,
}

impl Actor {
    pub fn npc(
        id: ActorId,
        handle: ObjectHandle,
        record: impl Into<RefId>,
        stats: CreatureStats,
        npc: NpcStats,
    ) -> Self {
        Self {
            id,
            handle,
            record: record.into(),
            kind: ActorKind::Npc { essential: false },
            is_player: false,
            stats,
            npc: Some(npc),
            has_inventory: true,
            controller: CharacterController::new(),
        }
    }

    pub fn creature(
        id: ActorId,
        handle: ObjectHandle,
        record: impl Into<RefId>,
        stats: CreatureStats,
        data: CreatureData,
    ) -> Self {
        Self {
            id,
            handle,
            record: record.into(),
            kind: ActorKind::Creature(data),
            is_player: false,
            stats,
            npc: None,
            has_inventory: data.flags.contains(CreatureFlags::WEAPON_AND_SHIELD),
            controller: CharacterController::new(),
        }
    }

    pub fn into_player(mut self) -> Self {
        self.is_player = true;
        self
    }

    pub fn is_npc(&self) -> bool {
        matches!(self.kind, ActorKind::Npc { .. })
    }

    pub fn creature_data(&self) -> Option<&CreatureData> {
        match &self.kind {
            ActorKind::Creature(data) => Some(data),
            ActorKind::Npc { .. } => None,
        }
    }

    pub fn is_undead(&self) -> bool {
        self.creature_data()
            .is_some_and(|data| data.kind == CreatureKind::Undead)
    }

    pub fn is_essential(&self) -> bool {
        match &self.kind {
            ActorKind::Npc { essential } => *essential,
            ActorKind::Creature(data) => data.flags.contains(CreatureFlags::ESSENTIAL),
        }
    }

    /// Modified skill value; creatures answer by specialization.
    pub fn skill(&self, skill: Skill) -> f32 {
        match (&self.npc, &self.kind) {
            (Some(npc), _) => npc.skill(skill).modified(),
            (None, ActorKind::Creature(data)) => data.skills.value(skill),
            (None, ActorKind::Npc { .. }) => 0.0,
        }
    }

    pub fn is_werewolf(&self) -> bool {
        self.stats.werewolf
    }

    pub fn is_guard(&self) -> bool {
        self.npc.as_ref().is_some_and(NpcStats::is_guard)
    }

    pub fn can_fly(&self) -> bool {
        self.creature_data()
            .is_some_and(|data| data.flags.contains(CreatureFlags::FLIES))
            || self.stats.magic_effects.is_active(crate::magic::EffectId::Levitate)
    }

    pub fn can_swim(&self) -> bool {
        self.creature_data()
            .map_or(true, |data| data.flags.contains(CreatureFlags::SWIMS))
    }

    pub fn can_walk(&self) -> bool {
        self.creature_data().map_or(true, |data| {
            data.flags
                .intersects(CreatureFlags::WALKS | CreatureFlags::BIPEDAL)
        })
    }

    /// Creatures without any movement flag are static and never engage.
    pub fn is_mobile(&self) -> bool {
        self.creature_data().map_or(true, |data| {
            data.flags.intersects(
                CreatureFlags::WALKS
                    | CreatureFlags::BIPEDAL
                    | CreatureFlags::FLIES
                    | CreatureFlags::SWIMS,
            )
        })
    }

    /// Advances the death animation state machine one step.
    pub fn kill(&mut self, dt: f32, anim_length: f32) -> KillResult {
        if !self.stats.is_dead() {
            return KillResult::NoEffect;
        }
        match self.controller.death {
            DeathPhase::Alive => {
                self.controller.death = DeathPhase::Playing { elapsed: 0.0 };
                self.controller.running = false;
                self.controller.attacking_or_spell = false;
                self.controller.casting_spell = false;
                KillResult::DeathAnimStarted
            }
            DeathPhase::Playing { elapsed } if elapsed + dt < anim_length => {
                self.controller.death = DeathPhase::Playing {
                    elapsed: elapsed + dt,
                };
                KillResult::DeathAnimPlaying
            }
            DeathPhase::Playing { .. } | DeathPhase::Done => {
                self.controller.death = DeathPhase::Done;
                if self.stats.is_death_anim_finished() {
                    KillResult::DeathAnimFinished
                } else {
                    self.stats.set_death_anim_finished(true);
                    KillResult::DeathAnimJustFinished
                }
            }
        }
    }

    /// Actor loaded already dead: skip straight to the final pose.
    pub fn skip_death_anim(&mut self) {
        if self.stats.is_dead() {
            self.controller.death = DeathPhase::Done;
            self.stats.set_death_anim_finished(true);
        }
    }

    pub fn resurrect(&mut self) {
        self.stats.resurrect();
        self.controller.reset_death();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{DynamicKind, DynamicStat};

    fn dying_creature() -> Actor {
        let mut stats = CreatureStats::default();
        stats.set_dynamic(DynamicKind::Health, DynamicStat::new(10.0).with_current(0.0));
        Actor::creature(
            ActorId(1),
            ObjectHandle(1),
            "mudcrab",
            stats,
            CreatureData::new(CreatureKind::Creature, CreatureFlags::WALKS),
        )
    }

    #[test]
    fn kill_walks_every_phase_once() {
        let mut actor = dying_creature();
        assert_eq!(actor.kill(0.5, 1.0), KillResult::DeathAnimStarted);
        assert_eq!(actor.kill(0.5, 1.0), KillResult::DeathAnimPlaying);
        assert_eq!(actor.kill(0.5, 1.0), KillResult::DeathAnimJustFinished);
        assert_eq!(actor.kill(0.5, 1.0), KillResult::DeathAnimFinished);
        assert_eq!(actor.kill(0.5, 1.0), KillResult::DeathAnimFinished);
    }

    #[test]
    fn living_actor_is_unaffected() {
        let mut actor = dying_creature();
        actor.resurrect();
        assert_eq!(actor.kill(0.5, 1.0), KillResult::NoEffect);
    }

    #[test]
    fn static_creature_is_not_mobile() {
        let actor = Actor::creature(
            ActorId(2),
            ObjectHandle(2),
            "totem",
            CreatureStats::default(),
            CreatureData::default(),
        );
        assert!(!actor.is_mobile());
    }
}
