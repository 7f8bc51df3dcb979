use crate::state::RefId;
use crate::stats::{AttributeValue, Skill};

/// Humanoid-only state layered on top of [`CreatureStats`](super::CreatureStats).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NpcStats {
    skills: [AttributeValue; 27],
    pub race: RefId,
    pub class: RefId,
    /// Crime this NPC is a witness or victim of; murder is reported when set.
    pub crime_id: Option<u32>,
    pub werewolf_kills: u32,
    pub bounty: u32,
}

impl NpcStats {
    pub fn new(race: impl Into<RefId>, class: impl Into<RefId>) -> Self {
        Self {
            skills: [AttributeValue::default(); 27],
            race: race.into(),
            class: class.into(),
            crime_id: None,
            werewolf_kills: 0,
            bounty: 0,
        }
    }

    pub fn skill(&self, skill: Skill) -> &AttributeValue {
        &self.skills[skill as usize]
    }

    pub fn skill_mut(&mut self, skill: Skill) -> &mut AttributeValue {
        &mut self.skills[skill as usize]
    }

    pub fn set_skill_base(&mut self, skill: Skill, base: f32) {
        self.skills[skill as usize].set_base(base);
    }

    pub fn is_guard(&self) -> bool {
        self.class.as_str().eq_ignore_ascii_case("guard")
    }

    pub fn add_werewolf_kill(&mut self) {
        self.werewolf_kills += 1;
    }
}

impl Default for NpcStats {
    fn default() -> Self {
        Self::new("", "")
    }
}
