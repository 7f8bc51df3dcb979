use std::collections::BTreeMap;

use super::effect::{EffectId, EffectKey};

/// Aggregated magnitude of one effect key.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectParams {
    pub base: f32,
    pub modifier: f32,
}

impl EffectParams {
    pub fn magnitude(&self) -> f32 {
        self.base + self.modifier
    }
}

/// Authoritative per-actor effect snapshot.
///
/// Rebuilt every tick from abilities, active spells and equipped enchantments;
/// anything not backed by one of those sources is dropped on rebuild.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagicEffects {
    effects: BTreeMap<EffectKey, EffectParams>,
}

impl MagicEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `magnitude` to the base of `key`, creating the entry if needed.
    pub fn add(&mut self, key: impl Into<EffectKey>, magnitude: f32) {
        self.effects.entry(key.into()).or_default().base += magnitude;
    }

    pub fn set_modifier(&mut self, key: impl Into<EffectKey>, modifier: f32) {
        self.effects.entry(key.into()).or_default().modifier = modifier;
    }

    pub fn get(&self, key: impl Into<EffectKey>) -> Option<EffectParams> {
        self.effects.get(&key.into()).copied()
    }

    /// Magnitude of `key`, zero if absent.
    pub fn magnitude(&self, key: impl Into<EffectKey>) -> f32 {
        self.get(key).map(|params| params.magnitude()).unwrap_or(0.0)
    }

    /// Sum of magnitudes for `id` across every argument (all attributes, all skills).
    pub fn total_magnitude(&self, id: EffectId) -> f32 {
        self.effects
            .iter()
            .filter(|(key, _)| key.id == id)
            .map(|(_, params)| params.magnitude())
            .sum()
    }

    pub fn is_active(&self, key: impl Into<EffectKey>) -> bool {
        self.magnitude(key) > 0.0
    }

    pub fn remove(&mut self, key: impl Into<EffectKey>) {
        self.effects.remove(&key.into());
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EffectKey, &EffectParams)> {
        self.effects.iter()
    }

    /// Merges another snapshot into this one, summing bases.
    pub fn merge(&mut self, other: &MagicEffects) {
        for (key, params) in &other.effects {
            self.add(*key, params.base);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Attribute;

    #[test]
    fn missing_keys_have_zero_magnitude() {
        let effects = MagicEffects::new();
        assert_eq!(effects.magnitude(EffectId::Shield), 0.0);
        assert!(!effects.is_active(EffectId::Shield));
    }

    #[test]
    fn attribute_keys_are_distinct() {
        let mut effects = MagicEffects::new();
        effects.add(
            EffectKey::attribute(EffectId::FortifyAttribute, Attribute::Strength),
            10.0,
        );
        effects.add(
            EffectKey::attribute(EffectId::FortifyAttribute, Attribute::Luck),
            5.0,
        );
        assert_eq!(
            effects.magnitude(EffectKey::attribute(
                EffectId::FortifyAttribute,
                Attribute::Strength
            )),
            10.0
        );
        assert_eq!(effects.total_magnitude(EffectId::FortifyAttribute), 15.0);
    }
}
