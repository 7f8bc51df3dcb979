//! Stat value types shared by attributes, skills, AI settings and dynamic stats.
//!
//! Every stat splits into a `base` (persisted, permanent) and a `modifier`
//! (recomputed every tick from the magic effect snapshot). Dynamic stats add a
//! `current` value on top.

/// A base+modifier pair. The modified value never drops below zero.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stat {
    base: f32,
    modifier: f32,
}

impl Stat {
    pub const fn new(base: f32) -> Self {
        Self {
            base,
            modifier: 0.0,
        }
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn modifier(&self) -> f32 {
        self.modifier
    }

    pub fn modified(&self) -> f32 {
        (self.base + self.modifier).max(0.0)
    }

    pub fn set_base(&mut self, base: f32) {
        self.base = base;
    }

    pub fn set_modifier(&mut self, modifier: f32) {
        self.modifier = modifier;
    }
}

/// Integer AI disposition setting (Fight, Flee, Alarm, Hello).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiSettingValue {
    pub base: i32,
    pub modifier: i32,
}

impl AiSettingValue {
    pub const fn new(base: i32) -> Self {
        Self { base, modifier: 0 }
    }

    pub fn modified(&self) -> i32 {
        (self.base + self.modifier).max(0)
    }
}

/// Attribute or skill value with a separate damage pool.
///
/// Damage effects lower the value until restored; drain and fortify effects
/// only touch the modifier.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeValue {
    base: f32,
    modifier: f32,
    damage: f32,
}

impl AttributeValue {
    pub const fn new(base: f32) -> Self {
        Self {
            base,
            modifier: 0.0,
            damage: 0.0,
        }
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn modifier(&self) -> f32 {
        self.modifier
    }

    pub fn damage(&self) -> f32 {
        self.damage
    }

    pub fn modified(&self) -> f32 {
        (self.base - self.damage + self.modifier).max(0.0)
    }

    pub fn set_base(&mut self, base: f32) {
        self.base = base;
    }

    pub fn set_modifier(&mut self, modifier: f32) {
        self.modifier = modifier;
    }

    pub fn damage_by(&mut self, amount: f32) {
        self.damage = (self.damage + amount).min(self.base.max(0.0));
    }

    pub fn restore_by(&mut self, amount: f32) {
        self.damage = (self.damage - amount).max(0.0);
    }
}

/// Health, magicka or fatigue: base, modifier, current.
///
/// `current` is deliberately not clamped to `modified`; callers choose per
/// call whether increases above modified or decreases below zero are allowed.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicStat {
    stat: Stat,
    current: f32,
}

impl DynamicStat {
    /// Full stat with `current == base`.
    pub const fn new(base: f32) -> Self {
        Self {
            stat: Stat::new(base),
            current: base,
        }
    }

    pub fn with_current(mut self, current: f32) -> Self {
        self.current = current;
        self
    }

    pub fn base(&self) -> f32 {
        self.stat.base()
    }

    pub fn modifier(&self) -> f32 {
        self.stat.modifier()
    }

    pub fn modified(&self) -> f32 {
        self.stat.modified()
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    /// Fraction of the modified value currently available; 0 when modified is 0.
    pub fn ratio(&self) -> f32 {
        let modified = self.modified();
        if modified == 0.0 {
            0.0
        } else {
            self.current / modified
        }
    }

    pub fn set_base(&mut self, base: f32) {
        self.stat.set_base(base);
    }

    /// Moves the modified value to `value` by adjusting the base, keeping the
    /// base at or above `min`. `current` moves by the same delta.
    pub fn set_modified(&mut self, value: f32, min: f32) {
        let mut diff = value - self.stat.modified();
        if self.stat.base() + diff < min {
            diff = min - self.stat.base();
        }
        self.stat.set_base(self.stat.base() + diff);
        self.current += diff;
    }

    /// Sets `current`, clamping per the two allowance flags.
    ///
    /// Increases stop at `modified` unless allowed above it; a value already
    /// above `modified` is left alone rather than pulled down. Decreases stop
    /// at zero unless allowed below it.
    pub fn set_current(
        &mut self,
        value: f32,
        allow_decrease_below_zero: bool,
        allow_increase_above_modified: bool,
    ) {
        if value > self.current {
            let modified = self.modified();
            if value <= modified || allow_increase_above_modified {
                self.current = value;
            } else if self.current > modified {
                // already above, keep as is
            } else {
                self.current = modified;
            }
        } else if value > 0.0 || allow_decrease_below_zero {
            self.current = value;
        } else if self.current > 0.0 {
            self.current = 0.0;
        }
    }

    /// Replaces the effect-driven modifier and shifts `current` by the delta.
    pub fn set_current_modifier(&mut self, modifier: f32, allow_decrease_below_zero: bool) {
        let diff = modifier - self.stat.modifier();
        self.stat.set_modifier(modifier);
        self.set_current(self.current + diff, allow_decrease_below_zero, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_current_keeps_overshoot_from_fortify() {
        let mut stat = DynamicStat::new(50.0).with_current(70.0);
        stat.set_current(80.0, false, false);
        assert_eq!(stat.current(), 70.0);

        stat.set_current(60.0, false, false);
        assert_eq!(stat.current(), 60.0);
    }

    #[test]
    fn set_current_clamps_at_zero_unless_allowed() {
        let mut stat = DynamicStat::new(50.0);
        stat.set_current(-10.0, false, false);
        assert_eq!(stat.current(), 0.0);

        stat.set_current(-10.0, true, false);
        assert_eq!(stat.current(), -10.0);
    }

    #[test]
    fn current_modifier_shifts_current() {
        let mut stat = DynamicStat::new(100.0);
        stat.set_current_modifier(20.0, false);
        assert_eq!(stat.modified(), 120.0);
        assert_eq!(stat.current(), 120.0);

        stat.set_current_modifier(-150.0, true);
        assert_eq!(stat.modified(), 0.0);
        assert_eq!(stat.current(), -50.0);
    }

    #[test]
    fn attribute_damage_is_capped_by_base() {
        let mut value = AttributeValue::new(40.0);
        value.damage_by(60.0);
        assert_eq!(value.modified(), 0.0);
        value.restore_by(10.0);
        assert_eq!(value.modified(), 10.0);
    }
}
