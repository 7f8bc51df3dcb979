use std::collections::BTreeMap;

use crate::state::{GameTime, RefId};

/// Worsening schedule of one corprus disease instance.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorprusStats {
    pub worsenings: u32,
    pub next_worsening: GameTime,
}

impl CorprusStats {
    /// Hours between two worsenings.
    pub const WORSENING_PERIOD: f64 = GameTime::HOURS_PER_DAY;
}

/// Spells an actor knows (spells, abilities, diseases, powers).
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spells {
    known: Vec<RefId>,
    selected: Option<RefId>,
    corprus: BTreeMap<RefId, CorprusStats>,
}

impl Spells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: impl Into<RefId>) {
        let id = id.into();
        if !self.known.contains(&id) {
            self.known.push(id);
        }
    }

    /// Adds a corprus disease, first worsening one period after `now`.
    pub fn add_corprus(&mut self, id: impl Into<RefId>, now: GameTime) {
        let id = id.into();
        self.add(id.clone());
        self.corprus.insert(
            id,
            CorprusStats {
                worsenings: 0,
                next_worsening: now + CorprusStats::WORSENING_PERIOD,
            },
        );
    }

    pub fn remove(&mut self, id: &RefId) {
        self.known.retain(|known| known != id);
        self.corprus.remove(id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
    }

    pub fn contains(&self, id: &RefId) -> bool {
        self.known.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RefId> {
        self.known.iter()
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn selected(&self) -> Option<&RefId> {
        self.selected.as_ref()
    }

    pub fn set_selected(&mut self, id: Option<RefId>) {
        self.selected = id;
    }

    pub fn corprus(&self, id: &RefId) -> Option<&CorprusStats> {
        self.corprus.get(id)
    }

    pub fn corprus_spells(&self) -> impl Iterator<Item = (&RefId, &CorprusStats)> {
        self.corprus.iter()
    }

    /// Advances every corprus instance whose worsening date has passed.
    ///
    /// Returns how many instances worsened.
    pub fn worsen_corprus(&mut self, now: GameTime) -> usize {
        let mut worsened = 0;
        for stats in self.corprus.values_mut() {
            if now >= stats.next_worsening {
                stats.worsenings += 1;
                stats.next_worsening = now + CorprusStats::WORSENING_PERIOD;
                worsened += 1;
            }
        }
        worsened
    }
}
