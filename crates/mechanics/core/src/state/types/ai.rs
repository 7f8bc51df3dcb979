//! AI package sequence.
//!
//! The front package is the one being executed. `stack` suspends the current
//! behaviour by pushing to the front; `queue` appends to run after completion.

use std::collections::VecDeque;

use crate::state::{ActorId, Position};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AiPackage {
    Combat { target: ActorId },
    Pursue { target: ActorId },
    Follow { target: ActorId, permanent: bool },
    Escort { target: ActorId },
    Wander { distance: f32 },
    Travel { destination: Position },
    Breathe,
}

impl AiPackage {
    pub fn kind(&self) -> AiPackageKind {
        match self {
            AiPackage::Combat { .. } => AiPackageKind::Combat,
            AiPackage::Pursue { .. } => AiPackageKind::Pursue,
            AiPackage::Follow { .. } => AiPackageKind::Follow,
            AiPackage::Escort { .. } => AiPackageKind::Escort,
            AiPackage::Wander { .. } => AiPackageKind::Wander,
            AiPackage::Travel { .. } => AiPackageKind::Travel,
            AiPackage::Breathe => AiPackageKind::Breathe,
        }
    }

    /// Actor this package follows or escorts, if any.
    pub fn sides_with(&self) -> Option<ActorId> {
        match self {
            AiPackage::Follow { target, .. } | AiPackage::Escort { target } => Some(*target),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AiPackageKind {
    Combat,
    Pursue,
    Follow,
    Escort,
    Wander,
    Travel,
    Breathe,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiSequence {
    packages: VecDeque<AiPackage>,
}

impl AiSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a package to the front, suspending the current one.
    ///
    /// A combat package against a target already fought is not duplicated.
    pub fn stack(&mut self, package: AiPackage) {
        if let AiPackage::Combat { target } = package {
            if self.is_in_combat_with(target) {
                return;
            }
        }
        self.packages.push_front(package);
    }

    pub fn queue(&mut self, package: AiPackage) {
        self.packages.push_back(package);
    }

    pub fn front(&self) -> Option<&AiPackage> {
        self.packages.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AiPackage> {
        self.packages.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_in_combat(&self) -> bool {
        self.packages
            .iter()
            .any(|package| matches!(package, AiPackage::Combat { .. }))
    }

    pub fn is_in_combat_with(&self, target: ActorId) -> bool {
        self.packages
            .iter()
            .any(|package| matches!(package, AiPackage::Combat { target: t } if *t == target))
    }

    pub fn combat_targets(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.packages.iter().filter_map(|package| match package {
            AiPackage::Combat { target } => Some(*target),
            _ => None,
        })
    }

    /// Current combat target: the front combat package's target.
    pub fn combat_target(&self) -> Option<ActorId> {
        self.combat_targets().next()
    }

    pub fn has_package(&self, kind: AiPackageKind) -> bool {
        self.packages.iter().any(|package| package.kind() == kind)
    }

    /// Follow/escort targets, in sequence order.
    pub fn sides_with(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.packages.iter().filter_map(AiPackage::sides_with)
    }

    pub fn is_follower_or_escort(&self) -> bool {
        self.sides_with().next().is_some()
    }

    pub fn stop_combat(&mut self) {
        self.packages
            .retain(|package| !matches!(package, AiPackage::Combat { .. }));
    }

    pub fn stop_combat_with(&mut self, target: ActorId) {
        self.packages
            .retain(|package| !matches!(package, AiPackage::Combat { target: t } if *t == target));
    }

    pub fn stop_pursuit(&mut self) {
        self.packages
            .retain(|package| !matches!(package, AiPackage::Pursue { .. }));
    }

    /// Removes the front package if it is a completed travel and returns its destination.
    pub fn complete_travel(&mut self) -> Option<Position> {
        match self.packages.front() {
            Some(AiPackage::Travel { destination }) => {
                let destination = *destination;
                self.packages.pop_front();
                Some(destination)
            }
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.packages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combat_against_same_target_is_not_duplicated() {
        let mut sequence = AiSequence::new();
        sequence.stack(AiPackage::Combat { target: ActorId(3) });
        sequence.stack(AiPackage::Combat { target: ActorId(3) });
        sequence.stack(AiPackage::Combat { target: ActorId(4) });
        assert_eq!(sequence.combat_targets().count(), 2);
        assert_eq!(sequence.combat_target(), Some(ActorId(4)));
    }

    #[test]
    fn stack_suspends_and_queue_appends() {
        let mut sequence = AiSequence::new();
        sequence.queue(AiPackage::Wander { distance: 512.0 });
        sequence.stack(AiPackage::Follow {
            target: ActorId(1),
            permanent: true,
        });
        sequence.queue(AiPackage::Breathe);

        assert_eq!(sequence.front().map(AiPackage::kind), Some(AiPackageKind::Follow));
        assert_eq!(sequence.len(), 3);
        assert!(sequence.is_follower_or_escort());
    }
}
