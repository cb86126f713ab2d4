//! Independently arbitrated targets

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One independently controlled limb or body target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Target {
    LeftHand = 0,
    RightHand = 1,
    HeadLookAt = 2,
    Body = 3,
}

impl Target {
    pub const COUNT: usize = 4;

    /// All targets in resolution order
    pub const ALL: [Target; Target::COUNT] = [
        Target::LeftHand,
        Target::RightHand,
        Target::HeadLookAt,
        Target::Body,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_hand(self) -> bool {
        matches!(self, Target::LeftHand | Target::RightHand)
    }

    /// The other hand, for hand targets
    pub fn opposite_hand(self) -> Option<Target> {
        match self {
            Target::LeftHand => Some(Target::RightHand),
            Target::RightHand => Some(Target::LeftHand),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Target::LeftHand => "LeftHand",
            Target::RightHand => "RightHand",
            Target::HeadLookAt => "HeadLookAt",
            Target::Body => "Body",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-size map with one slot per target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetMap<T> {
    slots: [T; Target::COUNT],
}

impl<T> TargetMap<T> {
    pub fn from_fn(mut f: impl FnMut(Target) -> T) -> Self {
        Self {
            slots: [
                f(Target::LeftHand),
                f(Target::RightHand),
                f(Target::HeadLookAt),
                f(Target::Body),
            ],
        }
    }

    pub fn get(&self, target: Target) -> &T {
        &self.slots[target.index()]
    }

    pub fn get_mut(&mut self, target: Target) -> &mut T {
        &mut self.slots[target.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Target, &T)> {
        Target::ALL.into_iter().zip(self.slots.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Target, &mut T)> {
        Target::ALL.into_iter().zip(self.slots.iter_mut())
    }
}

impl<T: Clone> TargetMap<T> {
    pub fn splat(value: T) -> Self {
        Self::from_fn(|_| value.clone())
    }
}

impl<T> Index<Target> for TargetMap<T> {
    type Output = T;

    fn index(&self, target: Target) -> &T {
        self.get(target)
    }
}

impl<T> IndexMut<Target> for TargetMap<T> {
    fn index_mut(&mut self, target: Target) -> &mut T {
        self.get_mut(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_map_indexing() {
        let mut map = TargetMap::splat(0u32);
        map[Target::RightHand] = 7;

        assert_eq!(map[Target::LeftHand], 0);
        assert_eq!(map[Target::RightHand], 7);
        assert_eq!(map.iter().filter(|(_, v)| **v == 7).count(), 1);
    }

    #[test]
    fn test_from_fn_order() {
        let map = TargetMap::from_fn(|t| t.index());
        for (target, idx) in map.iter() {
            assert_eq!(target.index(), *idx);
        }
    }

    #[test]
    fn test_opposite_hand() {
        assert_eq!(Target::LeftHand.opposite_hand(), Some(Target::RightHand));
        assert_eq!(Target::Body.opposite_hand(), None);
    }
}
