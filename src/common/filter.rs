/// Bitmask collision filtering.
///
/// Two bodies may collide only when each one's mask accepts the other's group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionFilter {
    pub group: u32,
    pub mask: u32,
}

impl CollisionFilter {
    /// Member of group 1, collides with everything.
    pub const DEFAULT: CollisionFilter = CollisionFilter { group: 1, mask: u32::MAX };
    /// Collides with nothing.
    pub const NONE: CollisionFilter = CollisionFilter { group: 0, mask: 0 };

    pub const fn new(group: u32, mask: u32) -> Self {
        Self { group, mask }
    }

    /// Symmetric group/mask test.
    #[inline]
    pub fn can_collide(&self, other: &CollisionFilter) -> bool {
        (self.mask & other.group) != 0 && (other.mask & self.group) != 0
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self::DEFAULT
    }
}
