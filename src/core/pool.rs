//! Player pool accounting.
//!
//! The pool is plain data. Its single live instance sits inside
//! [`SharedState`](crate::core::SharedState), which is what makes every
//! check-and-mutate here atomic with respect to the other threads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-role player counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceCounts {
    /// Tanks.
    pub tanks: u32,
    /// Healers.
    pub healers: u32,
    /// Damage dealers.
    pub dps: u32,
}

/// Players consumed by one party: 1 tank, 1 healer, 3 DPS.
pub const PARTY_REQUIREMENT: ResourceCounts = ResourceCounts::new(1, 1, 3);

impl ResourceCounts {
    /// No players of any role.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Creates a count triple.
    #[must_use]
    pub const fn new(tanks: u32, healers: u32, dps: u32) -> Self {
        Self { tanks, healers, dps }
    }

    /// Sum over all roles.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.tanks as u64 + self.healers as u64 + self.dps as u64
    }

    /// True when every role is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.tanks == 0 && self.healers == 0 && self.dps == 0
    }

    /// True when `self` has at least `other` of every role.
    #[must_use]
    pub const fn covers(&self, other: &Self) -> bool {
        self.tanks >= other.tanks && self.healers >= other.healers && self.dps >= other.dps
    }

    /// Role-wise subtraction; `None` if any role would go negative.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        Some(Self {
            tanks: self.tanks.checked_sub(other.tanks)?,
            healers: self.healers.checked_sub(other.healers)?,
            dps: self.dps.checked_sub(other.dps)?,
        })
    }

    /// Role-wise addition, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self {
            tanks: self.tanks.saturating_add(other.tanks),
            healers: self.healers.saturating_add(other.healers),
            dps: self.dps.saturating_add(other.dps),
        }
    }

    /// Every role multiplied by `n`, saturating.
    #[must_use]
    pub const fn scaled(self, n: u32) -> Self {
        Self {
            tanks: self.tanks.saturating_mul(n),
            healers: self.healers.saturating_mul(n),
            dps: self.dps.saturating_mul(n),
        }
    }
}

impl fmt::Display for ResourceCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tanks = {}, Healers = {}, DPS = {}",
            self.tanks, self.healers, self.dps
        )
    }
}

/// Players currently waiting to be grouped.
///
/// Reservation is all-or-nothing and permanent: a party's players are not
/// returned when the run completes. Only [`replenish`](Self::replenish)
/// raises the counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePool {
    available: ResourceCounts,
}

impl ResourcePool {
    /// Creates a pool holding `initial`.
    #[must_use]
    pub const fn new(initial: ResourceCounts) -> Self {
        Self { available: initial }
    }

    /// Players currently in the pool.
    #[must_use]
    pub const fn available(&self) -> ResourceCounts {
        self.available
    }

    /// Whether the pool holds at least one full party.
    #[must_use]
    pub const fn can_form_party(&self) -> bool {
        self.available.covers(&PARTY_REQUIREMENT)
    }

    /// Removes one party's worth of players.
    ///
    /// Returns `false` and leaves the pool untouched if any role is short.
    pub fn reserve_party(&mut self) -> bool {
        match self.available.checked_sub(PARTY_REQUIREMENT) {
            Some(rest) => {
                self.available = rest;
                true
            }
            None => false,
        }
    }

    /// Adds newly generated players.
    pub fn replenish(&mut self, wave: ResourceCounts) {
        self.available = self.available.saturating_add(wave);
    }
}
