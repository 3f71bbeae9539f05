//! Per-site state flags
//!
//! Flags are set and cleared by the UI and the search. Storage is an
//! `AtomicU32` so a background search and the foreground can both touch a
//! site without locking; every update is an idempotent set or clear.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::terrain::SiteType;

/// Bit set of site states
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SiteState(u32);

impl SiteState {
    pub const NONE: Self = Self(0);
    /// Under the pointer
    pub const HOVER: Self = Self(0x1);
    /// Where the agent stands
    pub const CURRENT: Self = Self(0x2);
    /// Terrain forbids entry
    pub const IMPASSABLE: Self = Self(0x4);
    pub const VISITED: Self = Self(0x8);
    pub const FRONTIER: Self = Self(0x10);
    pub const SEARCH_START: Self = Self(0x20);
    pub const SEARCH_GOAL: Self = Self(0x40);
    pub const PATH: Self = Self(0x80);
    /// Placed by the user; blocks search like `IMPASSABLE`
    pub const WALL: Self = Self(0x100);

    /// Everything a search run leaves behind
    pub const SEARCH: Self = Self(
        Self::VISITED.0 | Self::FRONTIER.0 | Self::SEARCH_START.0 | Self::SEARCH_GOAL.0 | Self::PATH.0,
    );

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Neither wall nor impassable terrain
    pub const fn is_passable(self) -> bool {
        !self.intersects(Self(Self::WALL.0 | Self::IMPASSABLE.0))
    }
}

impl BitOr for SiteState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SiteState {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for SiteState {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for SiteState {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for SiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(SiteState, &str); 9] = [
            (SiteState::HOVER, "HOVER"),
            (SiteState::CURRENT, "CURRENT"),
            (SiteState::IMPASSABLE, "IMPASSABLE"),
            (SiteState::VISITED, "VISITED"),
            (SiteState::FRONTIER, "FRONTIER"),
            (SiteState::SEARCH_START, "SEARCH_START"),
            (SiteState::SEARCH_GOAL, "SEARCH_GOAL"),
            (SiteState::PATH, "PATH"),
            (SiteState::WALL, "WALL"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "SiteState({})", names.join(" | "))
    }
}

/// Lock-free flag cell
#[derive(Debug, Default)]
pub(crate) struct AtomicState(AtomicU32);

impl AtomicState {
    pub(crate) fn new(state: SiteState) -> Self {
        Self(AtomicU32::new(state.0))
    }

    pub(crate) fn load(&self) -> SiteState {
        SiteState(self.0.load(Ordering::Relaxed))
    }

    /// Set `flags`; true when any bit changed
    pub(crate) fn insert(&self, flags: SiteState) -> bool {
        let before = self.0.fetch_or(flags.0, Ordering::Relaxed);
        before | flags.0 != before
    }

    /// Clear `flags`; true when any bit changed
    pub(crate) fn remove(&self, flags: SiteState) -> bool {
        let before = self.0.fetch_and(!flags.0, Ordering::Relaxed);
        before & !flags.0 != before
    }
}

impl Clone for AtomicState {
    fn clone(&self) -> Self {
        Self::new(self.load())
    }
}

/// Lock-free terrain cell, stored as the elevation level
#[derive(Debug, Default)]
pub(crate) struct AtomicTerrain(AtomicU8);

const UNKNOWN_TERRAIN: u8 = u8::MAX;

impl AtomicTerrain {
    pub(crate) fn new(site_type: SiteType) -> Self {
        Self(AtomicU8::new(encode_terrain(site_type)))
    }

    pub(crate) fn load(&self) -> SiteType {
        match self.0.load(Ordering::Relaxed) {
            0 => SiteType::Ocean,
            1 => SiteType::Beach,
            2 => SiteType::Lowland,
            3 => SiteType::Highland,
            4 => SiteType::Mountain,
            _ => SiteType::Unknown,
        }
    }

    /// Store `site_type`; true when it differs from the old value
    pub(crate) fn store(&self, site_type: SiteType) -> bool {
        let bits = encode_terrain(site_type);
        self.0.swap(bits, Ordering::Relaxed) != bits
    }
}

impl Clone for AtomicTerrain {
    fn clone(&self) -> Self {
        Self::new(self.load())
    }
}

fn encode_terrain(site_type: SiteType) -> u8 {
    site_type.elevation().unwrap_or(UNKNOWN_TERRAIN)
}
