//! Bookkeeping for type occurrences that are currently being expanded.
//!
//! The resolver enters a [`TypeId`](crate::TypeId) before expanding it and
//! leaves it afterwards. Entering an id that is already open is how
//! `type List = { next: List }` is noticed; the caller then emits a reference
//! descriptor instead of recursing. Occurrences without a stable identity
//! (anonymous unions, synthesized types) take an unkeyed level that only
//! counts towards the limits.
//!
//! Two limits back this up for oracles that mint a fresh handle per
//! instantiation: a nesting depth and a per-request budget of entries. Both
//! surface as [`GuardEntry`] variants so the caller can degrade to `Unknown`.

use rustc_hash::FxHashSet;
use std::hash::Hash;
use typeshape_common::limits;

/// Depth and budget bounds for one [`ExpansionGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimits {
    pub max_depth: u32,
    pub max_iterations: u32,
}

impl ExpansionLimits {
    /// `MAX_RESOLVE_DEPTH` levels, `MAX_RESOLVE_ITERATIONS` entries.
    pub const DEFAULT: Self = Self {
        max_depth: limits::MAX_RESOLVE_DEPTH,
        max_iterations: limits::MAX_RESOLVE_ITERATIONS,
    };

    pub const fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            max_depth,
            max_iterations,
        }
    }
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Outcome of [`ExpansionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardEntry {
    /// Expand, then leave.
    Entered,
    /// The key is already open further up the stack.
    InFlight,
    TooDeep,
    BudgetSpent,
}

impl GuardEntry {
    #[inline]
    pub fn is_entered(self) -> bool {
        self == Self::Entered
    }

    #[inline]
    pub fn is_in_flight(self) -> bool {
        self == Self::InFlight
    }

    /// Either limit was hit; nothing was entered.
    #[inline]
    pub fn is_limited(self) -> bool {
        matches!(self, Self::TooDeep | Self::BudgetSpent)
    }
}

/// Open-set plus counters for one resolution context.
///
/// ```ignore
/// match guard.enter(ty) {
///     GuardEntry::Entered => {
///         let expanded = expand(ty);
///         guard.leave(ty);
///         expanded
///     }
///     GuardEntry::InFlight => reference_to(ty),
///     GuardEntry::TooDeep | GuardEntry::BudgetSpent => unknown(ty),
/// }
/// ```
pub struct ExpansionGuard<K: Hash + Eq + Copy> {
    open: FxHashSet<K>,
    /// Keyed plus unkeyed levels.
    levels: u32,
    entries: u32,
    limits: ExpansionLimits,
    limited: bool,
}

impl<K: Hash + Eq + Copy> ExpansionGuard<K> {
    pub fn new(limits: ExpansionLimits) -> Self {
        Self {
            open: FxHashSet::default(),
            levels: 0,
            entries: 0,
            limits,
            limited: false,
        }
    }

    /// Open `key`. Only [`GuardEntry::Entered`] must be paired with
    /// [`leave`](Self::leave).
    pub fn enter(&mut self, key: K) -> GuardEntry {
        let entry = self.admit(Some(&key));
        if entry.is_entered() {
            self.open.insert(key);
        }
        entry
    }

    pub fn leave(&mut self, key: K) {
        let removed = self.open.remove(&key);
        debug_assert!(removed, "left a type that was never entered");
        self.levels = self.levels.saturating_sub(1);
    }

    /// Open a level with no identity. Pair with
    /// [`leave_unkeyed`](Self::leave_unkeyed).
    pub fn enter_unkeyed(&mut self) -> GuardEntry {
        self.admit(None)
    }

    pub fn leave_unkeyed(&mut self) {
        debug_assert!(
            self.levels as usize > self.open.len(),
            "unkeyed leave without a matching enter"
        );
        self.levels = self.levels.saturating_sub(1);
    }

    fn admit(&mut self, key: Option<&K>) -> GuardEntry {
        self.entries = self.entries.saturating_add(1);
        if self.entries > self.limits.max_iterations {
            self.limited = true;
            return GuardEntry::BudgetSpent;
        }
        if key.is_some_and(|key| self.open.contains(key)) {
            return GuardEntry::InFlight;
        }
        let crowded = key.is_some() && self.open.len() as u32 >= limits::MAX_IN_FLIGHT_TYPES;
        if self.levels >= self.limits.max_depth || crowded {
            self.limited = true;
            return GuardEntry::TooDeep;
        }
        self.levels += 1;
        GuardEntry::Entered
    }

    #[inline]
    pub fn is_open(&self, key: &K) -> bool {
        self.open.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.levels
    }

    /// Enter attempts since the last [`reset_budget`](Self::reset_budget).
    #[inline]
    pub fn entries(&self) -> u32 {
        self.entries
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.levels > 0
    }

    /// A limit was hit since the last reset.
    #[inline]
    pub fn was_limited(&self) -> bool {
        self.limited
    }

    /// Give the next top-level request a full budget. Open keys stay open.
    pub fn reset_budget(&mut self) {
        self.entries = 0;
        self.limited = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for ExpansionGuard<K> {
    fn drop(&mut self) {
        if self.levels > 0 && !std::thread::panicking() {
            panic!(
                "expansion guard dropped with {} open levels ({} keyed)",
                self.levels,
                self.open.len()
            );
        }
    }
}
