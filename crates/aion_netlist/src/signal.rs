//! Declared signals and named events.

use crate::ids::ScopeId;
use crate::scope::range_width;
use aion_common::{Ident, Loc};
use aion_pform::{NetKind, PortDir};
use serde::{Deserialize, Serialize};

/// A net or variable with its folded range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// The declared name.
    pub name: Ident,
    /// The declaring scope.
    pub scope: ScopeId,
    /// The net or variable kind.
    pub kind: NetKind,
    /// Port direction, for ports.
    pub port: Option<PortDir>,
    /// Whether the signal is signed.
    pub signed: bool,
    /// Declared most significant bit index.
    pub msb: i64,
    /// Declared least significant bit index.
    pub lsb: i64,
    /// Memory word range `(first, last)` as declared.
    pub array: Option<(i64, i64)>,
    /// Declaration site.
    pub loc: Loc,
}

impl Signal {
    /// Width in bits.
    ///
    /// Declared ranges are checked to fit before a signal is created.
    pub fn width(&self) -> u32 {
        range_width(self.msb, self.lsb).unwrap_or(u32::MAX)
    }

    /// Returns `true` for variables (`reg`, `integer`, `time`, `real`).
    pub fn is_variable(&self) -> bool {
        self.kind.is_variable()
    }

    /// Maps a declared bit index to a zero-based offset from the lsb.
    ///
    /// Out-of-range indices map outside `0..width`.
    pub fn normalize(&self, index: i64) -> i64 {
        if self.msb >= self.lsb {
            index.saturating_sub(self.lsb)
        } else {
            self.lsb.saturating_sub(index)
        }
    }

    /// Maps a declared word index to a zero-based address, if in range.
    pub fn normalize_word(&self, index: i64) -> Option<u64> {
        let (first, last) = self.array?;
        let (lo, hi) = if first <= last { (first, last) } else { (last, first) };
        if index < lo || index > hi {
            return None;
        }
        Some(index.abs_diff(first))
    }
}

/// A named event declared with `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// The event name.
    pub name: Ident,
    /// The declaring scope.
    pub scope: ScopeId,
    /// Declaration site.
    pub loc: Loc,
}
