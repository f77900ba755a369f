//! Interned identifiers for module, scope, parameter, and signal names.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned name.
///
/// Names are `u32` indices into an [`Interner`], so comparing and copying
/// them is O(1). Scope names synthesized during elaboration (`g[3]`,
/// `u_core[0]`) are interned the same way as names from the source.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Placeholder used by [`Loc::DUMMY`](crate::Loc::DUMMY); never returned by an interner.
    pub const DUMMY: Ident = Ident(u32::MAX);

    /// Creates an `Ident` from a raw `u32` index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32` which is always a valid `usize` on 32-bit and
// 64-bit platforms. `try_from_usize` rejects values that don't fit in `u32`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// String interner backed by [`lasso::ThreadedRodeo`].
///
/// Shared by reference between the parse form and every elaboration phase.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a string, returning its [`Ident`].
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Returns the [`Ident`] of an already interned string.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Interns the indexed name `base[index]` used for generated and arrayed scopes.
    pub fn intern_indexed(&self, base: Ident, index: i64) -> Ident {
        let name = format!("{}[{index}]", self.resolve(base));
        self.get_or_intern(&name)
    }

    /// Resolves an [`Ident`] back to its string value.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not created by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Joins a dotted hierarchical path such as `top.u1.p`.
    pub fn join_path(&self, path: &[Ident]) -> String {
        path.iter()
            .map(|&id| self.resolve(id))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
