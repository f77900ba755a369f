//! The elaborated design: scope tree, signals, and typed expressions.
//!
//! Elaboration turns the parse form into a [`Design`]: an arena of [`Scope`]s
//! addressed by stable [`ScopeId`]s, the [`Signal`]s and [`Event`]s declared in
//! them, and width-resolved [`NetExpr`] trees. Parameter slots move through
//! the [`ParamState`] states exactly once: stub, then expression, then value.

#![warn(missing_docs)]

pub mod arena;
pub mod const_value;
pub mod design;
pub mod expr;
pub mod ids;
pub mod reduce;
pub mod scope;
pub mod signal;

pub use arena::{Arena, ArenaId};
pub use const_value::ConstValue;
pub use design::{Design, NetAssign};
pub use expr::{ExprType, LvalPart, NetExpr, NetExprKind, NetLval};
pub use ids::{EventId, ScopeId, SignalId};
pub use reduce::ParamResolver;
pub use scope::{coerce_to_range, range_width, ParamSlot, ParamState, PendingDefparam, Scope, ScopeKind};
pub use signal::{Event, Signal};
