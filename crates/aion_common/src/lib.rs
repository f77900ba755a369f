//! Foundational types shared by the Aion Verilog elaboration crates.
//!
//! This crate provides interned identifiers, source locations, four-state
//! bits, packed bit vectors, the arbitrary-width [`Number`] value used by
//! constant folding, and the internal-error result type.

#![warn(missing_docs)]

pub mod ident;
pub mod loc;
pub mod logic;
pub mod logic_vec;
pub mod number;
pub mod result;

pub use ident::{Ident, Interner};
pub use loc::Loc;
pub use logic::Logic;
pub use logic_vec::LogicVec;
pub use number::{Number, INTEGER_WIDTH};
pub use result::{AionResult, InternalError};
