//! The parse form: the untyped Verilog tree handed over by the parser.
//!
//! Nodes carry a [`Loc`](aion_common::Loc) (file and line) and own their
//! children exclusively. Elaboration only ever reads this tree; every typed
//! structure it produces lives in `aion_netlist`.

#![warn(missing_docs)]

pub mod expr;
pub mod module;
pub mod stmt;

pub use expr::{BinaryOp, EdgeKind, Expr, HierName, IdentExpr, Select, UnaryOp};
pub use module::{
    Behavior, BehaviorKind, ContinuousAssign, Defparam, EventDecl, Function, Generate,
    GenerateScheme, Instantiation, Library, Module, NetKind, ParamDecl, ParamOverrides,
    PortConnection, PortDir, Range, Task, WireDecl,
};
pub use stmt::{BlockKind, CaseArm, Statement};
