//! Behavioral statements.
//!
//! Elaboration walks statements only to discover named blocks, which become
//! scopes, and to reach the procedural assignments whose targets are l-values.

use crate::expr::Expr;
use crate::module::WireDecl;
use aion_common::{Ident, Loc};
use serde::{Deserialize, Serialize};

/// A behavioral statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// A `begin ... end` or `fork ... join` block.
    Block {
        /// Sequential or parallel.
        kind: BlockKind,
        /// The block label; only named blocks open a scope.
        name: Option<Ident>,
        /// Variables declared inside a named block.
        decls: Vec<WireDecl>,
        /// The contained statements.
        stmts: Vec<Statement>,
        /// Source location.
        loc: Loc,
    },
    /// `if (cond) then_stmt else else_stmt`
    If {
        /// The condition.
        cond: Expr,
        /// The taken branch, `None` for a null statement.
        then_stmt: Option<Box<Statement>>,
        /// The else branch.
        else_stmt: Option<Box<Statement>>,
        /// Source location.
        loc: Loc,
    },
    /// `case (expr) ... endcase`
    Case {
        /// The selector.
        expr: Expr,
        /// The arms in source order.
        arms: Vec<CaseArm>,
        /// Source location.
        loc: Loc,
    },
    /// `#delay stmt`
    Delay {
        /// The delay amount.
        delay: Expr,
        /// The delayed statement.
        body: Option<Box<Statement>>,
        /// Source location.
        loc: Loc,
    },
    /// `@(events) stmt`
    EventWait {
        /// The event expressions.
        events: Vec<Expr>,
        /// The guarded statement.
        body: Option<Box<Statement>>,
        /// Source location.
        loc: Loc,
    },
    /// `forever stmt`
    Forever {
        /// The repeated statement.
        body: Box<Statement>,
        /// Source location.
        loc: Loc,
    },
    /// `for (init; cond; step) body`
    For {
        /// The initialization assignment.
        init: Box<Statement>,
        /// The loop condition.
        cond: Expr,
        /// The step assignment.
        step: Box<Statement>,
        /// The loop body.
        body: Box<Statement>,
        /// Source location.
        loc: Loc,
    },
    /// `repeat (count) body`
    Repeat {
        /// The iteration count.
        count: Expr,
        /// The loop body.
        body: Box<Statement>,
        /// Source location.
        loc: Loc,
    },
    /// `while (cond) body`
    While {
        /// The loop condition.
        cond: Expr,
        /// The loop body.
        body: Box<Statement>,
        /// Source location.
        loc: Loc,
    },
    /// A procedural assignment, including `force` and `assign`.
    Assign {
        /// The target.
        lval: Expr,
        /// The assigned value.
        rval: Expr,
        /// `true` for `force`, which may target nets.
        force: bool,
        /// Source location.
        loc: Loc,
    },
    /// Any statement that cannot contain a scope (task enables, `disable`, ...).
    Other {
        /// Source location.
        loc: Loc,
    },
}

impl Statement {
    /// Returns the source location of this statement.
    pub fn loc(&self) -> Loc {
        match self {
            Statement::Block { loc, .. }
            | Statement::If { loc, .. }
            | Statement::Case { loc, .. }
            | Statement::Delay { loc, .. }
            | Statement::EventWait { loc, .. }
            | Statement::Forever { loc, .. }
            | Statement::For { loc, .. }
            | Statement::Repeat { loc, .. }
            | Statement::While { loc, .. }
            | Statement::Assign { loc, .. }
            | Statement::Other { loc } => *loc,
        }
    }
}

/// Whether a block runs its statements in sequence or in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// `begin ... end`
    Seq,
    /// `fork ... join`
    Par,
}

/// One arm of a `case` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseArm {
    /// The match labels; empty for `default`.
    pub labels: Vec<Expr>,
    /// The arm body.
    pub body: Option<Statement>,
}
