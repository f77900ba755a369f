//! Typed, width-resolved netlist expressions.
//!
//! Unlike the parse form, every [`NetExpr`] node knows its bit width, its
//! signedness and whether it is a logic, boolean, or real value. Operators
//! reuse the parse-form operator enums; unary `+` never survives elaboration.

use crate::ids::{ScopeId, SignalId};
use aion_common::{Ident, Loc, Number};
use aion_pform::{BinaryOp, UnaryOp};
use serde::{Deserialize, Serialize};

/// The value category of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExprType {
    /// A four-state vector.
    Logic,
    /// A 1-bit truth value from a comparison or logical operator.
    Bool,
    /// A real number.
    Real,
}

/// A typed expression node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetExpr {
    /// What the node computes.
    pub kind: NetExprKind,
    /// Result width in bits; 0 when it depends on a parameter not yet evaluated.
    pub width: u32,
    /// Whether the result is signed.
    pub signed: bool,
    /// The value category.
    pub ty: ExprType,
    /// Source location.
    pub loc: Loc,
}

/// The node kinds of a typed expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NetExprKind {
    /// A literal or folded integral constant.
    Const(Number),
    /// A real constant.
    RealConst(f64),
    /// A reference to a parameter, resolved to its value on demand.
    Param {
        /// The scope owning the parameter.
        scope: ScopeId,
        /// The parameter name.
        name: Ident,
    },
    /// A signal read, optionally one word of a memory.
    Signal {
        /// The read signal.
        signal: SignalId,
        /// The memory word index, already normalized to a zero-based address.
        word: Option<Box<NetExpr>>,
    },
    /// `width` bits of `base` starting at the normalized bit `offset`.
    Select {
        /// The selected-from expression.
        base: Box<NetExpr>,
        /// The lowest selected bit, zero-based.
        offset: Box<NetExpr>,
    },
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<NetExpr>,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<NetExpr>,
        /// Right operand.
        rhs: Box<NetExpr>,
    },
    /// A conditional expression.
    Ternary {
        /// The condition.
        cond: Box<NetExpr>,
        /// Value when true.
        then_expr: Box<NetExpr>,
        /// Value when false.
        else_expr: Box<NetExpr>,
    },
    /// A concatenation, first part most significant, replicated `repeat` times.
    Concat {
        /// The parts.
        parts: Vec<NetExpr>,
        /// Replication count; 1 for a plain concatenation.
        repeat: u32,
    },
    /// A call of a user function.
    UserCall {
        /// The function scope.
        function: ScopeId,
        /// The arguments.
        args: Vec<NetExpr>,
    },
    /// A call of a system function such as `$time`.
    SysCall {
        /// The function name including `$`.
        name: Ident,
        /// The arguments.
        args: Vec<NetExpr>,
    },
    /// A scope passed by name to a system task.
    ScopeRef(ScopeId),
    /// The operand extended or truncated to this node's width.
    Resize(Box<NetExpr>),
}

impl NetExpr {
    /// Creates a node.
    pub fn new(kind: NetExprKind, width: u32, signed: bool, ty: ExprType, loc: Loc) -> Self {
        Self {
            kind,
            width,
            signed,
            ty,
            loc,
        }
    }

    /// Creates a constant node shaped like `value`.
    pub fn constant(value: Number, loc: Loc) -> Self {
        let width = value.width();
        let signed = value.is_signed();
        Self::new(NetExprKind::Const(value), width, signed, ExprType::Logic, loc)
    }

    /// Creates a real constant node.
    pub fn real(value: f64, loc: Loc) -> Self {
        Self::new(NetExprKind::RealConst(value), 1, true, ExprType::Real, loc)
    }

    /// Returns the integral constant if this node is one.
    pub fn as_const(&self) -> Option<&Number> {
        match &self.kind {
            NetExprKind::Const(n) => Some(n),
            _ => None,
        }
    }

    /// Returns `true` for integral and real constant nodes.
    pub fn is_const(&self) -> bool {
        matches!(self.kind, NetExprKind::Const(_) | NetExprKind::RealConst(_))
    }

    /// Returns this expression at exactly `width` bits.
    ///
    /// Constants are re-padded in place; other nodes get a [`NetExprKind::Resize`]
    /// wrapper. Nodes of unknown (zero) width and reals are left alone.
    pub fn resized(self, width: u32) -> NetExpr {
        if self.width == width || self.width == 0 || self.ty == ExprType::Real {
            return self;
        }
        match self.kind {
            NetExprKind::Const(n) => NetExpr::constant(n.resized(width), self.loc),
            kind => {
                let signed = self.signed;
                let loc = self.loc;
                let inner = NetExpr { kind, ..self };
                NetExpr::new(
                    NetExprKind::Resize(Box::new(inner)),
                    width,
                    signed,
                    ExprType::Logic,
                    loc,
                )
            }
        }
    }

    /// Collects every parameter referenced by this expression.
    pub fn params(&self) -> Vec<(ScopeId, Ident)> {
        let mut out = Vec::new();
        self.visit(&mut |e| {
            if let NetExprKind::Param { scope, name } = e.kind {
                out.push((scope, name));
            }
        });
        out
    }

    /// Calls `f` on this node and every descendant, parents first.
    pub fn visit(&self, f: &mut impl FnMut(&NetExpr)) {
        f(self);
        match &self.kind {
            NetExprKind::Const(_)
            | NetExprKind::RealConst(_)
            | NetExprKind::Param { .. }
            | NetExprKind::ScopeRef(_) => {}
            NetExprKind::Signal { word, .. } => {
                if let Some(word) = word {
                    word.visit(f);
                }
            }
            NetExprKind::Select { base, offset } => {
                base.visit(f);
                offset.visit(f);
            }
            NetExprKind::Unary { operand, .. } => operand.visit(f),
            NetExprKind::Binary { lhs, rhs, .. } => {
                lhs.visit(f);
                rhs.visit(f);
            }
            NetExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                cond.visit(f);
                then_expr.visit(f);
                else_expr.visit(f);
            }
            NetExprKind::Concat { parts, .. } => parts.iter().for_each(|p| p.visit(f)),
            NetExprKind::UserCall { args, .. } | NetExprKind::SysCall { args, .. } => {
                args.iter().for_each(|a| a.visit(f))
            }
            NetExprKind::Resize(inner) => inner.visit(f),
        }
    }
}

/// One contiguous piece of an assignment target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LvalPart {
    /// The assigned signal.
    pub signal: SignalId,
    /// The memory word, normalized.
    pub word: Option<NetExpr>,
    /// The lowest assigned bit, normalized; `None` for the whole signal.
    pub offset: Option<NetExpr>,
    /// Number of assigned bits.
    pub width: u32,
}

/// An assignment target: one part, or several for a concatenation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetLval {
    /// The parts, most significant first.
    pub parts: Vec<LvalPart>,
}

impl NetLval {
    /// Total width of the target.
    pub fn width(&self) -> u32 {
        self.parts.iter().map(|p| p.width).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_shape() {
        let e = NetExpr::constant(Number::from_i64(-3), Loc::DUMMY);
        assert_eq!(e.width, 32);
        assert!(e.signed);
        assert_eq!(e.ty, ExprType::Logic);
        assert!(e.is_const());
    }

    #[test]
    fn resizing_constant_folds() {
        let e = NetExpr::constant(Number::from_u64(5, 4), Loc::DUMMY).resized(8);
        assert_eq!(e.width, 8);
        assert_eq!(e.as_const().and_then(|n| n.as_u64()), Some(5));
    }

    #[test]
    fn resizing_signal_wraps() {
        let sig = NetExpr::new(
            NetExprKind::Signal {
                signal: SignalId::from_raw(0),
                word: None,
            },
            4,
            false,
            ExprType::Logic,
            Loc::DUMMY,
        );
        let wide = sig.resized(16);
        assert_eq!(wide.width, 16);
        assert!(matches!(wide.kind, NetExprKind::Resize(ref inner) if inner.width == 4));
    }

    #[test]
    fn unknown_width_is_not_resized() {
        let p = NetExpr::new(
            NetExprKind::Param {
                scope: ScopeId::from_raw(0),
                name: Ident::from_raw(1),
            },
            0,
            false,
            ExprType::Logic,
            Loc::DUMMY,
        );
        let same = p.resized(8);
        assert_eq!(same.width, 0);
        assert_eq!(same.params(), vec![(ScopeId::from_raw(0), Ident::from_raw(1))]);
    }

    #[test]
    fn lval_width_sums_parts() {
        let lval = NetLval {
            parts: vec![
                LvalPart {
                    signal: SignalId::from_raw(0),
                    word: None,
                    offset: None,
                    width: 4,
                },
                LvalPart {
                    signal: SignalId::from_raw(1),
                    word: None,
                    offset: None,
                    width: 3,
                },
            ],
        };
        assert_eq!(lval.width(), 7);
    }
}
