//! Constant evaluation of typed expressions.
//!
//! [`NetExpr::reduce`] computes the value of an expression tree whose leaves
//! are constants and parameter references. Parameters are looked up through a
//! [`ParamResolver`], which lets the parameter evaluation pass evaluate
//! dependencies on demand. Signal reads and calls never reduce.

use crate::const_value::ConstValue;
use crate::expr::{NetExpr, NetExprKind};
use crate::ids::ScopeId;
use aion_common::{Ident, Logic, LogicVec, Number};
use aion_pform::{BinaryOp, UnaryOp};

/// Supplies parameter values to [`NetExpr::reduce`].
pub trait ParamResolver {
    /// Returns the value of parameter `name` in `scope`, or `None` if it is
    /// unknown or cannot be evaluated.
    fn resolve_param(&mut self, scope: ScopeId, name: Ident) -> Option<ConstValue>;
}

impl NetExpr {
    /// Evaluates this expression to a constant.
    ///
    /// Returns `None` if any leaf is not constant.
    pub fn reduce(&self, resolver: &mut dyn ParamResolver) -> Option<ConstValue> {
        match &self.kind {
            NetExprKind::Const(n) => Some(ConstValue::Logic(n.clone())),
            NetExprKind::RealConst(v) => Some(ConstValue::Real(*v)),
            NetExprKind::Param { scope, name } => resolver.resolve_param(*scope, *name),
            NetExprKind::Signal { .. }
            | NetExprKind::UserCall { .. }
            | NetExprKind::SysCall { .. }
            | NetExprKind::ScopeRef(_) => None,
            NetExprKind::Select { base, offset } => {
                let base = base.reduce(resolver)?.to_number();
                let offset = offset.reduce(resolver)?.to_number();
                let value = match offset.as_i64() {
                    Some(off) => base.slice(off, self.width),
                    None => Number::all_x(self.width),
                };
                Some(ConstValue::Logic(value))
            }
            NetExprKind::Unary { op, operand } => reduce_unary(*op, operand.reduce(resolver)?),
            NetExprKind::Binary { op, lhs, rhs } => {
                let l = lhs.reduce(resolver)?;
                let r = rhs.reduce(resolver)?;
                reduce_binary(*op, l, r)
            }
            NetExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => match cond.reduce(resolver)?.to_number().is_true() {
                Some(true) => then_expr.reduce(resolver),
                Some(false) => else_expr.reduce(resolver),
                None => {
                    let a = then_expr.reduce(resolver)?;
                    let b = else_expr.reduce(resolver)?;
                    Some(ConstValue::Logic(merge_unknown(a.as_number()?, b.as_number()?)))
                }
            },
            NetExprKind::Concat { parts, repeat } => {
                let mut values = Vec::with_capacity(parts.len());
                for part in parts {
                    match part.reduce(resolver)? {
                        ConstValue::Logic(n) => values.push(n),
                        ConstValue::Real(_) => return None,
                    }
                }
                Some(ConstValue::Logic(Number::concat(&values).repeat(*repeat)))
            }
            NetExprKind::Resize(inner) => {
                // Extension follows the operand's signedness as elaborated.
                let value = inner.reduce(resolver)?.to_number().with_signed(inner.signed);
                Some(ConstValue::Logic(
                    value.resized(self.width).with_signed(self.signed),
                ))
            }
        }
    }
}

fn reduce_unary(op: UnaryOp, value: ConstValue) -> Option<ConstValue> {
    let n = match value {
        ConstValue::Real(v) => {
            return match op {
                UnaryOp::Plus => Some(ConstValue::Real(v)),
                UnaryOp::Minus => Some(ConstValue::Real(-v)),
                UnaryOp::LogNot => Some(ConstValue::Logic(Number::from_bool(v == 0.0))),
                _ => None,
            };
        }
        ConstValue::Logic(n) => n,
    };
    let result = match op {
        UnaryOp::Plus => n,
        UnaryOp::Minus => n.neg_wrapping(),
        UnaryOp::LogNot => n.log_not(),
        UnaryOp::BitNot => n.not(),
        UnaryOp::RedAnd => n.reduce_and(),
        UnaryOp::RedNand => n.reduce_and().not(),
        UnaryOp::RedOr => n.reduce_or(),
        UnaryOp::RedNor => n.reduce_or().not(),
        UnaryOp::RedXor => n.reduce_xor(),
        UnaryOp::RedXnor => n.reduce_xor().not(),
    };
    Some(ConstValue::Logic(result))
}

fn reduce_binary(op: BinaryOp, l: ConstValue, r: ConstValue) -> Option<ConstValue> {
    if l.is_real() || r.is_real() {
        return reduce_real(op, l.as_f64()?, r.as_f64()?);
    }
    let (l, r) = (l.to_number(), r.to_number());
    let result = match op {
        BinaryOp::Add => l.add(&r),
        BinaryOp::Sub => l.sub(&r),
        BinaryOp::Mul => l.mul(&r),
        BinaryOp::Div => l.div(&r),
        BinaryOp::Mod => l.rem(&r),
        BinaryOp::Pow => l.pow(&r),
        BinaryOp::Eq => l.cmp_eq(&r),
        BinaryOp::Neq => l.cmp_ne(&r),
        BinaryOp::CaseEq => l.case_eq(&r),
        BinaryOp::CaseNeq => l.case_ne(&r),
        BinaryOp::Lt => l.cmp_lt(&r),
        BinaryOp::Le => l.cmp_le(&r),
        BinaryOp::Gt => l.cmp_gt(&r),
        BinaryOp::Ge => l.cmp_ge(&r),
        BinaryOp::LogAnd => l.log_and(&r),
        BinaryOp::LogOr => l.log_or(&r),
        BinaryOp::BitAnd => l.and(&r),
        BinaryOp::BitOr => l.or(&r),
        BinaryOp::BitXor => l.xor(&r),
        BinaryOp::BitXnor => l.xnor(&r),
        BinaryOp::Shl | BinaryOp::AShl | BinaryOp::Shr | BinaryOp::AShr => {
            match r.as_u64() {
                Some(amount) => match op {
                    BinaryOp::Shl | BinaryOp::AShl => l.shl(amount),
                    BinaryOp::Shr => l.shr(amount),
                    _ => l.ashr(amount),
                },
                None => Number::all_x(l.width()),
            }
        }
    };
    Some(ConstValue::Logic(result))
}

fn reduce_real(op: BinaryOp, a: f64, b: f64) -> Option<ConstValue> {
    let real = |v: f64| Some(ConstValue::Real(v));
    let truth = |v: bool| Some(ConstValue::Logic(Number::from_bool(v)));
    match op {
        BinaryOp::Add => real(a + b),
        BinaryOp::Sub => real(a - b),
        BinaryOp::Mul => real(a * b),
        BinaryOp::Div => real(a / b),
        BinaryOp::Pow => real(a.powf(b)),
        BinaryOp::Eq | BinaryOp::CaseEq => truth(a == b),
        BinaryOp::Neq | BinaryOp::CaseNeq => truth(a != b),
        BinaryOp::Lt => truth(a < b),
        BinaryOp::Le => truth(a <= b),
        BinaryOp::Gt => truth(a > b),
        BinaryOp::Ge => truth(a >= b),
        BinaryOp::LogAnd => truth(a != 0.0 && b != 0.0),
        BinaryOp::LogOr => truth(a != 0.0 || b != 0.0),
        _ => None,
    }
}

/// Combines the arms of a conditional whose condition is unknown: bits on
/// which both arms agree survive, the rest become `x`.
fn merge_unknown(a: &Number, b: &Number) -> Number {
    let width = a.width().max(b.width());
    let (a, b) = (a.resized(width), b.resized(width));
    let mut bits = LogicVec::new(width);
    for i in 0..width {
        let (x, y) = (a.bit(i), b.bit(i));
        bits.set(i, if x == y && x.is_defined() { x } else { Logic::X });
    }
    Number::new(bits, a.is_signed() && b.is_signed(), true)
}
