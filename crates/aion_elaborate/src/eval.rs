//! Constant folding on the parse form.
//!
//! [`eval_const`] is used wherever elaboration needs a number straight from
//! the source before any typed expression exists: instance array bounds,
//! signal ranges, select bounds and replication counts. It returns `None`
//! for anything that is not constant; callers decide whether that is an
//! error.
//!
//! Operators work on [`Number`] values in their natural widths. Comparisons
//! return their 1-bit truth value zero-extended to the width of the left
//! operand. Any undefined operand makes the whole result the all-`x` vector of
//! the left operand's width, except for shifts and case equality.

use aion_common::{Logic, Number, INTEGER_WIDTH};
use aion_netlist::{ConstValue, ScopeId};
use aion_pform::{BinaryOp, Expr, UnaryOp};

use crate::context::ElaborationContext;
use crate::lookup::{symbol_search, Symbol};

/// Folds a parse-form expression to a constant, looking names up from `scope`.
///
/// Parameters fold to the value they have so far. The genvar of the loop being
/// unrolled in `scope` evaluates to a 32-bit signed number.
pub fn eval_const(ctx: &ElaborationContext<'_>, expr: &Expr, scope: ScopeId) -> Option<Number> {
    match expr {
        Expr::Number { value, .. } => Some(value.clone()),
        Expr::Real { value, .. } => Some(Number::from_f64(*value)),
        Expr::String { value, .. } => Some(Number::from_string(value)),
        Expr::Ident(ident) => {
            if ident.is_indexed() {
                return None;
            }
            match symbol_search(ctx, scope, &ident.path) {
                Symbol::Genvar(v) => Some(Number::from_i64_width(v, INTEGER_WIDTH, true)),
                Symbol::Param { scope, name } => {
                    match ctx.design.param_value(scope, name)? {
                        ConstValue::Logic(n) => Some(n),
                        ConstValue::Real(v) => Some(Number::from_f64(v)),
                    }
                }
                Symbol::Signal(_) | Symbol::Event(_) | Symbol::NotFound => None,
            }
        }
        Expr::Unary { op, operand, .. } => {
            let v = eval_const(ctx, operand, scope)?;
            Some(eval_unary(*op, &v))
        }
        Expr::Binary { op, lhs, rhs, .. } => {
            let l = eval_const(ctx, lhs, scope)?;
            let r = eval_const(ctx, rhs, scope)?;
            eval_binary(*op, &l, &r)
        }
        Expr::Ternary {
            cond,
            then_expr,
            else_expr,
            ..
        } => {
            let c = eval_const(ctx, cond, scope)?;
            // Only the selected arm is evaluated.
            match c.bit(0) {
                Logic::One => eval_const(ctx, then_expr, scope),
                Logic::Zero => eval_const(ctx, else_expr, scope),
                Logic::X | Logic::Z => None,
            }
        }
        Expr::Concat { parts, repeat, .. } => {
            let mut values = Vec::with_capacity(parts.len());
            for part in parts {
                values.push(eval_const(ctx, part, scope)?);
            }
            let count = match repeat {
                Some(r) => eval_const(ctx, r, scope)?.as_i64()?,
                None => 1,
            };
            if count <= 0 {
                return None;
            }
            Some(Number::concat(&values).repeat(u32::try_from(count).ok()?))
        }
        Expr::Call { .. } | Expr::Event { .. } => None,
    }
}

/// Applies a unary operator to a constant.
pub fn eval_unary(op: UnaryOp, v: &Number) -> Number {
    match op {
        UnaryOp::Plus => v.clone(),
        UnaryOp::Minus => v.neg(),
        UnaryOp::BitNot => v.not(),
        UnaryOp::LogNot => v.log_not(),
        UnaryOp::RedAnd => v.reduce_and(),
        UnaryOp::RedNand => v.reduce_and().not(),
        UnaryOp::RedOr => v.reduce_or(),
        UnaryOp::RedNor => v.reduce_or().not(),
        UnaryOp::RedXor => v.reduce_xor(),
        UnaryOp::RedXnor => v.reduce_xor().not(),
    }
}

/// Applies a binary operator to two constants.
///
/// Returns `None` only for a shift by an undefined amount.
pub fn eval_binary(op: BinaryOp, l: &Number, r: &Number) -> Option<Number> {
    let width = l.width();
    let defined = l.is_defined() && r.is_defined();
    Some(match op {
        BinaryOp::Shl | BinaryOp::AShl | BinaryOp::Shr | BinaryOp::AShr => {
            if !r.is_defined() {
                return None;
            }
            let amount = r.as_u64().unwrap_or(u64::MAX);
            match op {
                BinaryOp::Shr => l.shr(amount),
                BinaryOp::AShr => l.ashr(amount),
                _ => l.shl(amount),
            }
        }
        BinaryOp::CaseEq => l.case_eq(r).resized(width),
        BinaryOp::CaseNeq => l.case_ne(r).resized(width),
        _ if !defined => Number::all_x(width),
        BinaryOp::Add => l.add(r),
        BinaryOp::Sub => l.sub(r),
        BinaryOp::Mul => l.mul(r),
        BinaryOp::Div => l.div(r),
        BinaryOp::Mod => l.rem(r),
        BinaryOp::Pow => l.pow(r),
        BinaryOp::Eq => l.cmp_eq(r).resized(width),
        BinaryOp::Neq => l.cmp_ne(r).resized(width),
        BinaryOp::Lt => l.cmp_lt(r).resized(width),
        BinaryOp::Le => l.cmp_le(r).resized(width),
        BinaryOp::Gt => l.cmp_gt(r).resized(width),
        BinaryOp::Ge => l.cmp_ge(r).resized(width),
        BinaryOp::LogAnd => l.log_and(r),
        BinaryOp::LogOr => l.log_or(r),
        BinaryOp::BitAnd => l.and(r),
        BinaryOp::BitOr => l.or(r),
        BinaryOp::BitXor => l.xor(r),
        BinaryOp::BitXnor => l.xnor(r),
    })
}
