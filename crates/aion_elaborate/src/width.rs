//! Expression width determination.
//!
//! [`test_width`] computes how wide an expression wants to be before it is
//! elaborated. Context-determined operators (arithmetic, bitwise, ternary and
//! the left side of shifts) take the largest of their operand widths and the
//! minimum passed down from the context. Comparisons, logical operators and
//! reductions are 1 bit. Unsized literals count as 32 bits and set the
//! `is_unsized` flag, which lets `+` and `-` grow by one bit up to `lval` so a
//! carry is not lost when assigning to a wider target.

use aion_common::{Ident, Number, INTEGER_WIDTH};
use aion_netlist::{range_width, ConstValue, Design, ExprType, ScopeId};
use aion_pform::{BinaryOp, Expr, IdentExpr, NetKind, Select, UnaryOp};

use crate::context::ElaborationContext;
use crate::eval::eval_const;
use crate::lookup::{find_function, symbol_search, Symbol};

/// Returns the width `expr` will have when elaborated with at least `min`
/// bits, for a target of `lval` bits (0 if there is no target).
pub fn test_width(
    ctx: &ElaborationContext<'_>,
    expr: &Expr,
    scope: ScopeId,
    min: u32,
    lval: u32,
    is_unsized: &mut bool,
) -> u32 {
    match expr {
        Expr::Number { value, .. } => {
            if value.is_sized() {
                value.width()
            } else {
                *is_unsized = true;
                value.width().max(INTEGER_WIDTH)
            }
        }
        Expr::Real { .. } => 1,
        Expr::String { value, .. } => Number::from_string(value).width(),
        Expr::Ident(ident) => ident_width(ctx, ident, scope),
        Expr::Unary { op, operand, .. } => match op {
            UnaryOp::Plus | UnaryOp::Minus | UnaryOp::BitNot => {
                test_width(ctx, operand, scope, min, lval, is_unsized).max(min)
            }
            _ => 1,
        },
        Expr::Binary { op, lhs, rhs, .. } => {
            if op.is_compare() || op.is_logical() {
                return 1;
            }
            if op.is_shift() || *op == BinaryOp::Pow {
                return test_width(ctx, lhs, scope, min, lval, is_unsized).max(min);
            }
            let l = test_width(ctx, lhs, scope, min, lval, is_unsized);
            let r = test_width(ctx, rhs, scope, min, lval, is_unsized);
            let mut width = l.max(r).max(min);
            if matches!(op, BinaryOp::Add | BinaryOp::Sub) && *is_unsized && lval > width {
                width = (width + 1).min(lval);
            }
            width
        }
        Expr::Ternary {
            then_expr,
            else_expr,
            ..
        } => {
            let t = test_width(ctx, then_expr, scope, min, lval, is_unsized);
            let e = test_width(ctx, else_expr, scope, min, lval, is_unsized);
            t.max(e).max(min)
        }
        Expr::Concat { parts, repeat, .. } => {
            let mut ignored = false;
            let sum = parts
                .iter()
                .map(|p| test_width(ctx, p, scope, 0, 0, &mut ignored))
                .fold(0u32, u32::saturating_add);
            let count = repeat
                .as_ref()
                .and_then(|r| eval_const(ctx, r, scope))
                .and_then(|n| n.as_i64())
                .filter(|&n| n > 0)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(1);
            // Oversized concatenations are reported by the elaborator.
            sum.saturating_mul(count)
        }
        Expr::Call {
            name, args, system, ..
        } => {
            if *system {
                let mut ignored = false;
                let arg = args
                    .first()
                    .map(|a| test_width(ctx, a, scope, 0, 0, &mut ignored))
                    .unwrap_or(0);
                let sys = name.last().map(|n| ctx.name(*n)).unwrap_or("");
                system_function_shape(sys, arg).0
            } else {
                find_function(&ctx.design, scope, name)
                    .and_then(|f| {
                        let ret = name.last()?;
                        let sig = ctx.design.scope(f).signals.get(ret)?;
                        Some(ctx.design.signals[*sig].width())
                    })
                    .unwrap_or(1)
            }
        }
        Expr::Event { .. } => 1,
    }
}

fn ident_width(ctx: &ElaborationContext<'_>, ident: &IdentExpr, scope: ScopeId) -> u32 {
    let base = match symbol_search(ctx, scope, &ident.path) {
        Symbol::Genvar(_) => INTEGER_WIDTH,
        Symbol::Param { scope, name } => param_width(&ctx.design, scope, name).unwrap_or(INTEGER_WIDTH),
        Symbol::Signal(sig) => {
            let sig = &ctx.design.signals[sig];
            if sig.kind == NetKind::Real {
                return 1;
            }
            sig.width()
        }
        Symbol::Event(_) | Symbol::NotFound => return 1,
    };
    select_width(ctx, &ident.select, scope).unwrap_or(base)
}

/// Returns the width a select yields, or `None` for no select.
///
/// Part and indexed selects whose bounds do not fold count as 1 bit; the
/// elaborator reports them.
pub fn select_width(ctx: &ElaborationContext<'_>, select: &Select, scope: ScopeId) -> Option<u32> {
    let fold = |e: &Expr| eval_const(ctx, e, scope).and_then(|n| n.as_i64());
    match select {
        Select::None => None,
        Select::Bit(_) => Some(1),
        Select::Part { msb, lsb } => Some(match (fold(msb), fold(lsb)) {
            (Some(m), Some(l)) => range_width(m, l).unwrap_or(1),
            _ => 1,
        }),
        Select::IndexedUp { width, .. } | Select::IndexedDown { width, .. } => Some(
            fold(width)
                .filter(|&w| w > 0)
                .and_then(|w| u32::try_from(w).ok())
                .unwrap_or(1),
        ),
    }
}

/// Returns the width of a parameter if it is known yet.
///
/// Known means either the declared range folds or the value does.
pub fn param_width(design: &Design, scope: ScopeId, name: Ident) -> Option<u32> {
    let slot = design.scope(scope).params.get(&name)?;
    if slot.is_ranged() {
        let (m, l) = design.param_range(scope, name)?;
        return range_width(m, l);
    }
    match design.param_value(scope, name)? {
        ConstValue::Logic(n) => Some(n.width()),
        ConstValue::Real(_) => Some(1),
    }
}

/// Returns `(width, signed, type)` of a system function's result.
///
/// `arg_width` is the self-determined width of the first argument, used by
/// `$signed` and `$unsigned`.
pub fn system_function_shape(name: &str, arg_width: u32) -> (u32, bool, ExprType) {
    match name {
        "$time" | "$realtobits" => (64, false, ExprType::Logic),
        "$stime" => (32, false, ExprType::Logic),
        "$realtime" | "$itor" | "$bitstoreal" => (1, true, ExprType::Real),
        "$random" | "$rtoi" | "$clog2" | "$bits" => (INTEGER_WIDTH, true, ExprType::Logic),
        "$signed" => (arg_width.max(1), true, ExprType::Logic),
        "$unsigned" => (arg_width.max(1), false, ExprType::Logic),
        _ => (INTEGER_WIDTH, false, ExprType::Logic),
    }
}
