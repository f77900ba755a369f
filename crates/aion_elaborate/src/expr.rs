//! Expression elaboration: parse-form [`Expr`] to typed [`NetExpr`].
//!
//! Identifiers are bound to parameters, signals or the current genvar,
//! selects are normalized to zero-based offsets from the least significant
//! bit, and the operands of context-determined operators are extended to the
//! operator's width. Mixed-signedness operands are treated as unsigned.
//!
//! [`elaborate_pexpr`] elaborates parameter expressions, where only
//! parameters, genvars and constants may appear. [`elab_and_eval`] sizes an
//! expression for its target with [`test_width`], elaborates it and folds
//! the result when every leaf is constant.

use aion_common::{Ident, Loc, Number, INTEGER_WIDTH};
use aion_netlist::{range_width, ConstValue, ExprType, NetExpr, NetExprKind, ScopeId, SignalId};
use aion_pform::{BinaryOp, Expr, IdentExpr, NetKind, Select, UnaryOp};

use crate::context::ElaborationContext;
use crate::errors;
use crate::eval::eval_const;
use crate::lookup::{find_function, find_scope_from, symbol_search, Symbol};
use crate::width::{system_function_shape, test_width};

/// Elaborates `expr` in `scope`.
///
/// `context_width` is the width context-determined operators are built at,
/// or `-1` for a self-determined expression. It never truncates an operand.
/// With `sys_task_arg`, a name that only resolves to a scope becomes a
/// [`NetExprKind::ScopeRef`]. Errors go to the sink; `None` means the
/// expression could not be elaborated.
pub fn elaborate_expr(
    ctx: &ElaborationContext<'_>,
    expr: &Expr,
    scope: ScopeId,
    context_width: i32,
    sys_task_arg: bool,
) -> Option<NetExpr> {
    let elab = Elaborator {
        ctx,
        scope,
        sys_task_arg,
        param_mode: false,
    };
    elab.expr(expr, context_width)
}

/// Elaborates the value expression of a parameter, override or defparam.
///
/// Only constants, parameters and the current genvar may appear. Parameter
/// references are kept so later overrides and defparams reach dependent
/// parameters; an expression without any is folded right away.
pub fn elaborate_pexpr(ctx: &ElaborationContext<'_>, expr: &Expr, scope: ScopeId) -> Option<NetExpr> {
    let elab = Elaborator {
        ctx,
        scope,
        sys_task_arg: false,
        param_mode: true,
    };
    let e = elab.expr(expr, -1)?;
    if e.params().is_empty() {
        Some(fold(ctx, e))
    } else {
        Some(e)
    }
}

/// Elaborates `expr` for a target of `width` bits (`-1` if self-determined)
/// and folds it if possible.
pub fn elab_and_eval(ctx: &ElaborationContext<'_>, expr: &Expr, scope: ScopeId, width: i32) -> Option<NetExpr> {
    let lval = width.max(0) as u32;
    let mut is_unsized = false;
    let expr_width = test_width(ctx, expr, scope, lval, lval, &mut is_unsized);
    let e = elaborate_expr(ctx, expr, scope, expr_width as i32, false)?;
    Some(fold(ctx, e))
}

/// Replaces `e` by a constant node if it reduces.
fn fold(ctx: &ElaborationContext<'_>, e: NetExpr) -> NetExpr {
    match ctx.design.reduce(&e) {
        Some(ConstValue::Logic(n)) => {
            let folded = NetExpr::constant(n, e.loc);
            if e.width == 0 {
                folded
            } else {
                folded.resized(e.width)
            }
        }
        Some(ConstValue::Real(v)) => NetExpr::real(v, e.loc),
        None => e,
    }
}

/// Declared bounds of a vector, used to normalize indices.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Bounds {
    pub msb: i64,
    pub lsb: i64,
}

impl Bounds {
    fn normalize(self, index: i64) -> i64 {
        if self.msb >= self.lsb {
            index.saturating_sub(self.lsb)
        } else {
            self.lsb.saturating_sub(index)
        }
    }

    fn descending(self) -> bool {
        self.msb >= self.lsb
    }

    /// Bounds are only built from ranges that fit.
    fn width(self) -> u32 {
        range_width(self.msb, self.lsb).unwrap_or(u32::MAX)
    }
}

pub(crate) struct Elaborator<'c, 'a> {
    pub ctx: &'c ElaborationContext<'a>,
    pub scope: ScopeId,
    pub sys_task_arg: bool,
    pub param_mode: bool,
}

impl<'c, 'a> Elaborator<'c, 'a> {
    pub fn new(ctx: &'c ElaborationContext<'a>, scope: ScopeId) -> Self {
        Self {
            ctx,
            scope,
            sys_task_arg: false,
            param_mode: false,
        }
    }

    fn emit(&self, diag: aion_diagnostics::Diagnostic) {
        self.ctx.sink.emit(diag);
    }

    fn path_name(&self, path: &[Ident]) -> String {
        self.ctx.interner.join_path(path)
    }

    pub fn expr(&self, expr: &Expr, width: i32) -> Option<NetExpr> {
        match expr {
            Expr::Number { value, loc } => Some(NetExpr::constant(value.clone(), *loc)),
            Expr::Real { value, loc } => Some(NetExpr::real(*value, *loc)),
            Expr::String { value, loc } => Some(NetExpr::constant(Number::from_string(value), *loc)),
            Expr::Ident(ident) => self.ident(ident),
            Expr::Unary { op, operand, loc } => self.unary(*op, operand, width, *loc),
            Expr::Binary { op, lhs, rhs, loc } => self.binary(*op, lhs, rhs, width, *loc),
            Expr::Ternary {
                cond,
                then_expr,
                else_expr,
                loc,
            } => self.ternary(cond, then_expr, else_expr, width, *loc),
            Expr::Concat { parts, repeat, loc } => self.concat(parts, repeat.as_deref(), *loc),
            Expr::Call {
                name,
                args,
                system,
                loc,
            } => self.call(name, args, *system, *loc),
            Expr::Event { loc, .. } => {
                self.emit(errors::error_event_expr(*loc));
                None
            }
        }
    }

    fn unary(&self, op: UnaryOp, operand: &Expr, width: i32, loc: Loc) -> Option<NetExpr> {
        match op {
            UnaryOp::Plus => self.expr(operand, width),
            UnaryOp::Minus | UnaryOp::BitNot => {
                let mut v = self.expr(operand, width)?;
                if v.width != 0 && width > v.width as i32 {
                    v = v.resized(width as u32);
                }
                let (w, signed, ty) = (v.width, v.signed, v.ty);
                let node = NetExprKind::Unary {
                    op,
                    operand: Box::new(v),
                };
                Some(NetExpr::new(node, w, signed, ty, loc))
            }
            _ => {
                let v = self.expr(operand, -1)?;
                let ty = if op == UnaryOp::LogNot {
                    ExprType::Bool
                } else {
                    ExprType::Logic
                };
                let node = NetExprKind::Unary {
                    op,
                    operand: Box::new(v),
                };
                Some(NetExpr::new(node, 1, false, ty, loc))
            }
        }
    }

    fn binary(&self, op: BinaryOp, lhs: &Expr, rhs: &Expr, width: i32, loc: Loc) -> Option<NetExpr> {
        if op.is_compare() {
            // Operands are sized against each other, not against the context.
            let mut ignored = false;
            let lw = test_width(self.ctx, lhs, self.scope, 0, 0, &mut ignored);
            let rw = test_width(self.ctx, rhs, self.scope, 0, 0, &mut ignored);
            let w = lw.max(rw);
            let (l, r) = (self.expr(lhs, w as i32), self.expr(rhs, w as i32));
            let (l, r) = balance(l?, r?, w);
            let node = NetExprKind::Binary {
                op,
                lhs: Box::new(l),
                rhs: Box::new(r),
            };
            return Some(NetExpr::new(node, 1, false, ExprType::Bool, loc));
        }

        if op.is_logical() {
            let (l, r) = (self.expr(lhs, -1), self.expr(rhs, -1));
            let node = NetExprKind::Binary {
                op,
                lhs: Box::new(l?),
                rhs: Box::new(r?),
            };
            return Some(NetExpr::new(node, 1, false, ExprType::Bool, loc));
        }

        if op.is_shift() || op == BinaryOp::Pow {
            let (l, r) = (self.expr(lhs, width), self.expr(rhs, -1));
            let (mut l, r) = (l?, r?);
            if l.width != 0 && width > l.width as i32 {
                l = l.resized(width as u32);
            }
            let real = l.ty == ExprType::Real || r.ty == ExprType::Real;
            let (w, signed) = if real { (1, true) } else { (l.width, l.signed) };
            let ty = if real { ExprType::Real } else { ExprType::Logic };
            let node = NetExprKind::Binary {
                op,
                lhs: Box::new(l),
                rhs: Box::new(r),
            };
            return Some(NetExpr::new(node, w, signed, ty, loc));
        }

        let (l, r) = (self.expr(lhs, width), self.expr(rhs, width));
        let (l, r) = (l?, r?);
        if l.ty == ExprType::Real || r.ty == ExprType::Real {
            let node = NetExprKind::Binary {
                op,
                lhs: Box::new(l),
                rhs: Box::new(r),
            };
            return Some(NetExpr::new(node, 1, true, ExprType::Real, loc));
        }
        let w = if l.width == 0 || r.width == 0 {
            0
        } else {
            l.width.max(r.width).max(width.max(0) as u32)
        };
        let (l, r) = balance(l, r, w);
        let signed = l.signed && r.signed;
        let node = NetExprKind::Binary {
            op,
            lhs: Box::new(l),
            rhs: Box::new(r),
        };
        Some(NetExpr::new(node, w, signed, ExprType::Logic, loc))
    }

    fn ternary(&self, cond: &Expr, then_expr: &Expr, else_expr: &Expr, width: i32, loc: Loc) -> Option<NetExpr> {
        let c = self.expr(cond, -1);
        let t = self.expr(then_expr, width);
        let e = self.expr(else_expr, width);
        let (c, t, e) = (c?, t?, e?);
        let (w, signed, ty) = if t.ty == ExprType::Real || e.ty == ExprType::Real {
            (1, true, ExprType::Real)
        } else if t.width == 0 || e.width == 0 {
            (0, t.signed && e.signed, ExprType::Logic)
        } else {
            let w = t.width.max(e.width).max(width.max(0) as u32);
            (w, t.signed && e.signed, ExprType::Logic)
        };
        let (t, e) = if ty == ExprType::Real { (t, e) } else { balance(t, e, w) };
        let node = NetExprKind::Ternary {
            cond: Box::new(c),
            then_expr: Box::new(t),
            else_expr: Box::new(e),
        };
        Some(NetExpr::new(node, w, signed, ty, loc))
    }

    fn concat(&self, parts: &[Expr], repeat: Option<&Expr>, loc: Loc) -> Option<NetExpr> {
        let count = match repeat {
            Some(r) => match eval_const(self.ctx, r, self.scope).and_then(|n| n.as_i64()) {
                Some(n) if n > 0 => match u32::try_from(n) {
                    Ok(n) => n,
                    Err(_) => {
                        self.emit(errors::error_too_wide("concatenation repeat count", r.loc()));
                        return None;
                    }
                },
                _ => {
                    self.emit(errors::error_not_constant("concatenation repeat count", r.loc()));
                    return None;
                }
            },
            None => 1,
        };

        let mut ok = true;
        let mut elaborated = Vec::with_capacity(parts.len());
        for part in parts {
            if let Expr::Number { value, loc } = part {
                if !value.is_sized() {
                    self.emit(errors::error_unsized_concat(&value.to_string(), *loc));
                    ok = false;
                    continue;
                }
            }
            match self.expr(part, -1) {
                Some(e) => elaborated.push(e),
                None => ok = false,
            }
        }
        if !ok {
            return None;
        }

        let w = if elaborated.iter().any(|p| p.width == 0) {
            0
        } else {
            let total = elaborated
                .iter()
                .try_fold(0u32, |sum, p| sum.checked_add(p.width))
                .and_then(|sum| sum.checked_mul(count));
            match total {
                Some(w) => w,
                None => {
                    self.emit(errors::error_too_wide("concatenation", loc));
                    return None;
                }
            }
        };
        let node = NetExprKind::Concat {
            parts: elaborated,
            repeat: count,
        };
        Some(NetExpr::new(node, w, false, ExprType::Logic, loc))
    }

    fn call(&self, name: &[Ident], args: &[Expr], system: bool, loc: Loc) -> Option<NetExpr> {
        let display = self.path_name(name);
        if self.param_mode {
            self.emit(errors::sorry_constant_call(&display, loc));
            return None;
        }

        if system {
            let arg_elab = Elaborator {
                sys_task_arg: true,
                ..*self
            };
            let args: Vec<Option<NetExpr>> = args.iter().map(|a| arg_elab.expr(a, -1)).collect();
            let args: Vec<NetExpr> = args.into_iter().collect::<Option<_>>()?;
            let first = args.first().map(|a| a.width).unwrap_or(0);
            let (w, signed, ty) = system_function_shape(&display, first);
            let sys_name = *name.last()?;
            let node = NetExprKind::SysCall { name: sys_name, args };
            return Some(NetExpr::new(node, w, signed, ty, loc));
        }

        let Some(function) = find_function(&self.ctx.design, self.scope, name) else {
            self.emit(errors::error_unknown_function(
                &display,
                &self.ctx.scope_name(self.scope),
                loc,
            ));
            return None;
        };
        let args: Vec<Option<NetExpr>> = args.iter().map(|a| self.expr(a, -1)).collect();
        let args: Vec<NetExpr> = args.into_iter().collect::<Option<_>>()?;

        let design = &self.ctx.design;
        let ret = name
            .last()
            .and_then(|n| design.scope(function).signals.get(n))
            .map(|&s| &design.signals[s]);
        let (w, signed, ty) = match ret {
            Some(sig) if sig.kind == NetKind::Real => (1, true, ExprType::Real),
            Some(sig) => (sig.width(), sig.signed, ExprType::Logic),
            None => (1, false, ExprType::Logic),
        };
        let node = NetExprKind::UserCall { function, args };
        Some(NetExpr::new(node, w, signed, ty, loc))
    }

    fn ident(&self, ident: &IdentExpr) -> Option<NetExpr> {
        let loc = ident.loc;
        match symbol_search(self.ctx, self.scope, &ident.path) {
            Symbol::Genvar(v) => {
                if ident.is_indexed() {
                    self.emit(errors::error_bad_select(
                        &format!("Genvar {} cannot be indexed.", self.path_name(&ident.path)),
                        loc,
                    ));
                    return None;
                }
                Some(NetExpr::constant(
                    Number::from_i64_width(v, INTEGER_WIDTH, true),
                    loc,
                ))
            }
            Symbol::Param { scope, name } => self.param_ref(ident, scope, name),
            Symbol::Signal(sig) => {
                if self.param_mode {
                    self.emit(errors::error_not_a_param(&self.path_name(&ident.path), loc));
                    return None;
                }
                self.signal_ref(ident, sig)
            }
            Symbol::Event(_) => {
                self.emit(errors::error_event_expr(loc));
                None
            }
            Symbol::NotFound => {
                if self.sys_task_arg && !ident.is_indexed() {
                    if let Some(s) = find_scope_from(&self.ctx.design, self.scope, &ident.path) {
                        let node = NetExprKind::ScopeRef(s);
                        return Some(NetExpr::new(node, 0, false, ExprType::Logic, loc));
                    }
                }
                self.emit(errors::error_unbound(
                    &self.path_name(&ident.path),
                    &self.ctx.scope_name(self.scope),
                    loc,
                ));
                None
            }
        }
    }

    fn param_ref(&self, ident: &IdentExpr, scope: ScopeId, name: Ident) -> Option<NetExpr> {
        let loc = ident.loc;
        let display = self.path_name(&ident.path);
        let slot = self.ctx.design.scope(scope).params.get(&name)?;

        // A ranged parameter's shape comes from its range alone.
        let declared = if slot.is_ranged() {
            match self.ctx.design.param_range(scope, name) {
                Some((msb, lsb)) if range_width(msb, lsb).is_some() => Some(Bounds { msb, lsb }),
                Some(_) => {
                    self.emit(errors::error_too_wide(&format!("range of parameter {display}"), loc));
                    return None;
                }
                None => None,
            }
        } else {
            None
        };
        let (width, signed, ty) = match declared {
            Some(bounds) => (bounds.width(), slot.signed, ExprType::Logic),
            None if slot.is_ranged() => (0, slot.signed, ExprType::Logic),
            None => match self.ctx.design.param_value(scope, name) {
                Some(ConstValue::Logic(n)) => (n.width(), n.is_signed(), ExprType::Logic),
                Some(ConstValue::Real(_)) => (1, true, ExprType::Real),
                None => (0, slot.signed, ExprType::Logic),
            },
        };
        let base = NetExpr::new(NetExprKind::Param { scope, name }, width, signed, ty, loc);

        if ident.word.is_some() {
            self.emit(errors::error_bad_select(
                &format!("Parameter {display} is not a memory."),
                loc,
            ));
            return None;
        }
        if matches!(ident.select, Select::None) {
            return Some(base);
        }
        if ty == ExprType::Real {
            self.emit(errors::error_bad_select(
                &format!("Cannot select bits of real parameter {display}."),
                loc,
            ));
            return None;
        }

        // Unranged parameters are indexed [width-1:0].
        let bounds = match declared {
            Some(bounds) => bounds,
            None if slot.is_ranged() => {
                self.emit(errors::error_not_constant(&format!("range of parameter {display}"), loc));
                return None;
            }
            None => Bounds {
                msb: i64::from(width.max(1)) - 1,
                lsb: 0,
            },
        };
        let (offset, w) = self.select_parts(&ident.select, bounds, width > 0, &display, loc)?;
        Some(select_node(base, offset, w, loc))
    }

    fn signal_ref(&self, ident: &IdentExpr, id: SignalId) -> Option<NetExpr> {
        let loc = ident.loc;
        let display = self.path_name(&ident.path);
        let sig = &self.ctx.design.signals[id];
        let (word, select) = self.split_word(ident, sig.array, &display)?;

        if sig.kind == NetKind::Real {
            if !matches!(select, Select::None) {
                self.emit(errors::error_bad_select(
                    &format!("Cannot select bits of real variable {display}."),
                    loc,
                ));
                return None;
            }
            let node = NetExprKind::Signal {
                signal: id,
                word: word.map(Box::new),
            };
            return Some(NetExpr::new(node, 1, true, ExprType::Real, loc));
        }

        let base = NetExpr::new(
            NetExprKind::Signal {
                signal: id,
                word: word.map(Box::new),
            },
            sig.width(),
            sig.signed,
            ExprType::Logic,
            loc,
        );
        let bounds = Bounds {
            msb: sig.msb,
            lsb: sig.lsb,
        };
        let (offset, w) = self.select_parts(select, bounds, true, &display, loc)?;
        Some(select_node(base, offset, w, loc))
    }

    /// Separates the memory word index from the bit select.
    ///
    /// The parser cannot tell `mem[i]` from `vec[i]`; for memories a lone bit
    /// select is the word index.
    pub fn split_word<'i>(
        &self,
        ident: &'i IdentExpr,
        array: Option<(i64, i64)>,
        display: &str,
    ) -> Option<(Option<NetExpr>, &'i Select)> {
        let loc = ident.loc;
        match (&ident.word, array) {
            (Some(w), Some((first, last))) => {
                let word = self.word_address(w, first, last, display)?;
                Some((Some(word), &ident.select))
            }
            (None, Some((first, last))) => match &ident.select {
                Select::Bit(w) => {
                    let word = self.word_address(w, first, last, display)?;
                    Some((Some(word), &NO_SELECT))
                }
                _ if self.sys_task_arg => Some((None, &ident.select)),
                _ => {
                    self.emit(errors::error_bad_select(
                        &format!("Memory {display} requires a word index."),
                        loc,
                    ));
                    None
                }
            },
            (Some(_), None) => {
                self.emit(errors::error_bad_select(
                    &format!("{display} is not a memory."),
                    loc,
                ));
                None
            }
            (None, None) => Some((None, &ident.select)),
        }
    }

    fn word_address(&self, index: &Expr, first: i64, last: i64, display: &str) -> Option<NetExpr> {
        let bounds = Bounds {
            msb: last,
            lsb: first,
        };
        self.index_offset(index, bounds, 0, true, display)
    }

    /// Computes the normalized offset and width of a select.
    ///
    /// The offset is `None` when there is no select.
    pub fn select_parts(
        &self,
        select: &Select,
        bounds: Bounds,
        width_known: bool,
        display: &str,
        loc: Loc,
    ) -> Option<(Option<NetExpr>, u32)> {
        match select {
            Select::None => Some((None, bounds.width())),
            Select::Bit(index) => {
                let offset = self.index_offset(index, bounds, 0, width_known, display)?;
                Some((Some(offset), 1))
            }
            Select::Part { msb, lsb } => {
                let m = self.const_index(msb, "part select bound");
                let l = self.const_index(lsb, "part select bound");
                let (m, l) = (m?, l?);
                let (nm, nl) = (bounds.normalize(m), bounds.normalize(l));
                if nm < nl {
                    self.emit(errors::error_bad_select(
                        &format!("Part select {display}[{m}:{l}] is reversed."),
                        loc,
                    ));
                    return None;
                }
                let limit = i64::from(bounds.width());
                if width_known && (nl < 0 || nm >= limit) {
                    let bad = if nl < 0 { l } else { m };
                    self.emit(errors::warning_select_range(display, bad, loc));
                }
                let Some(w) = range_width(nm, nl) else {
                    self.emit(errors::error_too_wide(&format!("part select of {display}"), loc));
                    return None;
                };
                Some((Some(offset_const(nl, loc)), w))
            }
            Select::IndexedUp { base, width } | Select::IndexedDown { base, width } => {
                let w = self.const_index(width, "indexed part select width")?;
                if w <= 0 {
                    self.emit(errors::error_bad_select(
                        &format!("Indexed part select width of {display} must be positive."),
                        loc,
                    ));
                    return None;
                }
                let Ok(bits) = u32::try_from(w) else {
                    self.emit(errors::error_too_wide(&format!("part select of {display}"), loc));
                    return None;
                };
                // Offset of the lowest selected bit relative to `base`.
                let up = matches!(select, Select::IndexedUp { .. });
                let adjust = match (up, bounds.descending()) {
                    (true, true) | (false, false) => 0,
                    (true, false) => w - 1,
                    (false, true) => -(w - 1),
                };
                let offset = self.index_offset(base, bounds, adjust, width_known, display)?;
                Some((Some(offset), bits))
            }
        }
    }

    /// Normalizes `index + adjust` against `bounds`.
    fn index_offset(
        &self,
        index: &Expr,
        bounds: Bounds,
        adjust: i64,
        width_known: bool,
        display: &str,
    ) -> Option<NetExpr> {
        let loc = index.loc();
        let idx = self.expr(index, -1)?;
        let idx = fold(self.ctx, idx);

        if let Some(n) = idx.as_const() {
            let Some(v) = n.as_i64() else {
                return Some(NetExpr::constant(Number::all_x(INTEGER_WIDTH), loc));
            };
            let off = bounds.normalize(v.saturating_add(adjust));
            if width_known && (off < 0 || off >= i64::from(bounds.width())) {
                self.emit(errors::warning_select_range(display, v, loc));
            }
            return Some(offset_const(off, loc));
        }

        let w = idx.width.max(INTEGER_WIDTH);
        let signed = idx.signed;
        let idx = idx.resized(w);
        let node = if bounds.descending() {
            let k = adjust.saturating_sub(bounds.lsb);
            if k == 0 {
                return Some(idx);
            }
            NetExprKind::Binary {
                op: BinaryOp::Add,
                lhs: Box::new(idx),
                rhs: Box::new(NetExpr::constant(Number::from_i64_width(k, w, signed), loc)),
            }
        } else {
            let k = bounds.lsb.saturating_sub(adjust);
            NetExprKind::Binary {
                op: BinaryOp::Sub,
                lhs: Box::new(NetExpr::constant(Number::from_i64_width(k, w, signed), loc)),
                rhs: Box::new(idx),
            }
        };
        Some(NetExpr::new(node, w, signed, ExprType::Logic, loc))
    }

    fn const_index(&self, expr: &Expr, what: &str) -> Option<i64> {
        let value = eval_const(self.ctx, expr, self.scope).and_then(|n| n.as_i64());
        if value.is_none() {
            self.emit(errors::error_not_constant(what, expr.loc()));
        }
        value
    }
}

static NO_SELECT: Select = Select::None;

fn offset_const(offset: i64, loc: Loc) -> NetExpr {
    NetExpr::constant(Number::from_i64(offset), loc)
}

fn select_node(base: NetExpr, offset: Option<NetExpr>, width: u32, loc: Loc) -> NetExpr {
    match offset {
        None => base,
        Some(offset) => {
            let node = NetExprKind::Select {
                base: Box::new(base),
                offset: Box::new(offset),
            };
            NetExpr::new(node, width, false, ExprType::Logic, loc)
        }
    }
}

/// Brings two operands to `width`, treating both as unsigned unless both are signed.
fn balance(l: NetExpr, r: NetExpr, width: u32) -> (NetExpr, NetExpr) {
    let (l, r) = if l.signed && r.signed {
        (l, r)
    } else {
        (as_unsigned(l), as_unsigned(r))
    };
    if width == 0 {
        (l, r)
    } else {
        (l.resized(width), r.resized(width))
    }
}

fn as_unsigned(mut e: NetExpr) -> NetExpr {
    if e.ty == ExprType::Real || !e.signed {
        return e;
    }
    e.signed = false;
    if let NetExprKind::Const(n) = &mut e.kind {
        *n = n.clone().with_signed(false);
    }
    e
}
