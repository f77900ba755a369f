//! The parameter passes that run once the scope tree is complete.
//!
//! [`run_defparams`] applies every collected `defparam` to its target slot,
//! then [`evaluate_parameters`] folds every slot to its final value. A slot
//! referencing another parameter evaluates that one on demand, so traversal
//! order only matters for diagnostics.

use aion_common::{AionResult, Ident, InternalError, Number};
use aion_netlist::{
    coerce_to_range, ConstValue, Design, NetExpr, ParamResolver, ParamSlot, ParamState,
    PendingDefparam, ScopeId,
};

use crate::context::ElaborationContext;
use crate::errors;
use crate::lookup::find_scope_from;

/// Applies all pending defparams, in scope creation order.
///
/// A defparam replaces the target's expression, including one set by an
/// instance override, so it takes precedence over both the declaration and
/// the `#(...)` list.
pub fn run_defparams(ctx: &mut ElaborationContext<'_>) {
    for scope in ctx.design.scopes.ids() {
        let pending = std::mem::take(&mut ctx.design.scope_mut(scope).defparams);
        for defparam in pending {
            apply_defparam(ctx, scope, defparam);
        }
    }
}

fn apply_defparam(ctx: &mut ElaborationContext<'_>, scope: ScopeId, defparam: PendingDefparam) {
    let Some((&name, prefix)) = defparam.path.split_last() else {
        return;
    };
    let Some(target) = find_scope_from(&ctx.design, scope, prefix) else {
        let path = ctx.interner.join_path(&defparam.path);
        ctx.sink.emit(errors::warning_defparam_scope(&path, defparam.loc));
        return;
    };
    let target_name = ctx.scope_name(target);
    match ctx.design.scope_mut(target).params.get_mut(&name) {
        None => {
            ctx.sink.emit(errors::warning_param_not_found(
                ctx.interner.resolve(name),
                &target_name,
                defparam.loc,
            ));
        }
        Some(slot) if slot.local => {
            ctx.sink.emit(errors::warning_defparam_local(
                ctx.interner.resolve(name),
                defparam.loc,
            ));
        }
        Some(slot) => {
            if ctx.config.elaborate.debug_scopes {
                log::debug!(
                    "defparam {}.{} replaced",
                    target_name,
                    ctx.interner.resolve(name)
                );
            }
            slot.state = ParamState::Expression(defparam.expr);
        }
    }
}

/// Evaluates every parameter slot to its final constant.
///
/// Scopes are visited children first from each root. Slots still holding a
/// stub had their elaboration fail, which was already reported; they are
/// skipped, and so is every parameter that depends on one.
pub fn evaluate_parameters(ctx: &mut ElaborationContext<'_>) -> AionResult<()> {
    let mut order = Vec::new();
    for &root in &ctx.design.roots {
        children_first(&ctx.design, root, &mut order);
    }

    let mut evaluator = Evaluator {
        ctx,
        stack: Vec::new(),
        poisoned: false,
        failure: None,
    };
    for scope in order {
        let names: Vec<Ident> = evaluator.ctx.design.scope(scope).params.keys().copied().collect();
        for name in names {
            evaluator.poisoned = false;
            evaluator.evaluate(scope, name)?;
        }
    }
    Ok(())
}

fn children_first(design: &Design, scope: ScopeId, out: &mut Vec<ScopeId>) {
    for &child in &design.scope(scope).children {
        children_first(design, child, out);
    }
    out.push(scope);
}

struct Evaluator<'c, 'a> {
    ctx: &'c mut ElaborationContext<'a>,
    /// Slots being evaluated, innermost last.
    stack: Vec<(ScopeId, Ident)>,
    /// Set when a dependency of the current slot has no value.
    poisoned: bool,
    failure: Option<InternalError>,
}

impl Evaluator<'_, '_> {
    /// Evaluates one slot, storing and returning its value.
    ///
    /// `Ok(None)` means the slot (or something it depends on) had already
    /// failed with a diagnostic; it is left as a stub.
    fn evaluate(&mut self, scope: ScopeId, name: Ident) -> AionResult<Option<ConstValue>> {
        let Some(slot) = self.ctx.design.scope(scope).params.get(&name).cloned() else {
            return Ok(None);
        };
        let expr = match slot.state {
            ParamState::Value(ref v) => return Ok(Some(v.clone())),
            ParamState::Stub => return Ok(None),
            ParamState::Expression(ref e) => e.clone(),
        };

        self.stack.push((scope, name));
        let outer = std::mem::replace(&mut self.poisoned, false);
        let result = self.evaluate_slot(scope, name, &slot, &expr);
        self.poisoned = outer;
        self.stack.pop();
        result
    }

    fn evaluate_slot(
        &mut self,
        scope: ScopeId,
        name: Ident,
        slot: &ParamSlot,
        expr: &NetExpr,
    ) -> AionResult<Option<ConstValue>> {
        let range = match (&slot.msb, &slot.lsb) {
            (Some(msb), Some(lsb)) => {
                let msb = self.reduce_bound(msb)?;
                let lsb = self.reduce_bound(lsb)?;
                match (msb, lsb) {
                    (Some(m), Some(l)) => Some((m, l)),
                    _ if self.poisoned => return Ok(self.fail(scope, name)),
                    _ => return Err(self.internal(slot, name, "range did not fold")),
                }
            }
            _ => None,
        };

        let value = expr.reduce(self);
        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        let value = match value {
            Some(v) => v,
            None if self.poisoned => return Ok(self.fail(scope, name)),
            None => return Err(self.internal(slot, name, "value did not fold to a constant")),
        };

        let Some(value) = coerce_to_range(value, range, slot.signed) else {
            let what = format!("range of parameter {}", self.ctx.name(name));
            self.ctx.sink.emit(errors::error_too_wide(&what, slot.loc));
            return Ok(self.fail(scope, name));
        };
        if self.ctx.config.elaborate.debug_scopes {
            log::debug!(
                "parameter {}.{} = {}",
                self.ctx.scope_name(scope),
                self.ctx.name(name),
                value
            );
        }
        if let Some(slot) = self.ctx.design.scope_mut(scope).params.get_mut(&name) {
            slot.state = ParamState::Value(value.clone());
            if let Some((m, l)) = range {
                slot.msb = Some(NetExpr::constant(Number::from_i64(m), slot.loc));
                slot.lsb = Some(NetExpr::constant(Number::from_i64(l), slot.loc));
            }
        }
        Ok(Some(value))
    }

    fn reduce_bound(&mut self, bound: &NetExpr) -> AionResult<Option<i64>> {
        let value = bound.reduce(self);
        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        Ok(value.and_then(|v| v.to_number().as_i64()))
    }

    fn fail(&mut self, scope: ScopeId, name: Ident) -> Option<ConstValue> {
        if let Some(slot) = self.ctx.design.scope_mut(scope).params.get_mut(&name) {
            slot.state = ParamState::Stub;
        }
        None
    }

    fn internal(&self, slot: &ParamSlot, name: Ident, what: &str) -> InternalError {
        InternalError::at(
            slot.loc,
            self.ctx.interner,
            format!("parameter {}: {what}", self.ctx.name(name)),
        )
    }
}

impl ParamResolver for Evaluator<'_, '_> {
    fn resolve_param(&mut self, scope: ScopeId, name: Ident) -> Option<ConstValue> {
        if self.failure.is_some() {
            return None;
        }
        let loc = match &self.ctx.design.scope(scope).params.get(&name)?.state {
            ParamState::Value(v) => return Some(v.clone()),
            ParamState::Stub => {
                self.poisoned = true;
                return None;
            }
            ParamState::Expression(e) => e.loc,
        };
        if self.stack.contains(&(scope, name)) {
            self.ctx
                .sink
                .emit(errors::error_circular_param(self.ctx.name(name), loc));
            self.poisoned = true;
            return None;
        }
        match self.evaluate(scope, name) {
            Ok(Some(v)) => Some(v),
            Ok(None) => {
                self.poisoned = true;
                None
            }
            Err(err) => {
                self.failure = Some(err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Fixture;
    use aion_common::Loc;
    use aion_netlist::{ExprType, NetExprKind, ScopeKind};
    use aion_pform::BinaryOp;

    fn param_ref(scope: ScopeId, name: Ident) -> NetExpr {
        NetExpr::new(NetExprKind::Param { scope, name }, 32, true, ExprType::Logic, Loc::DUMMY)
    }

    fn plus(lhs: NetExpr, rhs: NetExpr) -> NetExpr {
        NetExpr::new(
            NetExprKind::Binary {
                op: BinaryOp::Add,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            32,
            true,
            ExprType::Logic,
            Loc::DUMMY,
        )
    }

    fn int(v: i64) -> NetExpr {
        NetExpr::constant(Number::from_i64(v), Loc::DUMMY)
    }

    fn slot(expr: NetExpr) -> ParamSlot {
        ParamSlot {
            state: ParamState::Expression(expr),
            ..ParamSlot::stub(false, false, Loc::DUMMY)
        }
    }

    fn value_of(ctx: &ElaborationContext<'_>, scope: ScopeId, name: Ident) -> Option<ConstValue> {
        match &ctx.design.scope(scope).params[&name].state {
            ParamState::Value(v) => Some(v.clone()),
            _ => None,
        }
    }

    #[test]
    fn dependencies_evaluate_on_demand_across_scopes() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let top = ctx.design.make_root_scope(fx.id("top"));
            let u0 = ctx.design.new_scope(top, fx.id("u0"), ScopeKind::Module);
            let (a, b) = (fx.id("A"), fx.id("B"));
            // top.A = u0.B + 1, evaluated before u0.B is visited.
            ctx.design.scope_mut(top).params.insert(a, slot(plus(param_ref(u0, b), int(1))));
            ctx.design.scope_mut(u0).params.insert(b, slot(plus(int(4), int(3))));
            evaluate_parameters(ctx).unwrap();
            assert_eq!(value_of(ctx, top, a).unwrap().to_number().as_i64(), Some(8));
            assert_eq!(value_of(ctx, u0, b).unwrap().to_number().as_i64(), Some(7));
            assert_eq!(fx.sink.error_count(), 0);
        });
    }

    #[test]
    fn ranged_parameters_take_declared_shape() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let top = ctx.design.make_root_scope(fx.id("top"));
            let p = fx.id("P");
            let mut s = slot(int(300));
            s.msb = Some(int(3));
            s.lsb = Some(int(0));
            s.signed = true;
            ctx.design.scope_mut(top).params.insert(p, s);
            evaluate_parameters(ctx).unwrap();
            let v = value_of(ctx, top, p).unwrap().to_number();
            assert_eq!(v.width(), 4);
            assert!(v.is_signed());
            assert_eq!(v.bits().to_string(), "1100");
        });
    }

    #[test]
    fn circular_parameters_are_reported_once() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let top = ctx.design.make_root_scope(fx.id("top"));
            let (a, b, c) = (fx.id("A"), fx.id("B"), fx.id("C"));
            ctx.design.scope_mut(top).params.insert(a, slot(param_ref(top, b)));
            ctx.design.scope_mut(top).params.insert(b, slot(plus(param_ref(top, a), int(1))));
            ctx.design.scope_mut(top).params.insert(c, slot(int(2)));
            evaluate_parameters(ctx).unwrap();
            assert_eq!(fx.sink.error_count(), 1);
            assert_eq!(fx.sink.diagnostics()[0].code, errors::E308);
            assert!(value_of(ctx, top, a).is_none());
            assert!(value_of(ctx, top, b).is_none());
            assert!(value_of(ctx, top, c).is_some());
        });
    }

    #[test]
    fn stub_dependencies_poison_without_internal_error() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let top = ctx.design.make_root_scope(fx.id("top"));
            let (a, b) = (fx.id("A"), fx.id("B"));
            ctx.design
                .scope_mut(top)
                .params
                .insert(a, ParamSlot::stub(false, false, Loc::DUMMY));
            ctx.design.scope_mut(top).params.insert(b, slot(plus(param_ref(top, a), int(1))));
            evaluate_parameters(ctx).unwrap();
            assert!(matches!(ctx.design.scope(top).params[&b].state, ParamState::Stub));
            assert_eq!(fx.sink.error_count(), 0);
        });
    }

    #[test]
    fn unfoldable_value_is_an_internal_error() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let top = ctx.design.make_root_scope(fx.id("top"));
            let p = fx.id("P");
            let call = NetExpr::new(
                NetExprKind::SysCall {
                    name: fx.id("$random"),
                    args: Vec::new(),
                },
                32,
                true,
                ExprType::Logic,
                Loc::DUMMY,
            );
            ctx.design.scope_mut(top).params.insert(p, slot(call));
            let err = evaluate_parameters(ctx).unwrap_err();
            assert!(err.message.contains("parameter P"));
        });
    }

    #[test]
    fn defparams_replace_and_warn() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let top = ctx.design.make_root_scope(fx.id("top"));
            let u0 = ctx.design.new_scope(top, fx.id("u0"), ScopeKind::Module);
            let (w, l) = (fx.id("W"), fx.id("L"));
            ctx.design.scope_mut(u0).params.insert(w, slot(int(1)));
            ctx.design.scope_mut(u0).params.insert(
                l,
                ParamSlot {
                    local: true,
                    ..slot(int(1))
                },
            );
            let pending = |path: &[&str]| PendingDefparam {
                path: path.iter().map(|p| fx.id(p)).collect(),
                expr: int(9),
                loc: Loc::DUMMY,
            };
            ctx.design.scope_mut(top).defparams = vec![
                pending(&["u0", "W"]),
                pending(&["u0", "L"]),
                pending(&["u0", "X"]),
                pending(&["u9", "W"]),
            ];
            run_defparams(ctx);
            evaluate_parameters(ctx).unwrap();

            assert_eq!(value_of(ctx, u0, w).unwrap().to_number().as_i64(), Some(9));
            assert_eq!(value_of(ctx, u0, l).unwrap().to_number().as_i64(), Some(1));
            let codes: Vec<_> = fx.sink.diagnostics().iter().map(|d| d.code).collect();
            assert_eq!(codes, vec![errors::W302, errors::W300, errors::W301]);
            assert!(ctx.design.scope(top).defparams.is_empty());
        });
    }
}
