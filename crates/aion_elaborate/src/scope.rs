//! Scope tree construction.
//!
//! Starting from a root module, every module instance, generate loop
//! iteration, task, function and named block gets a [`Scope`] in the design.
//! Parameter slots are installed and their value expressions elaborated as
//! each scope is built; defparams are only collected here and applied once
//! the whole tree exists.
//!
//! [`Scope`]: aion_netlist::Scope

use aion_common::{AionResult, Ident, InternalError, Loc, Number, INTEGER_WIDTH};
use aion_netlist::{
    coerce_to_range, ConstValue, NetExpr, NetExprKind, ParamSlot, ParamState, PendingDefparam,
    ScopeId, ScopeKind,
};
use aion_pform::{
    BlockKind, Expr, Generate, GenerateScheme, Instantiation, Module, ParamDecl, ParamOverrides,
    Statement,
};

use crate::context::{ElaborationContext, GenvarBinding, ScopeSource};
use crate::errors;
use crate::eval::eval_const;
use crate::expr::{elab_and_eval, elaborate_pexpr};

/// Builds the contents of a module scope.
///
/// `replacements` are the instance's parameter overrides, already elaborated
/// in the instantiating scope. Returns `false` if something in this scope
/// could not be built; the problem has been reported and building went on
/// with the rest.
pub fn elaborate_module_scope<'a>(
    ctx: &mut ElaborationContext<'a>,
    module: &'a Module,
    scope: ScopeId,
    replacements: &[(Ident, NetExpr)],
) -> AionResult<bool> {
    let mut ok = true;

    // 1. Module defaults
    ctx.record_source(scope, ScopeSource::Module(module));
    let s = ctx.design.scope_mut(scope);
    s.default_nettype = module.default_nettype;
    s.time_unit = module.time_unit;
    s.time_precision = module.time_precision;
    ctx.design.set_precision(module.time_precision);

    // 2. Stub every parameter first so forward references find a slot
    let decls = module
        .params
        .iter()
        .map(|p| (p, false))
        .chain(module.localparams.iter().map(|p| (p, true)));
    let mut declared = Vec::new();
    for (decl, local) in decls {
        if ctx.design.scope(scope).declares(decl.name) {
            ctx.sink
                .emit(errors::error_duplicate_decl(ctx.name(decl.name), decl.loc));
            ok = false;
            continue;
        }
        ctx.design
            .scope_mut(scope)
            .params
            .insert(decl.name, ParamSlot::stub(decl.signed, local, decl.loc));
        declared.push(decl);
    }

    // 3. Value and range expressions
    for decl in declared {
        ok &= elaborate_param(ctx, decl, scope);
    }

    // 4. Instance overrides
    for (name, expr) in replacements {
        let scope_name = ctx.scope_name(scope);
        match ctx.design.scope_mut(scope).params.get_mut(name) {
            Some(slot) if !slot.local => {
                if ctx.config.elaborate.debug_scopes {
                    log::debug!("{scope_name}: override of {}", ctx.interner.resolve(*name));
                }
                slot.state = settle(slot, expr.clone());
            }
            _ => ctx.sink.emit(errors::warning_param_not_found(
                ctx.interner.resolve(*name),
                &scope_name,
                expr.loc,
            )),
        }
    }

    // 5. Defparams, applied once the tree is complete
    for defparam in &module.defparams {
        match elaborate_pexpr(ctx, &defparam.expr, scope) {
            Some(expr) => ctx.design.scope_mut(scope).defparams.push(PendingDefparam {
                path: defparam.path.clone(),
                expr,
                loc: defparam.loc,
            }),
            None => ok = false,
        }
    }

    // 6. Named events
    for event in &module.events {
        if ctx.design.scope(scope).declares(event.name) {
            ctx.sink
                .emit(errors::error_duplicate_decl(ctx.name(event.name), event.loc));
            ok = false;
            continue;
        }
        ctx.design.add_event(aion_netlist::Event {
            name: event.name,
            scope,
            loc: event.loc,
        });
    }

    // 7. Generate loops
    for generate in &module.generates {
        ok &= generate_scope(ctx, generate, scope)?;
    }

    // 8. Tasks and functions
    for task in &module.tasks {
        let Some(child) = new_child(ctx, scope, task.name, ScopeKind::Task, task.loc) else {
            ok = false;
            continue;
        };
        ctx.record_source(child, ScopeSource::Task(task));
        elaborate_statement_scope(ctx, &task.body, child)?;
    }
    for function in &module.functions {
        let Some(child) = new_child(ctx, scope, function.name, ScopeKind::Function, function.loc) else {
            ok = false;
            continue;
        };
        ctx.record_source(child, ScopeSource::Function(function));
        elaborate_statement_scope(ctx, &function.body, child)?;
    }

    // 9. Module instances
    for inst in &module.instances {
        elaborate_instance_scope(ctx, inst, scope)?;
    }

    // 10. Named blocks in initial and always bodies
    for behavior in &module.behaviors {
        elaborate_statement_scope(ctx, &behavior.body, scope)?;
    }

    Ok(ok)
}

/// Elaborates the range and value of one declared parameter into its stub.
fn elaborate_param(ctx: &mut ElaborationContext<'_>, decl: &ParamDecl, scope: ScopeId) -> bool {
    let range = match &decl.range {
        Some(r) => {
            let msb = elaborate_pexpr(ctx, &r.msb, scope);
            let lsb = elaborate_pexpr(ctx, &r.lsb, scope);
            match (msb, lsb) {
                (Some(m), Some(l)) => Some((m, l)),
                _ => return false,
            }
        }
        None => None,
    };
    let Some(value) = elaborate_pexpr(ctx, &decl.expr, scope) else {
        return false;
    };
    let Some(slot) = ctx.design.scope_mut(scope).params.get_mut(&decl.name) else {
        return false;
    };
    if let Some((msb, lsb)) = range {
        slot.msb = Some(msb);
        slot.lsb = Some(lsb);
    }
    slot.state = settle(slot, value);
    true
}

/// Stores a constant right away in its declared shape; anything else waits
/// for parameter evaluation.
fn settle(slot: &ParamSlot, expr: NetExpr) -> ParamState {
    let value = match &expr.kind {
        NetExprKind::Const(n) => ConstValue::Logic(n.clone()),
        NetExprKind::RealConst(v) => ConstValue::Real(*v),
        _ => return ParamState::Expression(expr),
    };
    let range = match (slot.is_ranged(), slot.const_range()) {
        (false, _) => None,
        (true, Some(range)) => Some(range),
        (true, None) => return ParamState::Expression(expr),
    };
    // A range too wide to apply is reported when the slot is evaluated.
    match coerce_to_range(value, range, slot.signed) {
        Some(value) => ParamState::Value(value),
        None => ParamState::Expression(expr),
    }
}

/// Creates a child scope, reporting a name that is already taken.
fn new_child(
    ctx: &mut ElaborationContext<'_>,
    parent: ScopeId,
    name: Ident,
    kind: ScopeKind,
    loc: Loc,
) -> Option<ScopeId> {
    if ctx.design.child(parent, name).is_some()
        || ctx.design.scope(parent).instance_arrays.contains_key(&name)
    {
        ctx.sink
            .emit(errors::error_duplicate_scope(ctx.interner.resolve(name), loc));
        return None;
    }
    let child = ctx.design.new_scope(parent, name, kind);
    if ctx.config.elaborate.debug_scopes {
        log::debug!("new {kind:?} scope {}", ctx.scope_name(child));
    }
    Some(child)
}

/// Unrolls a generate loop into one `name[value]` block per iteration.
///
/// Each block gets a localparam named after the genvar holding that
/// iteration's value. Only loop generates are supported.
pub fn generate_scope<'a>(
    ctx: &mut ElaborationContext<'a>,
    generate: &'a Generate,
    container: ScopeId,
) -> AionResult<bool> {
    let GenerateScheme::Loop {
        genvar,
        init,
        test,
        step,
    } = &generate.scheme
    else {
        ctx.sink.emit(errors::sorry_generate_scheme(generate.loc));
        return Ok(false);
    };

    let Some(first) = genvar_value(ctx, init, container) else {
        ctx.sink.emit(errors::error_not_constant(
            "generate loop initial value",
            init.loc(),
        ));
        return Ok(false);
    };

    let saved = ctx.genvar.take();
    let result = unroll(ctx, generate, container, *genvar, first, test, step);
    ctx.genvar = saved;
    result
}

fn unroll<'a>(
    ctx: &mut ElaborationContext<'a>,
    generate: &'a Generate,
    container: ScopeId,
    genvar: Ident,
    first: i64,
    test: &Expr,
    step: &Expr,
) -> AionResult<bool> {
    let limit = ctx.config.elaborate.max_generate_iterations;
    let block = ctx.name(generate.name);
    let mut value = first;
    let mut iterations = 0u32;

    loop {
        ctx.genvar = Some(GenvarBinding {
            scope: container,
            name: genvar,
            value,
        });

        let cond = elab_and_eval(ctx, test, container, -1).and_then(|e| e.as_const().cloned());
        let Some(cond) = cond else {
            if iterations == 0 {
                ctx.sink
                    .emit(errors::error_not_constant("generate loop condition", test.loc()));
                return Ok(false);
            }
            return Err(InternalError::at(
                generate.loc,
                ctx.interner,
                format!("condition of generate loop {block} stopped folding at {value}"),
            ));
        };
        if cond.is_true() != Some(true) {
            break;
        }
        if iterations == limit {
            ctx.sink
                .emit(errors::error_generate_limit(block, limit, generate.loc));
            return Ok(false);
        }
        iterations += 1;

        let name = ctx.interner.intern_indexed(generate.name, value);
        if ctx.config.elaborate.debug_elaborate {
            log::debug!("generate {block}: {} = {value}", ctx.name(genvar));
        }
        let Some(body) = new_child(ctx, container, name, ScopeKind::GenBlock, generate.loc) else {
            return Ok(false);
        };
        ctx.design.scope_mut(body).params.insert(
            genvar,
            ParamSlot::value(
                ConstValue::Logic(Number::from_i64_width(value, INTEGER_WIDTH, true)),
                true,
                generate.loc,
            ),
        );
        for inst in &generate.instances {
            elaborate_instance_scope(ctx, inst, body)?;
        }
        ctx.design
            .scope_mut(container)
            .generate_instances
            .entry(generate.name)
            .or_default()
            .push(body);

        // Nested loops restore our binding on the way out.
        let Some(next) = genvar_value(ctx, step, container) else {
            return Err(InternalError::at(
                generate.loc,
                ctx.interner,
                format!("step of generate loop {block} did not fold at {value}"),
            ));
        };
        value = next;
    }
    Ok(true)
}

fn genvar_value(ctx: &ElaborationContext<'_>, expr: &Expr, scope: ScopeId) -> Option<i64> {
    elab_and_eval(ctx, expr, scope, -1)?.as_const()?.as_i64()
}

/// Creates the scope (or scopes, for an instance array) of a module instance
/// and builds them.
pub fn elaborate_instance_scope<'a>(
    ctx: &mut ElaborationContext<'a>,
    inst: &'a Instantiation,
    scope: ScopeId,
) -> AionResult<()> {
    let module_name = ctx.name(inst.module);
    let Some(module) = ctx.library.lookup(inst.module) else {
        ctx.sink
            .emit(errors::error_unknown_module(module_name, inst.loc));
        return Ok(());
    };
    let Some(name) = inst.name else {
        ctx.sink
            .emit(errors::error_missing_instance_name(module_name, inst.loc));
        return Ok(());
    };
    if ctx.design.child(scope, name).is_some()
        || ctx.design.scope(scope).instance_arrays.contains_key(&name)
    {
        ctx.sink
            .emit(errors::error_duplicate_scope(ctx.name(name), inst.loc));
        return Ok(());
    }

    // A module may not appear among the module scopes above its own instance.
    let mut cur = Some(scope);
    while let Some(c) = cur {
        let s = ctx.design.scope(c);
        if s.kind == ScopeKind::Module && s.module_name == Some(inst.module) {
            let instance = format!("{}.{}", ctx.scope_name(scope), ctx.name(name));
            ctx.sink.emit(errors::error_recursive_instance(
                module_name,
                &instance,
                &ctx.scope_name(c),
                inst.loc,
            ));
            return Ok(());
        }
        cur = s.parent;
    }

    let mut replacements = Vec::new();
    for (param, expr) in merge_overrides(module, &inst.overrides)? {
        if let Some(e) = elaborate_pexpr(ctx, expr, scope) {
            replacements.push((param, e));
        }
    }

    let indices: Vec<Option<i64>> = match &inst.range {
        None => vec![None],
        Some(range) => {
            let msb = eval_const(ctx, &range.msb, scope).and_then(|n| n.as_i64());
            let lsb = eval_const(ctx, &range.lsb, scope).and_then(|n| n.as_i64());
            let (Some(msb), Some(lsb)) = (msb, lsb) else {
                ctx.sink.emit(errors::error_not_constant(
                    &format!("instance array range of {}", ctx.name(name)),
                    inst.loc,
                ));
                return Ok(());
            };
            // msb first, whichever way the range runs
            if msb >= lsb {
                (lsb..=msb).rev().map(Some).collect()
            } else {
                (msb..=lsb).map(Some).collect()
            }
        }
    };

    let count = indices.len();
    let mut elements = Vec::with_capacity(count);
    for index in indices {
        let child_name = match index {
            Some(i) if count > 1 => ctx.interner.intern_indexed(name, i),
            _ => name,
        };
        let child = ctx.design.new_scope(scope, child_name, ScopeKind::Module);
        ctx.design.scope_mut(child).module_name = Some(inst.module);
        if ctx.config.elaborate.debug_scopes {
            log::debug!("instance {} of {module_name}", ctx.scope_name(child));
        }
        elaborate_module_scope(ctx, module, child, &replacements)?;
        elements.push(child);
    }
    if inst.range.is_some() {
        ctx.design
            .scope_mut(scope)
            .instance_arrays
            .insert(name, elements);
    }
    Ok(())
}

/// Pairs an instance's `#(...)` overrides with the module's parameter names.
///
/// Positional overrides follow the declaration order of the overridable
/// parameters; extra values are ignored.
pub fn merge_overrides<'e>(
    module: &Module,
    overrides: &'e ParamOverrides,
) -> AionResult<Vec<(Ident, &'e Expr)>> {
    match overrides {
        ParamOverrides::None => Ok(Vec::new()),
        ParamOverrides::Positional(values) => Ok(module
            .param_names()
            .into_iter()
            .zip(values.iter())
            .collect()),
        ParamOverrides::Named(values) => Ok(values.iter().map(|(name, e)| (*name, e)).collect()),
        ParamOverrides::Both { .. } => Err(InternalError::new(
            "an instance has both positional and named parameter overrides",
        )),
    }
}

/// Finds named blocks in a statement and opens a scope for each.
///
/// Unnamed blocks belong to the enclosing scope.
pub fn elaborate_statement_scope<'a>(
    ctx: &mut ElaborationContext<'a>,
    stmt: &'a Statement,
    scope: ScopeId,
) -> AionResult<()> {
    match stmt {
        Statement::Block {
            kind,
            name,
            decls,
            stmts,
            loc,
        } => {
            let inner = match name {
                Some(name) => {
                    let kind = match kind {
                        BlockKind::Seq => ScopeKind::BeginEnd,
                        BlockKind::Par => ScopeKind::ForkJoin,
                    };
                    let Some(child) = new_child(ctx, scope, *name, kind, *loc) else {
                        return Ok(());
                    };
                    ctx.record_source(child, ScopeSource::Block(decls));
                    child
                }
                None => scope,
            };
            for s in stmts {
                elaborate_statement_scope(ctx, s, inner)?;
            }
        }
        Statement::If {
            then_stmt,
            else_stmt,
            ..
        } => {
            for s in [then_stmt, else_stmt].into_iter().flatten() {
                elaborate_statement_scope(ctx, s, scope)?;
            }
        }
        Statement::Case { arms, .. } => {
            for body in arms.iter().filter_map(|arm| arm.body.as_ref()) {
                elaborate_statement_scope(ctx, body, scope)?;
            }
        }
        Statement::Delay { body, .. } | Statement::EventWait { body, .. } => {
            if let Some(body) = body {
                elaborate_statement_scope(ctx, body, scope)?;
            }
        }
        Statement::Forever { body, .. }
        | Statement::For { body, .. }
        | Statement::Repeat { body, .. }
        | Statement::While { body, .. } => elaborate_statement_scope(ctx, body, scope)?,
        Statement::Assign { .. } | Statement::Other { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{num, range, Fixture};
    use aion_pform::{Behavior, BehaviorKind, EventDecl, Task};

    fn value(ctx: &ElaborationContext<'_>, scope: ScopeId, name: Ident) -> Option<i64> {
        ctx.design.param_value(scope, name)?.to_number().as_i64()
    }

    fn build(ctx: &mut ElaborationContext<'_>, name: Ident) -> (ScopeId, bool) {
        let module = ctx.library.lookup(name).unwrap();
        let root = ctx.design.make_root_scope(name);
        let ok = elaborate_module_scope(ctx, module, root, &[]).unwrap();
        (root, ok)
    }

    fn block(fx: &Fixture, name: Option<&str>, kind: BlockKind, stmts: Vec<Statement>) -> Statement {
        Statement::Block {
            kind,
            name: name.map(|n| fx.id(n)),
            decls: Vec::new(),
            stmts,
            loc: Loc::DUMMY,
        }
    }

    #[test]
    fn generate_loop_creates_indexed_blocks() {
        let fx = Fixture::new();
        let mut top = fx.module("top");
        top.generates
            .push(fx.counting_loop("g", "i", 0, num(3), vec![fx.instance("leaf", "u")]));
        let leaf = fx.module("leaf");
        fx.with_ctx(vec![top, leaf], |ctx| {
            let (root, ok) = build(ctx, fx.id("top"));
            assert!(ok);
            let blocks = &ctx.design.scope(root).generate_instances[&fx.id("g")];
            assert_eq!(blocks.len(), 3);
            for (i, &b) in blocks.iter().enumerate() {
                let s = ctx.design.scope(b);
                assert_eq!(fx.name(s.name), format!("g[{i}]"));
                assert_eq!(s.kind, ScopeKind::GenBlock);
                assert!(s.params[&fx.id("i")].local);
                assert_eq!(value(ctx, b, fx.id("i")), Some(i as i64));
                assert!(ctx.design.child(b, fx.id("u")).is_some());
            }
            assert!(ctx.genvar.is_none());
            assert_eq!(fx.sink.error_count(), 0);
        });
    }

    #[test]
    fn generate_loop_bound_from_parameter() {
        let fx = Fixture::new();
        let mut top = fx.module("top");
        top.params.push(fx.param("N", num(2)));
        top.localparams.push(fx.param(
            "M",
            crate::testutil::bin(aion_pform::BinaryOp::Add, fx.ident("N"), num(1)),
        ));
        top.generates.push(fx.counting_loop("g", "k", 1, fx.ident("M"), vec![]));
        fx.with_ctx(vec![top], |ctx| {
            let (root, _) = build(ctx, fx.id("top"));
            let names: Vec<&str> = ctx.design.scope(root).generate_instances[&fx.id("g")]
                .iter()
                .map(|&b| fx.name(ctx.design.scope(b).name))
                .collect();
            assert_eq!(names, vec!["g[1]", "g[2]"]);
        });
    }

    #[test]
    fn generate_loop_limit_and_non_constant_bounds() {
        let mut fx = Fixture::new();
        fx.config.elaborate.max_generate_iterations = 4;
        let mut top = fx.module("top");
        top.generates.push(fx.counting_loop("g", "i", 0, num(10), vec![]));
        top.generates.push(fx.counting_loop("h", "j", 0, fx.ident("w"), vec![]));
        top.generates.push(Generate {
            scheme: GenerateScheme::Cond { cond: num(1) },
            name: fx.id("c"),
            instances: Vec::new(),
            loc: Loc::DUMMY,
        });
        fx.with_ctx(vec![top], |ctx| {
            let (root, ok) = build(ctx, fx.id("top"));
            assert!(!ok);
            assert_eq!(ctx.design.scope(root).generate_instances[&fx.id("g")].len(), 4);
            let codes: Vec<_> = fx.sink.diagnostics().iter().map(|d| d.code).collect();
            assert_eq!(codes.first(), Some(&errors::E309));
            assert!(codes.contains(&errors::E307));
            assert_eq!(codes.last(), Some(&errors::S300));
            assert!(!ctx.design.scope(root).generate_instances.contains_key(&fx.id("h")));
        });
    }

    #[test]
    fn generate_step_must_fold() {
        let fx = Fixture::new();
        let mut top = fx.module("top");
        let mut g = fx.counting_loop("g", "i", 0, num(3), vec![]);
        if let GenerateScheme::Loop { step, .. } = &mut g.scheme {
            let random = Expr::Call {
                name: vec![fx.id("$random")],
                args: Vec::new(),
                system: true,
                loc: Loc::DUMMY,
            };
            *step = crate::testutil::bin(aion_pform::BinaryOp::Add, fx.ident("i"), random);
        }
        top.generates.push(g);
        fx.with_ctx(vec![top], |ctx| {
            let module = ctx.library.lookup(fx.id("top")).unwrap();
            let root = ctx.design.make_root_scope(fx.id("top"));
            let err = elaborate_module_scope(ctx, module, root, &[]).unwrap_err();
            assert!(err.to_string().contains("step of generate loop g"));
            assert_eq!(ctx.design.scope(root).generate_instances[&fx.id("g")].len(), 1);
            assert_eq!(fx.sink.error_count(), 0);
        });
    }

    #[test]
    fn self_instantiation_is_rejected() {
        let fx = Fixture::new();
        let mut a = fx.module("a");
        a.instances.push(fx.instance("b", "ub"));
        let mut b = fx.module("b");
        b.instances.push(fx.instance("a", "ua"));
        fx.with_ctx(vec![a, b], |ctx| {
            let (root, _) = build(ctx, fx.id("a"));
            let ub = ctx.design.child(root, fx.id("ub")).unwrap();
            assert!(ctx.design.scope(ub).children.is_empty());
            assert_eq!(fx.sink.error_count(), 1);
            let diag = &fx.sink.diagnostics()[0];
            assert_eq!(diag.code, errors::E305);
            assert_eq!(diag.notes, vec!["The offending instance is a.ub.ua within a.".to_string()]);
        });
    }

    #[test]
    fn instance_arrays_count_from_msb() {
        let fx = Fixture::new();
        let mut top = fx.module("top");
        let mut arr = fx.instance("leaf", "u");
        arr.range = Some(range(1, 3));
        top.instances.push(arr);
        let mut single = fx.instance("leaf", "s");
        single.range = Some(range(5, 5));
        top.instances.push(single);
        fx.with_ctx(vec![top, fx.module("leaf")], |ctx| {
            let (root, _) = build(ctx, fx.id("top"));
            let names: Vec<&str> = ctx.design.scope(root).instance_arrays[&fx.id("u")]
                .iter()
                .map(|&s| fx.name(ctx.design.scope(s).name))
                .collect();
            assert_eq!(names, vec!["u[1]", "u[2]", "u[3]"]);
            assert!(ctx.design.child(root, fx.id("s")).is_some());
            let leaf = ctx.design.child(root, fx.id("s")).unwrap();
            assert_eq!(ctx.design.scope(leaf).module_name, Some(fx.id("leaf")));
        });
    }

    #[test]
    fn instance_problems_are_reported() {
        let fx = Fixture::new();
        let mut top = fx.module("top");
        top.instances.push(fx.instance("leaf", "u"));
        top.instances.push(fx.instance("leaf", "u"));
        top.instances.push(fx.instance("nope", "v"));
        let mut unnamed = fx.instance("leaf", "x");
        unnamed.name = None;
        top.instances.push(unnamed);
        fx.with_ctx(vec![top, fx.module("leaf")], |ctx| {
            build(ctx, fx.id("top"));
            let codes: Vec<_> = fx.sink.diagnostics().iter().map(|d| d.code).collect();
            assert_eq!(codes, vec![errors::E304, errors::E300, errors::E303]);
        });
    }

    #[test]
    fn overrides_by_position_and_name() {
        let fx = Fixture::new();
        let mut leaf = fx.module("leaf");
        leaf.params.push(fx.param("A", num(1)));
        leaf.params.push(fx.param("B", num(2)));
        leaf.localparams.push(fx.param("L", num(3)));
        let mut top = fx.module("top");
        top.params.push(fx.param("T", num(7)));
        let mut p = fx.instance("leaf", "p");
        p.overrides = ParamOverrides::Positional(vec![num(10)]);
        let mut n = fx.instance("leaf", "n");
        n.overrides = ParamOverrides::Named(vec![(fx.id("B"), fx.ident("T")), (fx.id("L"), num(0))]);
        top.instances.extend([p, n]);
        fx.with_ctx(vec![top, leaf], |ctx| {
            let (root, _) = build(ctx, fx.id("top"));
            let p = ctx.design.child(root, fx.id("p")).unwrap();
            let n = ctx.design.child(root, fx.id("n")).unwrap();
            assert_eq!(value(ctx, p, fx.id("A")), Some(10));
            assert_eq!(value(ctx, p, fx.id("B")), Some(2));
            assert_eq!(value(ctx, n, fx.id("A")), Some(1));
            assert_eq!(value(ctx, n, fx.id("B")), Some(7));
            assert_eq!(value(ctx, n, fx.id("L")), Some(3));
            assert_eq!(fx.messages(), vec!["parameter L not found in top.n.".to_string()]);
        });
    }

    #[test]
    fn merged_overrides() {
        let fx = Fixture::new();
        let mut leaf = fx.module("leaf");
        leaf.params.push(fx.param("A", num(1)));
        let extra = ParamOverrides::Positional(vec![num(1), num(2)]);
        let merged = merge_overrides(&leaf, &extra).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].0, fx.id("A"));
        let both = ParamOverrides::Both {
            positional: vec![num(1)],
            named: vec![(fx.id("A"), num(2))],
        };
        assert!(merge_overrides(&leaf, &both).is_err());
    }

    #[test]
    fn ranged_parameter_settles_to_declared_width() {
        let fx = Fixture::new();
        let mut top = fx.module("top");
        top.params.push(fx.ranged_param("P", 3, 0, false, num(20)));
        fx.with_ctx(vec![top], |ctx| {
            let (root, _) = build(ctx, fx.id("top"));
            let slot = &ctx.design.scope(root).params[&fx.id("P")];
            let v = slot.constant().unwrap().to_number();
            assert_eq!(v.width(), 4);
            assert_eq!(v.as_u64(), Some(4));
        });
    }

    #[test]
    fn doubling_parameter_chain() {
        let fx = Fixture::new();
        let mut top = fx.module("top");
        top.params.push(fx.param("P0", num(1)));
        for k in 1..=24 {
            let prev = format!("P{}", k - 1);
            top.params.push(fx.param(
                &format!("P{k}"),
                crate::testutil::bin(aion_pform::BinaryOp::Add, fx.ident(&prev), fx.ident(&prev)),
            ));
        }
        fx.with_ctx(vec![top], |ctx| {
            let (root, ok) = build(ctx, fx.id("top"));
            assert!(ok);
            assert_eq!(value(ctx, root, fx.id("P24")), Some(1 << 24));
        });
    }

    #[test]
    fn select_of_parameter_with_dependent_range() {
        let fx = Fixture::new();
        let mut top = fx.module("top");
        top.params.push(fx.param("W", num(4)));
        let mut p = fx.param("P", num(3));
        p.range = Some(aion_pform::Range {
            msb: crate::testutil::bin(aion_pform::BinaryOp::Sub, fx.ident("W"), num(1)),
            lsb: num(0),
        });
        top.params.push(p);
        top.generates.push(fx.counting_loop("g", "i", 0, fx.part("P", 1, 0), vec![]));
        fx.with_ctx(vec![top], |ctx| {
            let (root, ok) = build(ctx, fx.id("top"));
            assert!(ok);
            assert_eq!(ctx.design.scope(root).generate_instances[&fx.id("g")].len(), 3);
            assert_eq!(ctx.design.param_range(root, fx.id("P")), Some((3, 0)));
            assert_eq!(fx.sink.diagnostics().len(), 0);
        });
    }

    #[test]
    fn named_blocks_tasks_and_events_open_scopes() {
        let fx = Fixture::new();
        let mut top = fx.module("top");
        let inner = block(&fx, Some("par"), BlockKind::Par, vec![]);
        let body = block(
            &fx,
            None,
            BlockKind::Seq,
            vec![Statement::Forever {
                body: Box::new(block(&fx, Some("blk"), BlockKind::Seq, vec![inner])),
                loc: Loc::DUMMY,
            }],
        );
        top.behaviors.push(Behavior {
            kind: BehaviorKind::Always,
            body,
            loc: Loc::DUMMY,
        });
        for _ in 0..2 {
            top.tasks.push(Task {
                name: fx.id("t"),
                ports: Vec::new(),
                body: Statement::Other { loc: Loc::DUMMY },
                loc: Loc::DUMMY,
            });
        }
        top.events.push(EventDecl {
            name: fx.id("done"),
            loc: Loc::DUMMY,
        });
        fx.with_ctx(vec![top], |ctx| {
            let (root, ok) = build(ctx, fx.id("top"));
            assert!(!ok);
            let blk = ctx.design.child(root, fx.id("blk")).unwrap();
            assert_eq!(ctx.design.scope(blk).kind, ScopeKind::BeginEnd);
            let par = ctx.design.child(blk, fx.id("par")).unwrap();
            assert_eq!(ctx.design.scope(par).kind, ScopeKind::ForkJoin);
            assert!(matches!(ctx.source(par), Some(ScopeSource::Block(_))));
            let t = ctx.design.child(root, fx.id("t")).unwrap();
            assert_eq!(ctx.design.scope(t).kind, ScopeKind::Task);
            assert!(ctx.design.scope(root).events.contains_key(&fx.id("done")));
            assert_eq!(fx.sink.diagnostics()[0].code, errors::E304);
        });
    }
}
