//! The signal pass.
//!
//! Runs after parameter evaluation, so declared ranges may use any
//! parameter. Every scope's nets and variables become [`Signal`]s; a
//! function scope also gets the variable carrying its return value, named
//! after the function.

use aion_common::AionResult;
use aion_netlist::{range_width, ScopeId, Signal};
use aion_pform::{NetKind, Range, WireDecl};

use crate::context::{ElaborationContext, ScopeSource};
use crate::errors;
use crate::eval::eval_const;

/// Declares the signals of every scope built so far.
pub fn elaborate_signals(ctx: &mut ElaborationContext<'_>) -> AionResult<()> {
    for (scope, source) in ctx.sources() {
        match source {
            ScopeSource::Module(module) => declare_all(ctx, scope, &module.wires),
            ScopeSource::Task(task) => declare_all(ctx, scope, &task.ports),
            ScopeSource::Function(function) => {
                let ret = WireDecl {
                    name: function.name,
                    kind: NetKind::Reg,
                    port: None,
                    signed: function.signed,
                    range: function.range.clone(),
                    array: None,
                    loc: function.loc,
                };
                declare(ctx, scope, &ret);
                declare_all(ctx, scope, &function.ports);
            }
            ScopeSource::Block(decls) => declare_all(ctx, scope, decls),
        }
    }
    Ok(())
}

fn declare_all(ctx: &mut ElaborationContext<'_>, scope: ScopeId, decls: &[WireDecl]) {
    for decl in decls {
        declare(ctx, scope, decl);
    }
}

fn declare(ctx: &mut ElaborationContext<'_>, scope: ScopeId, decl: &WireDecl) {
    let name = ctx.name(decl.name);
    let (implicit_width, implicit_signed) = decl.kind.implicit_shape();
    let (msb, lsb) = match &decl.range {
        Some(range) => match fold_range(ctx, range, scope) {
            Some(bounds) => bounds,
            None => {
                ctx.sink
                    .emit(errors::error_not_constant(&format!("range of {name}"), decl.loc));
                return;
            }
        },
        None => (i64::from(implicit_width) - 1, 0),
    };
    let array = match &decl.array {
        Some(range) => match fold_range(ctx, range, scope) {
            Some(bounds) => Some(bounds),
            None => {
                ctx.sink.emit(errors::error_not_constant(
                    &format!("array range of {name}"),
                    decl.loc,
                ));
                return;
            }
        },
        None => None,
    };
    if range_width(msb, lsb).is_none() {
        ctx.sink
            .emit(errors::error_too_wide(&format!("range of {name}"), decl.loc));
        return;
    }
    if let Some((first, last)) = array {
        if range_width(first, last).is_none() {
            ctx.sink
                .emit(errors::error_too_wide(&format!("array range of {name}"), decl.loc));
            return;
        }
    }
    let signed = decl.signed || implicit_signed;

    let s = ctx.design.scope(scope);
    if s.params.contains_key(&decl.name) || s.events.contains_key(&decl.name) {
        ctx.sink.emit(errors::error_duplicate_decl(name, decl.loc));
        return;
    }
    if let Some(&existing) = s.signals.get(&decl.name) {
        let sig = &mut ctx.design.signals[existing];
        if !merge_port(sig, decl, msb, lsb, signed) {
            ctx.sink.emit(errors::error_duplicate_decl(name, decl.loc));
        }
        return;
    }

    ctx.design.add_signal(Signal {
        name: decl.name,
        scope,
        kind: decl.kind,
        port: decl.port,
        signed,
        msb,
        lsb,
        array,
        loc: decl.loc,
    });
}

/// Folds a non-ANSI port declaration and the matching net or variable
/// declaration into one signal.
///
/// Returns `false` unless exactly one of the two carries the port direction.
fn merge_port(sig: &mut Signal, decl: &WireDecl, msb: i64, lsb: i64, signed: bool) -> bool {
    if sig.port.is_some() == decl.port.is_some() {
        return false;
    }
    match decl.port {
        Some(dir) => sig.port = Some(dir),
        None => {
            sig.kind = decl.kind;
            sig.loc = decl.loc;
        }
    }
    if decl.range.is_some() {
        sig.msb = msb;
        sig.lsb = lsb;
    }
    sig.signed |= signed;
    true
}

fn fold_range(ctx: &ElaborationContext<'_>, range: &Range, scope: ScopeId) -> Option<(i64, i64)> {
    let msb = eval_const(ctx, &range.msb, scope)?.as_i64()?;
    let lsb = eval_const(ctx, &range.lsb, scope)?.as_i64()?;
    Some((msb, lsb))
}
