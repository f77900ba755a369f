//! Elaboration of assignment targets.
//!
//! Procedural assignments may only target variables (`reg`, `integer`,
//! `time`, `real`), except for `force`, which may target nets too.
//! Continuous assignments may only target nets. Either may assign a bit,
//! part, memory word or a concatenation of targets.

use aion_netlist::{LvalPart, NetLval, ScopeId};
use aion_pform::{Expr, IdentExpr, NetKind, Select};

use crate::context::ElaborationContext;
use crate::errors;
use crate::expr::{Bounds, Elaborator};
use crate::lookup::{symbol_search, Symbol};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Target {
    Procedural { force: bool },
    Net,
}

/// Elaborates the target of a procedural assignment.
pub fn elaborate_lval(ctx: &ElaborationContext<'_>, expr: &Expr, scope: ScopeId, is_force: bool) -> Option<NetLval> {
    lval(ctx, expr, scope, Target::Procedural { force: is_force })
}

/// Elaborates the target of a continuous assignment.
pub fn elaborate_lnet(ctx: &ElaborationContext<'_>, expr: &Expr, scope: ScopeId) -> Option<NetLval> {
    lval(ctx, expr, scope, Target::Net)
}

fn lval(ctx: &ElaborationContext<'_>, expr: &Expr, scope: ScopeId, target: Target) -> Option<NetLval> {
    let mut parts = Vec::new();
    if collect(ctx, expr, scope, target, &mut parts) {
        Some(NetLval { parts })
    } else {
        None
    }
}

fn collect(
    ctx: &ElaborationContext<'_>,
    expr: &Expr,
    scope: ScopeId,
    target: Target,
    parts: &mut Vec<LvalPart>,
) -> bool {
    match expr {
        Expr::Concat {
            parts: items,
            repeat,
            loc,
        } => {
            if repeat.is_some() {
                ctx.sink.emit(errors::error_bad_lval(
                    "Replication is not allowed in an assignment target.",
                    *loc,
                ));
                return false;
            }
            let mut ok = true;
            for item in items {
                ok &= collect(ctx, item, scope, target, parts);
            }
            ok
        }
        Expr::Ident(ident) => match ident_part(ctx, ident, scope, target) {
            Some(part) => {
                parts.push(part);
                true
            }
            None => false,
        },
        other => {
            ctx.sink.emit(errors::error_bad_lval(
                "Expression is not a valid assignment target.",
                other.loc(),
            ));
            false
        }
    }
}

fn ident_part(ctx: &ElaborationContext<'_>, ident: &IdentExpr, scope: ScopeId, target: Target) -> Option<LvalPart> {
    let loc = ident.loc;
    let display = ctx.interner.join_path(&ident.path);
    let bad = |msg: String| {
        ctx.sink.emit(errors::error_bad_lval(&msg, loc));
        None
    };

    let id = match symbol_search(ctx, scope, &ident.path) {
        Symbol::Signal(id) => id,
        Symbol::Param { .. } => return bad(format!("Cannot assign to parameter {display}.")),
        Symbol::Genvar(_) => return bad(format!("Cannot assign to genvar {display}.")),
        Symbol::Event(_) => return bad(format!("Cannot assign to named event {display}.")),
        Symbol::NotFound => {
            ctx.sink.emit(errors::error_unbound(&display, &ctx.scope_name(scope), loc));
            return None;
        }
    };

    let sig = &ctx.design.signals[id];
    match target {
        Target::Procedural { force: false } if !sig.is_variable() => {
            return bad(format!(
                "{display} is not a valid l-value in {}: nets can only be driven by continuous assignments.",
                ctx.scope_name(scope)
            ));
        }
        Target::Net if sig.is_variable() => {
            return bad(format!(
                "{display} is a variable; continuous assignments need a net."
            ));
        }
        _ => {}
    }

    let elab = Elaborator::new(ctx, scope);
    let (word, select) = elab.split_word(ident, sig.array, &display)?;
    if sig.kind == NetKind::Real && !matches!(select, Select::None) {
        return bad(format!("Cannot assign to bits of real variable {display}."));
    }
    let bounds = Bounds {
        msb: sig.msb,
        lsb: sig.lsb,
    };
    let (offset, width) = elab.select_parts(select, bounds, true, &display, loc)?;
    Some(LvalPart {
        signal: id,
        word,
        offset,
        width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GenvarBinding;
    use crate::testutil::{bin, concat, num, Fixture};
    use aion_common::{Ident, Loc, Number};
    use aion_netlist::{ConstValue, ParamSlot, Signal};
    use aion_pform::BinaryOp;

    fn signal(scope: ScopeId, name: Ident, kind: NetKind, msb: i64) -> Signal {
        Signal {
            name,
            scope,
            kind,
            port: None,
            signed: false,
            msb,
            lsb: 0,
            array: None,
            loc: Loc::DUMMY,
        }
    }

    fn setup(fx: &Fixture, ctx: &mut ElaborationContext<'_>) -> ScopeId {
        let top = ctx.design.make_root_scope(fx.id("top"));
        ctx.design.add_signal(signal(top, fx.id("w"), NetKind::Wire, 7));
        ctx.design.add_signal(signal(top, fx.id("r"), NetKind::Reg, 3));
        ctx.design.add_signal(Signal {
            array: Some((0, 3)),
            ..signal(top, fx.id("mem"), NetKind::Reg, 15)
        });
        ctx.design.scope_mut(top).params.insert(
            fx.id("P"),
            ParamSlot::value(ConstValue::Logic(Number::from_i64(1)), false, Loc::DUMMY),
        );
        top
    }

    #[test]
    fn procedural_targets_must_be_variables() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let top = setup(&fx, ctx);
            let lv = elaborate_lval(ctx, &fx.ident("r"), top, false).unwrap();
            assert_eq!(lv.width(), 4);
            assert!(lv.parts[0].offset.is_none());

            assert!(elaborate_lval(ctx, &fx.ident("w"), top, false).is_none());
            assert!(elaborate_lval(ctx, &fx.ident("w"), top, true).is_some());
            assert_eq!(fx.sink.error_count(), 1);
            assert_eq!(
                fx.messages()[0],
                "w is not a valid l-value in top: nets can only be driven by continuous assignments."
            );
        });
    }

    #[test]
    fn continuous_targets_must_be_nets() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let top = setup(&fx, ctx);
            let lv = elaborate_lnet(ctx, &fx.part("w", 5, 2), top).unwrap();
            assert_eq!(lv.width(), 4);
            let offset = lv.parts[0].offset.as_ref().and_then(|o| o.as_const()).and_then(|n| n.as_i64());
            assert_eq!(offset, Some(2));
            assert!(elaborate_lnet(ctx, &fx.ident("r"), top).is_none());
            assert_eq!(fx.sink.diagnostics()[0].code, errors::E311);
        });
    }

    #[test]
    fn concatenated_and_memory_targets() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let top = setup(&fx, ctx);
            let target = concat(vec![fx.ident("r"), fx.bit("mem", num(2))], None);
            let lv = elaborate_lval(ctx, &target, top, false).unwrap();
            assert_eq!(lv.parts.len(), 2);
            assert_eq!(lv.width(), 20);
            let word = lv.parts[1].word.as_ref().and_then(|w| w.as_const()).and_then(|n| n.as_i64());
            assert_eq!(word, Some(2));

            let repeated = concat(vec![fx.ident("r")], Some(num(2)));
            assert!(elaborate_lval(ctx, &repeated, top, false).is_none());
            assert!(elaborate_lval(ctx, &bin(BinaryOp::Add, fx.ident("r"), num(1)), top, false).is_none());
            assert_eq!(fx.sink.error_count(), 2);
        });
    }

    #[test]
    fn parameters_and_genvars_are_not_targets() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let top = setup(&fx, ctx);
            ctx.genvar = Some(GenvarBinding {
                scope: top,
                name: fx.id("i"),
                value: 0,
            });
            assert!(elaborate_lval(ctx, &fx.ident("P"), top, false).is_none());
            assert!(elaborate_lnet(ctx, &fx.ident("i"), top).is_none());
            assert!(elaborate_lnet(ctx, &fx.ident("nope"), top).is_none());
            assert_eq!(
                fx.messages(),
                vec![
                    "Cannot assign to parameter P.".to_string(),
                    "Cannot assign to genvar i.".to_string(),
                    "Unable to bind wire/reg/memory `nope' in `top'".to_string(),
                ]
            );
        });
    }
}
