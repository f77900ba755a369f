//! The assignment passes.
//!
//! Continuous assignments are elaborated into [`NetAssign`]s whose right side
//! is exactly as wide as the target. Procedural assignments in `initial` and
//! `always` bodies, tasks and functions are only checked: their targets must
//! be variables unless the assignment is a `force`.

use aion_common::AionResult;
use aion_netlist::{NetAssign, ScopeId};
use aion_pform::{Module, Statement};

use crate::context::{ElaborationContext, ScopeSource};
use crate::expr::elab_and_eval;
use crate::lval::{elaborate_lnet, elaborate_lval};

/// Elaborates every continuous assignment and checks every procedural one.
pub fn elaborate_assigns(ctx: &mut ElaborationContext<'_>) -> AionResult<()> {
    for (scope, source) in ctx.sources() {
        match source {
            ScopeSource::Module(module) => {
                continuous(ctx, module, scope);
                for behavior in &module.behaviors {
                    procedural(ctx, &behavior.body, scope);
                }
            }
            ScopeSource::Task(task) => procedural(ctx, &task.body, scope),
            ScopeSource::Function(function) => procedural(ctx, &function.body, scope),
            // Named blocks are visited from their enclosing body.
            ScopeSource::Block(_) => {}
        }
    }
    Ok(())
}

fn continuous(ctx: &mut ElaborationContext<'_>, module: &Module, scope: ScopeId) {
    for assign in &module.assigns {
        let Some(lval) = elaborate_lnet(ctx, &assign.lval, scope) else {
            continue;
        };
        let width = lval.width();
        let Some(rval) = elab_and_eval(ctx, &assign.rval, scope, width as i32) else {
            continue;
        };
        ctx.design.assigns.push(NetAssign {
            lval,
            rval: rval.resized(width),
            scope,
            loc: assign.loc,
        });
    }
}

fn procedural(ctx: &ElaborationContext<'_>, stmt: &Statement, scope: ScopeId) {
    match stmt {
        Statement::Block { name, stmts, .. } => {
            // A block whose scope could not be created was already reported.
            let inner = match name {
                Some(name) => match ctx.design.child(scope, *name) {
                    Some(child) => child,
                    None => return,
                },
                None => scope,
            };
            for s in stmts {
                procedural(ctx, s, inner);
            }
        }
        Statement::Assign {
            lval, rval, force, ..
        } => {
            if let Some(target) = elaborate_lval(ctx, lval, scope, *force) {
                elab_and_eval(ctx, rval, scope, target.width() as i32);
            }
        }
        Statement::If {
            then_stmt,
            else_stmt,
            ..
        } => {
            for s in [then_stmt, else_stmt].into_iter().flatten() {
                procedural(ctx, s, scope);
            }
        }
        Statement::Case { arms, .. } => {
            for body in arms.iter().filter_map(|arm| arm.body.as_ref()) {
                procedural(ctx, body, scope);
            }
        }
        Statement::Delay { body, .. } | Statement::EventWait { body, .. } => {
            if let Some(body) = body {
                procedural(ctx, body, scope);
            }
        }
        Statement::For {
            init, step, body, ..
        } => {
            procedural(ctx, init, scope);
            procedural(ctx, step, scope);
            procedural(ctx, body, scope);
        }
        Statement::Forever { body, .. }
        | Statement::Repeat { body, .. }
        | Statement::While { body, .. } => procedural(ctx, body, scope),
        Statement::Other { .. } => {}
    }
}
