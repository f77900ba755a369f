//! Hierarchical name resolution over the scope tree.
//!
//! Scope paths are tried relative to the starting scope and each of its
//! ancestors in turn, then as absolute paths from a root. Plain signal names
//! are searched upward only until the enclosing module scope; parameters,
//! events, tasks and functions are also found in the scopes above it.

use aion_common::Ident;
use aion_netlist::{Design, EventId, ScopeId, ScopeKind, SignalId};

use crate::context::ElaborationContext;

/// What an identifier resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// A parameter or localparam.
    Param {
        /// The declaring scope.
        scope: ScopeId,
        /// The parameter name.
        name: Ident,
    },
    /// A net or variable.
    Signal(SignalId),
    /// A named event.
    Event(EventId),
    /// The genvar of the loop currently being unrolled.
    Genvar(i64),
    /// Nothing by that name.
    NotFound,
}

/// Finds a scope by absolute path, starting at a root.
pub fn find_scope(design: &Design, path: &[Ident]) -> Option<ScopeId> {
    let (first, rest) = path.split_first()?;
    design
        .roots
        .iter()
        .copied()
        .filter(|&r| design.scope(r).name == *first)
        .find_map(|r| descend(design, r, rest))
}

/// Finds a scope by path, relative to `scope` or one of its ancestors,
/// falling back to an absolute lookup.
///
/// An empty path names `scope` itself.
pub fn find_scope_from(design: &Design, scope: ScopeId, path: &[Ident]) -> Option<ScopeId> {
    if path.is_empty() {
        return Some(scope);
    }
    let mut cur = Some(scope);
    while let Some(c) = cur {
        if let Some(found) = descend(design, c, path) {
            return Some(found);
        }
        // Upward reference by the name of an enclosing scope.
        if design.scope(c).name == path[0] {
            if let Some(found) = descend(design, c, &path[1..]) {
                return Some(found);
            }
        }
        cur = design.scope(c).parent;
    }
    find_scope(design, path)
}

fn descend(design: &Design, from: ScopeId, path: &[Ident]) -> Option<ScopeId> {
    path.iter()
        .try_fold(from, |cur, &name| design.child(cur, name))
}

/// Finds a net or variable by possibly hierarchical name.
pub fn find_signal(design: &Design, scope: ScopeId, path: &[Ident]) -> Option<SignalId> {
    let (name, prefix) = path.split_last()?;
    if !prefix.is_empty() {
        let target = find_scope_from(design, scope, prefix)?;
        return design.scope(target).signals.get(name).copied();
    }
    let mut cur = Some(scope);
    while let Some(c) = cur {
        let s = design.scope(c);
        if let Some(&sig) = s.signals.get(name) {
            return Some(sig);
        }
        if s.kind == ScopeKind::Module {
            break;
        }
        cur = s.parent;
    }
    None
}

/// Finds a task scope by possibly hierarchical name.
pub fn find_task(design: &Design, scope: ScopeId, path: &[Ident]) -> Option<ScopeId> {
    find_subprogram(design, scope, path, ScopeKind::Task)
}

/// Finds a function scope by possibly hierarchical name.
pub fn find_function(design: &Design, scope: ScopeId, path: &[Ident]) -> Option<ScopeId> {
    find_subprogram(design, scope, path, ScopeKind::Function)
}

fn find_subprogram(design: &Design, scope: ScopeId, path: &[Ident], kind: ScopeKind) -> Option<ScopeId> {
    if let [name] = path {
        let mut cur = Some(scope);
        while let Some(c) = cur {
            if let Some(child) = design.child(c, *name) {
                if design.scope(child).kind == kind {
                    return Some(child);
                }
            }
            cur = design.scope(c).parent;
        }
        return None;
    }
    find_scope_from(design, scope, path).filter(|&s| design.scope(s).kind == kind)
}

/// Resolves an identifier used in an expression.
///
/// A bare name matching the genvar of the loop being unrolled in `scope`
/// wins over everything else.
pub fn symbol_search(ctx: &ElaborationContext<'_>, scope: ScopeId, path: &[Ident]) -> Symbol {
    if let [name] = path {
        if let Some(value) = ctx.genvar_value(scope, *name) {
            return Symbol::Genvar(value);
        }
    }
    let design = &ctx.design;
    let Some((&name, prefix)) = path.split_last() else {
        return Symbol::NotFound;
    };

    if !prefix.is_empty() {
        let Some(target) = find_scope_from(design, scope, prefix) else {
            return Symbol::NotFound;
        };
        let s = design.scope(target);
        if s.params.contains_key(&name) {
            return Symbol::Param { scope: target, name };
        }
        if let Some(&sig) = s.signals.get(&name) {
            return Symbol::Signal(sig);
        }
        if let Some(&ev) = s.events.get(&name) {
            return Symbol::Event(ev);
        }
        return Symbol::NotFound;
    }

    let mut cur = Some(scope);
    let mut in_module = true;
    while let Some(c) = cur {
        let s = design.scope(c);
        if s.params.contains_key(&name) {
            return Symbol::Param { scope: c, name };
        }
        if in_module {
            if let Some(&sig) = s.signals.get(&name) {
                return Symbol::Signal(sig);
            }
        }
        if let Some(&ev) = s.events.get(&name) {
            return Symbol::Event(ev);
        }
        if s.kind == ScopeKind::Module {
            in_module = false;
        }
        cur = s.parent;
    }
    Symbol::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GenvarBinding;
    use crate::testutil::Fixture;
    use aion_common::Loc;
    use aion_netlist::{ConstValue, ParamSlot, Signal};
    use aion_pform::NetKind;

    fn signal(scope: ScopeId, name: Ident) -> Signal {
        Signal {
            name,
            scope,
            kind: NetKind::Wire,
            port: None,
            signed: false,
            msb: 0,
            lsb: 0,
            array: None,
            loc: Loc::DUMMY,
        }
    }

    #[test]
    fn relative_upward_and_absolute_scopes() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let d = &mut ctx.design;
            let top = d.make_root_scope(fx.id("top"));
            let u0 = d.new_scope(top, fx.id("u0"), ScopeKind::Module);
            let u1 = d.new_scope(top, fx.id("u1"), ScopeKind::Module);
            let blk = d.new_scope(u1, fx.id("blk"), ScopeKind::BeginEnd);

            assert_eq!(find_scope(d, &[fx.id("top"), fx.id("u1"), fx.id("blk")]), Some(blk));
            assert_eq!(find_scope_from(d, blk, &[fx.id("u0")]), Some(u0));
            assert_eq!(find_scope_from(d, blk, &[]), Some(blk));
            assert_eq!(find_scope_from(d, blk, &[fx.id("u1"), fx.id("blk")]), Some(blk));
            assert_eq!(find_scope_from(d, u0, &[fx.id("top"), fx.id("u1")]), Some(u1));
            assert_eq!(find_scope_from(d, u0, &[fx.id("nope")]), None);
        });
    }

    #[test]
    fn plain_signals_stop_at_module_boundary() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let top = ctx.design.make_root_scope(fx.id("top"));
            let u0 = ctx.design.new_scope(top, fx.id("u0"), ScopeKind::Module);
            let blk = ctx.design.new_scope(u0, fx.id("blk"), ScopeKind::BeginEnd);
            let a = ctx.design.add_signal(signal(top, fx.id("a")));
            let b = ctx.design.add_signal(signal(u0, fx.id("b")));
            ctx.design
                .scope_mut(top)
                .params
                .insert(fx.id("P"), ParamSlot::value(ConstValue::Real(1.0), false, Loc::DUMMY));

            assert_eq!(find_signal(&ctx.design, blk, &[fx.id("b")]), Some(b));
            assert_eq!(find_signal(&ctx.design, blk, &[fx.id("a")]), None);
            assert_eq!(find_signal(&ctx.design, blk, &[fx.id("top"), fx.id("a")]), Some(a));

            assert_eq!(symbol_search(ctx, blk, &[fx.id("a")]), Symbol::NotFound);
            assert_eq!(
                symbol_search(ctx, blk, &[fx.id("P")]),
                Symbol::Param { scope: top, name: fx.id("P") }
            );
            assert_eq!(symbol_search(ctx, blk, &[fx.id("top"), fx.id("a")]), Symbol::Signal(a));
        });
    }

    #[test]
    fn genvar_binding_only_in_container() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let top = ctx.design.make_root_scope(fx.id("top"));
            let g = ctx.design.new_scope(top, fx.id("g[0]"), ScopeKind::GenBlock);
            ctx.genvar = Some(GenvarBinding {
                scope: top,
                name: fx.id("i"),
                value: 3,
            });
            assert_eq!(symbol_search(ctx, top, &[fx.id("i")]), Symbol::Genvar(3));
            assert_eq!(symbol_search(ctx, g, &[fx.id("i")]), Symbol::NotFound);
        });
    }

    #[test]
    fn functions_found_upward() {
        let fx = Fixture::new();
        fx.with_ctx(vec![], |ctx| {
            let d = &mut ctx.design;
            let top = d.make_root_scope(fx.id("top"));
            let f = d.new_scope(top, fx.id("f"), ScopeKind::Function);
            let t = d.new_scope(top, fx.id("t"), ScopeKind::Task);
            let blk = d.new_scope(top, fx.id("blk"), ScopeKind::BeginEnd);
            assert_eq!(find_function(d, blk, &[fx.id("f")]), Some(f));
            assert_eq!(find_function(d, blk, &[fx.id("t")]), None);
            assert_eq!(find_task(d, blk, &[fx.id("t")]), Some(t));
            assert_eq!(find_task(d, blk, &[fx.id("top"), fx.id("t")]), Some(t));
        });
    }
}
