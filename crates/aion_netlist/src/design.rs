//! The top-level design container.
//!
//! A [`Design`] owns every scope, signal, and event created by elaboration,
//! plus the continuous assignments and the design-wide time precision.

use crate::arena::Arena;
use crate::const_value::ConstValue;
use crate::expr::{NetExpr, NetLval};
use crate::ids::{EventId, ScopeId, SignalId};
use crate::reduce::ParamResolver;
use crate::scope::{coerce_to_range, ParamSlot, ParamState, Scope, ScopeKind};
use crate::signal::{Event, Signal};
use aion_common::{Ident, Loc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A continuous assignment after elaboration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetAssign {
    /// The driven target.
    pub lval: NetLval,
    /// The driving value, exactly as wide as the target.
    pub rval: NetExpr,
    /// The scope the assignment appears in.
    pub scope: ScopeId,
    /// Source location.
    pub loc: Loc,
}

/// An elaborated design.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Design {
    /// Every scope, roots included.
    pub scopes: Arena<ScopeId, Scope>,
    /// The root scopes, in creation order.
    pub roots: Vec<ScopeId>,
    /// Every signal.
    pub signals: Arena<SignalId, Signal>,
    /// Every named event.
    pub events: Arena<EventId, Event>,
    /// Continuous assignments.
    pub assigns: Vec<NetAssign>,
    /// The finest time precision of any instantiated module.
    pub precision: i32,
    /// Free-form design flags.
    pub flags: BTreeMap<String, String>,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a root module scope named after `module`.
    pub fn make_root_scope(&mut self, module: Ident) -> ScopeId {
        let mut scope = Scope::new(module, ScopeKind::Module, None);
        scope.module_name = Some(module);
        let id = self.scopes.alloc(scope);
        self.roots.push(id);
        id
    }

    /// Creates a child scope of `parent`.
    pub fn new_scope(&mut self, parent: ScopeId, name: Ident, kind: ScopeKind) -> ScopeId {
        let id = self.scopes.alloc(Scope::new(name, kind, Some(parent)));
        self.scopes[parent].children.push(id);
        id
    }

    /// Returns the root scopes.
    pub fn find_root_scopes(&self) -> &[ScopeId] {
        &self.roots
    }

    /// Returns a scope.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    /// Returns a scope mutably.
    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id]
    }

    /// Finds the direct child of `parent` called `name`.
    pub fn child(&self, parent: ScopeId, name: Ident) -> Option<ScopeId> {
        self.scopes[parent]
            .children
            .iter()
            .copied()
            .find(|&c| self.scopes[c].name == name)
    }

    /// Registers a signal in its scope.
    pub fn add_signal(&mut self, signal: Signal) -> SignalId {
        let (scope, name) = (signal.scope, signal.name);
        let id = self.signals.alloc(signal);
        self.scopes[scope].signals.insert(name, id);
        id
    }

    /// Registers a named event in its scope.
    pub fn add_event(&mut self, event: Event) -> EventId {
        let (scope, name) = (event.scope, event.name);
        let id = self.events.alloc(event);
        self.scopes[scope].events.insert(name, id);
        id
    }

    /// Tightens the design precision to `precision` if that is finer.
    pub fn set_precision(&mut self, precision: i32) {
        if precision < self.precision {
            self.precision = precision;
        }
    }

    /// Returns the design precision.
    pub fn get_precision(&self) -> i32 {
        self.precision
    }

    /// Sets a design flag.
    pub fn set_flag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.flags.insert(key.into(), value.into());
    }

    /// Returns a design flag, or `""` when it is not set.
    pub fn get_flag(&self, key: &str) -> &str {
        self.flags.get(key).map(String::as_str).unwrap_or("")
    }

    /// Returns the names from the root down to `id`.
    pub fn scope_path(&self, id: ScopeId) -> Vec<Ident> {
        let mut path = Vec::new();
        let mut cur = Some(id);
        while let Some(s) = cur {
            path.push(self.scopes[s].name);
            cur = self.scopes[s].parent;
        }
        path.reverse();
        path
    }

    /// Returns the value parameter `name` of `scope` has so far.
    ///
    /// See [`Design::reduce`] for how pending parameters are treated.
    pub fn param_value(&self, scope: ScopeId, name: Ident) -> Option<ConstValue> {
        CurrentParams::new(self).resolve_param(scope, name)
    }

    /// Returns the declared `(msb, lsb)` of a ranged parameter once both
    /// bounds reduce.
    pub fn param_range(&self, scope: ScopeId, name: Ident) -> Option<(i64, i64)> {
        let slot = self.scopes[scope].params.get(&name)?;
        CurrentParams::new(self).range(slot)
    }

    /// Evaluates `expr` with the parameter values known so far.
    ///
    /// Parameters that are not evaluated yet are reduced on the spot and
    /// shaped to their declared range, without storing anything. A parameter
    /// that depends on itself does not reduce. Each parameter is reduced at
    /// most once per call.
    pub fn reduce(&self, expr: &NetExpr) -> Option<ConstValue> {
        expr.reduce(&mut CurrentParams::new(self))
    }
}

/// Resolves parameters from the design as it stands.
struct CurrentParams<'a> {
    design: &'a Design,
    active: Vec<(ScopeId, Ident)>,
    /// Slots already reduced during this call.
    memo: HashMap<(ScopeId, Ident), Option<ConstValue>>,
}

impl<'a> CurrentParams<'a> {
    fn new(design: &'a Design) -> Self {
        Self {
            design,
            active: Vec::new(),
            memo: HashMap::new(),
        }
    }

    fn range(&mut self, slot: &ParamSlot) -> Option<(i64, i64)> {
        let msb = slot.msb.as_ref()?.reduce(self)?.to_number().as_i64()?;
        let lsb = slot.lsb.as_ref()?.reduce(self)?.to_number().as_i64()?;
        Some((msb, lsb))
    }
}

impl ParamResolver for CurrentParams<'_> {
    fn resolve_param(&mut self, scope: ScopeId, name: Ident) -> Option<ConstValue> {
        let design = self.design;
        let slot = design.scopes[scope].params.get(&name)?;
        let expr = match &slot.state {
            ParamState::Value(v) => return Some(v.clone()),
            ParamState::Stub => return None,
            ParamState::Expression(e) => e,
        };
        if let Some(known) = self.memo.get(&(scope, name)) {
            return known.clone();
        }
        if self.active.contains(&(scope, name)) {
            return None;
        }
        self.active.push((scope, name));
        let range = self.range(slot);
        let value = if slot.is_ranged() && range.is_none() {
            None
        } else {
            expr.reduce(self)
        };
        self.active.pop();
        let value = value.and_then(|v| coerce_to_range(v, range, slot.signed));
        self.memo.insert((scope, name), value.clone());
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{ExprType, NetExprKind};
    use aion_common::{Interner, Number};

    #[test]
    fn scope_tree_and_paths() {
        let interner = Interner::new();
        let mut design = Design::new();
        let top = design.make_root_scope(interner.get_or_intern("top"));
        let u0 = design.new_scope(top, interner.get_or_intern("u0"), ScopeKind::Module);
        let blk = design.new_scope(u0, interner.get_or_intern("blk"), ScopeKind::BeginEnd);
        assert_eq!(design.find_root_scopes(), &[top]);
        assert_eq!(design.child(top, interner.get_or_intern("u0")), Some(u0));
        assert_eq!(design.child(top, interner.get_or_intern("blk")), None);
        assert_eq!(interner.join_path(&design.scope_path(blk)), "top.u0.blk");
        assert_eq!(design.scope(blk).parent, Some(u0));
    }

    #[test]
    fn precision_keeps_minimum() {
        let mut design = Design::new();
        design.set_precision(-9);
        design.set_precision(-6);
        assert_eq!(design.get_precision(), -9);
        design.set_precision(-12);
        assert_eq!(design.get_precision(), -12);
    }

    #[test]
    fn flags_default_empty() {
        let mut design = Design::new();
        design.set_flag("iwidth", "32");
        assert_eq!(design.get_flag("iwidth"), "32");
        assert_eq!(design.get_flag("missing"), "");
    }

    #[test]
    fn reduce_uses_stored_values() {
        let interner = Interner::new();
        let mut design = Design::new();
        let top = design.make_root_scope(interner.get_or_intern("top"));
        let w = interner.get_or_intern("W");
        design.scope_mut(top).params.insert(
            w,
            ParamSlot::value(ConstValue::Logic(Number::from_i64(8)), false, Loc::DUMMY),
        );
        let e = NetExpr::new(
            NetExprKind::Param { scope: top, name: w },
            32,
            true,
            ExprType::Logic,
            Loc::DUMMY,
        );
        assert_eq!(design.reduce(&e), Some(ConstValue::Logic(Number::from_i64(8))));
    }

    #[test]
    fn reduce_evaluates_pending_parameters() {
        let interner = Interner::new();
        let mut design = Design::new();
        let top = design.make_root_scope(interner.get_or_intern("top"));
        let (a, b) = (interner.get_or_intern("A"), interner.get_or_intern("B"));
        let param = |name| {
            NetExpr::new(NetExprKind::Param { scope: top, name }, 0, false, ExprType::Logic, Loc::DUMMY)
        };
        let mut ranged = ParamSlot::stub(false, false, Loc::DUMMY);
        ranged.state = ParamState::Expression(NetExpr::constant(Number::from_i64(20), Loc::DUMMY));
        ranged.msb = Some(NetExpr::constant(Number::from_i64(3), Loc::DUMMY));
        ranged.lsb = Some(NetExpr::constant(Number::from_i64(0), Loc::DUMMY));
        design.scope_mut(top).params.insert(a, ranged);
        let mut looped = ParamSlot::stub(false, false, Loc::DUMMY);
        looped.state = ParamState::Expression(param(b));
        design.scope_mut(top).params.insert(b, looped);

        assert_eq!(design.reduce(&param(a)), Some(ConstValue::Logic(Number::from_u64(4, 4))));
        assert_eq!(design.reduce(&param(b)), None);
        assert_eq!(design.param_value(top, a), Some(ConstValue::Logic(Number::from_u64(4, 4))));
        // Nothing is stored.
        assert!(matches!(design.scope(top).params[&a].state, ParamState::Expression(_)));
    }

    #[test]
    fn shared_dependencies_reduce_once() {
        let interner = Interner::new();
        let mut design = Design::new();
        let top = design.make_root_scope(interner.get_or_intern("top"));
        let names: Vec<Ident> = (0..=30).map(|k| interner.get_or_intern(&format!("P{k}"))).collect();
        let param = |name| {
            NetExpr::new(NetExprKind::Param { scope: top, name }, 32, true, ExprType::Logic, Loc::DUMMY)
        };
        design.scope_mut(top).params.insert(
            names[0],
            ParamSlot::value(ConstValue::Logic(Number::from_i64(1)), false, Loc::DUMMY),
        );
        // Pk = P(k-1) + P(k-1)
        for pair in names.windows(2) {
            let mut slot = ParamSlot::stub(false, false, Loc::DUMMY);
            let sum = NetExprKind::Binary {
                op: aion_pform::BinaryOp::Add,
                lhs: Box::new(param(pair[0])),
                rhs: Box::new(param(pair[0])),
            };
            slot.state = ParamState::Expression(NetExpr::new(sum, 32, true, ExprType::Logic, Loc::DUMMY));
            design.scope_mut(top).params.insert(pair[1], slot);
        }
        let last = design.param_value(top, names[30]).map(|v| v.to_number().as_i64());
        assert_eq!(last, Some(Some(1 << 30)));
    }

    #[test]
    fn ranges_reduce_through_parameters() {
        let interner = Interner::new();
        let mut design = Design::new();
        let top = design.make_root_scope(interner.get_or_intern("top"));
        let (w, p) = (interner.get_or_intern("W"), interner.get_or_intern("P"));
        let mut width = ParamSlot::stub(false, false, Loc::DUMMY);
        width.state = ParamState::Expression(NetExpr::constant(Number::from_i64(4), Loc::DUMMY));
        design.scope_mut(top).params.insert(w, width);
        let mut ranged = ParamSlot::stub(false, false, Loc::DUMMY);
        ranged.state = ParamState::Expression(NetExpr::constant(Number::from_i64(3), Loc::DUMMY));
        ranged.msb = Some(NetExpr::new(
            NetExprKind::Binary {
                op: aion_pform::BinaryOp::Sub,
                lhs: Box::new(NetExpr::new(
                    NetExprKind::Param { scope: top, name: w },
                    32,
                    true,
                    ExprType::Logic,
                    Loc::DUMMY,
                )),
                rhs: Box::new(NetExpr::constant(Number::from_i64(1), Loc::DUMMY)),
            },
            32,
            true,
            ExprType::Logic,
            Loc::DUMMY,
        ));
        ranged.lsb = Some(NetExpr::constant(Number::from_i64(0), Loc::DUMMY));
        design.scope_mut(top).params.insert(p, ranged);

        assert_eq!(design.param_range(top, p), Some((3, 0)));
        assert_eq!(design.param_range(top, w), None);
        let value = design.param_value(top, p).map(|v| v.to_number());
        assert_eq!(value.map(|n| n.width()), Some(4));
    }

    #[test]
    fn signals_register_in_scope() {
        let interner = Interner::new();
        let mut design = Design::new();
        let top = design.make_root_scope(interner.get_or_intern("top"));
        let clk = interner.get_or_intern("clk");
        let id = design.add_signal(Signal {
            name: clk,
            scope: top,
            kind: aion_pform::NetKind::Wire,
            port: Some(aion_pform::PortDir::Input),
            signed: false,
            msb: 0,
            lsb: 0,
            array: None,
            loc: Loc::DUMMY,
        });
        assert_eq!(design.scope(top).signals.get(&clk), Some(&id));
        let ev = interner.get_or_intern("done");
        let eid = design.add_event(Event {
            name: ev,
            scope: top,
            loc: Loc::DUMMY,
        });
        assert_eq!(design.scope(top).events.get(&ev), Some(&eid));
    }
}
