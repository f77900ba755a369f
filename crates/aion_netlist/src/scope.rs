//! Lexical scopes and their parameter slots.

use crate::const_value::ConstValue;
use crate::expr::{NetExpr, NetExprKind};
use crate::ids::{EventId, ScopeId, SignalId};
use aion_common::{Ident, Loc};
use aion_pform::NetKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What kind of construct opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    /// A module instance (or a root module).
    Module,
    /// A task body.
    Task,
    /// A function body.
    Function,
    /// A named `begin ... end` block.
    BeginEnd,
    /// A named `fork ... join` block.
    ForkJoin,
    /// One replicated body of a generate loop.
    GenBlock,
}

/// Where a parameter slot is in its stub → expression → value lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParamState {
    /// Registered but not yet elaborated, or its elaboration failed.
    Stub,
    /// Elaborated; may still reference other parameters.
    Expression(NetExpr),
    /// Fully evaluated.
    Value(ConstValue),
}

/// A parameter or localparam of a scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSlot {
    /// The current state.
    pub state: ParamState,
    /// Declared most significant bound.
    pub msb: Option<NetExpr>,
    /// Declared least significant bound.
    pub lsb: Option<NetExpr>,
    /// Declared signedness.
    pub signed: bool,
    /// `true` for localparams and genvar bindings.
    pub local: bool,
    /// Declaration site.
    pub loc: Loc,
}

impl ParamSlot {
    /// Creates a stub slot.
    pub fn stub(signed: bool, local: bool, loc: Loc) -> Self {
        Self {
            state: ParamState::Stub,
            msb: None,
            lsb: None,
            signed,
            local,
            loc,
        }
    }

    /// Creates an evaluated, unranged slot.
    pub fn value(value: ConstValue, local: bool, loc: Loc) -> Self {
        Self {
            state: ParamState::Value(value),
            msb: None,
            lsb: None,
            signed: false,
            local,
            loc,
        }
    }

    /// Returns `true` if the declaration had an explicit range.
    pub fn is_ranged(&self) -> bool {
        self.msb.is_some() || self.lsb.is_some()
    }

    /// Returns the declared `(msb, lsb)` once both bounds are constants.
    pub fn const_range(&self) -> Option<(i64, i64)> {
        let msb = self.msb.as_ref()?.as_const()?.as_i64()?;
        let lsb = self.lsb.as_ref()?.as_const()?.as_i64()?;
        Some((msb, lsb))
    }

    /// Returns the value if it is already known.
    ///
    /// That is the case once evaluated, or when the elaborated expression
    /// already folded to a literal.
    pub fn constant(&self) -> Option<ConstValue> {
        match &self.state {
            ParamState::Value(v) => Some(v.clone()),
            ParamState::Expression(e) => match &e.kind {
                NetExprKind::Const(n) => Some(ConstValue::Logic(n.clone())),
                NetExprKind::RealConst(v) => Some(ConstValue::Real(*v)),
                _ => None,
            },
            ParamState::Stub => None,
        }
    }
}

/// Returns the number of bits in `[msb:lsb]`, or `None` if that does not
/// fit in a `u32`.
pub fn range_width(msb: i64, lsb: i64) -> Option<u32> {
    let span = msb.checked_sub(lsb)?.unsigned_abs();
    u32::try_from(span.checked_add(1)?).ok()
}

/// Gives a folded value the declared shape of its parameter.
///
/// A ranged parameter is exactly `|msb - lsb| + 1` bits with the declared
/// signedness. An unranged `signed` parameter keeps the natural width of its
/// value but becomes signed; reals stay reals. Returns `None` for a range
/// too wide to represent.
pub fn coerce_to_range(
    value: ConstValue,
    range: Option<(i64, i64)>,
    signed: bool,
) -> Option<ConstValue> {
    Some(match range {
        Some((msb, lsb)) => ConstValue::Logic(
            value
                .to_number()
                .resized(range_width(msb, lsb)?)
                .with_signed(signed)
                .with_sized(true),
        ),
        None if signed => match value {
            ConstValue::Logic(n) => ConstValue::Logic(n.with_signed(true)),
            real => real,
        },
        None => value,
    })
}

/// A `defparam` collected during scope building, applied after the tree exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDefparam {
    /// Path of the target parameter, relative to the declaring scope.
    pub path: Vec<Ident>,
    /// The override, elaborated in the declaring scope.
    pub expr: NetExpr,
    /// Declaration site.
    pub loc: Loc,
}

/// One node of the scope tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    /// The scope's own name, e.g. `u0`, `g[2]`, `blk`.
    pub name: Ident,
    /// The construct that opened it.
    pub kind: ScopeKind,
    /// The enclosing scope; `None` for roots.
    pub parent: Option<ScopeId>,
    /// Child scopes in creation order.
    pub children: Vec<ScopeId>,
    /// The instantiated module type, for module scopes.
    pub module_name: Option<Ident>,
    /// Parameters and localparams by name.
    pub params: BTreeMap<Ident, ParamSlot>,
    /// Signals by name.
    pub signals: BTreeMap<Ident, SignalId>,
    /// Named events by name.
    pub events: BTreeMap<Ident, EventId>,
    /// Instance arrays by base instance name, elements in creation order.
    pub instance_arrays: BTreeMap<Ident, Vec<ScopeId>>,
    /// Generate loop bodies by block name, in iteration order.
    pub generate_instances: BTreeMap<Ident, Vec<ScopeId>>,
    /// Defparams awaiting application.
    pub defparams: Vec<PendingDefparam>,
    /// The default net type; `None` for `none`.
    pub default_nettype: Option<NetKind>,
    /// Time unit as a power of ten seconds.
    pub time_unit: i32,
    /// Time precision as a power of ten seconds.
    pub time_precision: i32,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new(name: Ident, kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            name,
            kind,
            parent,
            children: Vec::new(),
            module_name: None,
            params: BTreeMap::new(),
            signals: BTreeMap::new(),
            events: BTreeMap::new(),
            instance_arrays: BTreeMap::new(),
            generate_instances: BTreeMap::new(),
            defparams: Vec::new(),
            default_nettype: Some(NetKind::Wire),
            time_unit: 0,
            time_precision: 0,
        }
    }

    /// Returns `true` if `name` is already taken by a parameter, signal, or event.
    pub fn declares(&self, name: Ident) -> bool {
        self.params.contains_key(&name)
            || self.signals.contains_key(&name)
            || self.events.contains_key(&name)
    }
}
