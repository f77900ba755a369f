//! Module-level declarations and the module library.

use crate::expr::{Expr, HierName};
use crate::stmt::Statement;
use aion_common::{Ident, Loc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Library and module
// ============================================================================

/// Every module handed over by the parser, in declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Library {
    /// The parsed modules.
    pub modules: Vec<Module>,
}

impl Library {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a module.
    pub fn push(&mut self, module: Module) {
        self.modules.push(module);
    }
}

/// A Verilog module declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The module name.
    pub name: Ident,
    /// Port names in header order.
    pub ports: Vec<Ident>,
    /// Overridable parameters in declaration order.
    pub params: Vec<ParamDecl>,
    /// Local parameters.
    pub localparams: Vec<ParamDecl>,
    /// `defparam` statements.
    pub defparams: Vec<Defparam>,
    /// Net and variable declarations, including port declarations.
    pub wires: Vec<WireDecl>,
    /// Named event declarations.
    pub events: Vec<EventDecl>,
    /// Generate constructs.
    pub generates: Vec<Generate>,
    /// Task declarations.
    pub tasks: Vec<Task>,
    /// Function declarations.
    pub functions: Vec<Function>,
    /// Module instantiations.
    pub instances: Vec<Instantiation>,
    /// `initial` and `always` blocks.
    pub behaviors: Vec<Behavior>,
    /// Continuous assignments.
    pub assigns: Vec<ContinuousAssign>,
    /// The `` `default_nettype `` in effect; `None` for `none`.
    pub default_nettype: Option<NetKind>,
    /// `` `timescale `` unit as a power of ten seconds.
    pub time_unit: i32,
    /// `` `timescale `` precision as a power of ten seconds.
    pub time_precision: i32,
    /// Source location.
    pub loc: Loc,
}

impl Module {
    /// Creates an empty module with `wire` as default net type and a 1s/1s timescale.
    pub fn new(name: Ident, loc: Loc) -> Self {
        Self {
            name,
            ports: Vec::new(),
            params: Vec::new(),
            localparams: Vec::new(),
            defparams: Vec::new(),
            wires: Vec::new(),
            events: Vec::new(),
            generates: Vec::new(),
            tasks: Vec::new(),
            functions: Vec::new(),
            instances: Vec::new(),
            behaviors: Vec::new(),
            assigns: Vec::new(),
            default_nettype: Some(NetKind::Wire),
            time_unit: 0,
            time_precision: 0,
            loc,
        }
    }

    /// Returns the overridable parameter names in declaration order.
    ///
    /// Positional overrides pair against this list.
    pub fn param_names(&self) -> Vec<Ident> {
        self.params.iter().map(|p| p.name).collect()
    }

    /// Returns `true` if `name` is an overridable parameter of this module.
    pub fn has_param(&self, name: Ident) -> bool {
        self.params.iter().any(|p| p.name == name)
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// A bit range `[msb:lsb]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Range {
    /// Most significant bound.
    pub msb: Expr,
    /// Least significant bound.
    pub lsb: Expr,
}

/// A `parameter` or `localparam` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    /// Parameter name.
    pub name: Ident,
    /// Default value expression.
    pub expr: Expr,
    /// Optional explicit range.
    pub range: Option<Range>,
    /// Whether the declaration says `signed`.
    pub signed: bool,
    /// Source location.
    pub loc: Loc,
}

/// A `defparam path = expr;` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defparam {
    /// Hierarchical path of the target parameter; the last component is its name.
    pub path: HierName,
    /// The override value, evaluated in the declaring scope.
    pub expr: Expr,
    /// Source location.
    pub loc: Loc,
}

// ============================================================================
// Nets and events
// ============================================================================

/// Net or variable type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetKind {
    /// `wire`
    Wire,
    /// `tri`
    Tri,
    /// `tri0`
    Tri0,
    /// `tri1`
    Tri1,
    /// `wand`
    Wand,
    /// `wor`
    Wor,
    /// `supply0`
    Supply0,
    /// `supply1`
    Supply1,
    /// `reg`
    Reg,
    /// `integer`
    Integer,
    /// `time`
    Time,
    /// `real`
    Real,
}

impl NetKind {
    /// Returns `true` for the variable kinds that procedural code may assign.
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            NetKind::Reg | NetKind::Integer | NetKind::Time | NetKind::Real
        )
    }

    /// Width and signedness implied by the keyword when no range is given.
    pub fn implicit_shape(self) -> (u32, bool) {
        match self {
            NetKind::Integer => (32, true),
            NetKind::Time => (64, false),
            NetKind::Real => (64, true),
            _ => (1, false),
        }
    }
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDir {
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout`
    Inout,
}

/// A net, variable, or port declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDecl {
    /// The declared name.
    pub name: Ident,
    /// The net or variable kind.
    pub kind: NetKind,
    /// Port direction if this name is a port.
    pub port: Option<PortDir>,
    /// Whether the declaration says `signed`.
    pub signed: bool,
    /// Packed range.
    pub range: Option<Range>,
    /// Unpacked (memory) range.
    pub array: Option<Range>,
    /// Source location.
    pub loc: Loc,
}

/// An `event name;` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDecl {
    /// The event name.
    pub name: Ident,
    /// Source location.
    pub loc: Loc,
}

/// An `assign lval = rval;` continuous assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousAssign {
    /// The driven net expression.
    pub lval: Expr,
    /// The driving expression.
    pub rval: Expr,
    /// Source location.
    pub loc: Loc,
}

// ============================================================================
// Generate, tasks, functions, behaviors
// ============================================================================

/// A generate construct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generate {
    /// Which kind of generate this is.
    pub scheme: GenerateScheme,
    /// The block label; replicated scopes are named `name[index]`.
    pub name: Ident,
    /// Instantiations inside the generate body.
    pub instances: Vec<Instantiation>,
    /// Source location.
    pub loc: Loc,
}

/// The control scheme of a generate construct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GenerateScheme {
    /// `for (genvar = init; test; genvar = step)`
    Loop {
        /// The loop variable.
        genvar: Ident,
        /// The initial value.
        init: Expr,
        /// The continuation test.
        test: Expr,
        /// The next-value expression.
        step: Expr,
    },
    /// `if (cond)` generate.
    Cond {
        /// The selecting condition.
        cond: Expr,
    },
    /// `case (expr)` generate.
    Case {
        /// The selector.
        expr: Expr,
    },
}

/// A `task` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// The task name.
    pub name: Ident,
    /// Port and local declarations.
    pub ports: Vec<WireDecl>,
    /// The task body.
    pub body: Statement,
    /// Source location.
    pub loc: Loc,
}

/// A `function` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    /// The function name, which is also the name of its return variable.
    pub name: Ident,
    /// Whether the return value is signed.
    pub signed: bool,
    /// Range of the return value; 1 bit when absent.
    pub range: Option<Range>,
    /// Input and local declarations.
    pub ports: Vec<WireDecl>,
    /// The function body.
    pub body: Statement,
    /// Source location.
    pub loc: Loc,
}

/// Whether a behavior runs once or forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorKind {
    /// `initial`
    Initial,
    /// `always`
    Always,
}

/// An `initial` or `always` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Behavior {
    /// `initial` or `always`.
    pub kind: BehaviorKind,
    /// The body statement.
    pub body: Statement,
    /// Source location.
    pub loc: Loc,
}

// ============================================================================
// Instantiation
// ============================================================================

/// A module instantiation, possibly an instance array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instantiation {
    /// The instantiated module's name.
    pub module: Ident,
    /// The instance name; `None` when the source omitted it.
    pub name: Option<Ident>,
    /// Instance array range `[msb:lsb]`.
    pub range: Option<Range>,
    /// Parameter overrides given with `#(...)`.
    pub overrides: ParamOverrides,
    /// Port connections.
    pub ports: Vec<PortConnection>,
    /// Source location.
    pub loc: Loc,
}

/// The `#(...)` parameter overrides of an instantiation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum ParamOverrides {
    /// No overrides.
    #[default]
    None,
    /// `#(1, 2)`, paired with the module's parameter order.
    Positional(Vec<Expr>),
    /// `#(.A(1), .B(2))`
    Named(Vec<(Ident, Expr)>),
    /// Both styles at once; only malformed input produces this.
    Both {
        /// The positional list.
        positional: Vec<Expr>,
        /// The named list.
        named: Vec<(Ident, Expr)>,
    },
}

/// One port connection of an instantiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConnection {
    /// The port name for `.name(expr)` connections.
    pub name: Option<Ident>,
    /// The connected expression; `None` for an explicitly open port.
    pub expr: Option<Expr>,
}
