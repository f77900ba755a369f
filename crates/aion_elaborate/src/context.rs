//! Elaboration context shared across all elaboration passes.
//!
//! [`ElaborationContext`] bundles the design under construction, the module
//! library, the interner and the diagnostic sink. It also remembers which
//! parse-form declaration produced each scope so the later signal and
//! assignment passes can revisit it, and carries the genvar binding of the
//! generate loop being unrolled.

use crate::library::ModuleLibrary;
use aion_common::{Ident, Interner};
use aion_config::ElabConfig;
use aion_diagnostics::DiagnosticSink;
use aion_netlist::{Design, ScopeId};
use aion_pform::{Function, Module, Task, WireDecl};
use std::collections::HashMap;

/// The parse-form construct a scope was created from.
#[derive(Clone, Copy, Debug)]
pub enum ScopeSource<'a> {
    /// A root module or a module instance.
    Module(&'a Module),
    /// A task definition.
    Task(&'a Task),
    /// A function definition.
    Function(&'a Function),
    /// A named block and its local declarations.
    Block(&'a [WireDecl]),
}

/// The current value of a generate loop variable.
///
/// The binding is only visible to lookups made directly in `scope`, the
/// scope containing the loop. Generated blocks see the value through the
/// localparam installed in each of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenvarBinding {
    /// The scope containing the generate loop.
    pub scope: ScopeId,
    /// The genvar name.
    pub name: Ident,
    /// The value for the current iteration.
    pub value: i64,
}

/// Shared state threaded through elaboration.
pub struct ElaborationContext<'a> {
    /// The design being built.
    pub design: Design,
    /// All modules available for instantiation.
    pub library: &'a ModuleLibrary<'a>,
    /// The string interner.
    pub interner: &'a Interner,
    /// Where diagnostics go.
    pub sink: &'a DiagnosticSink,
    /// Elaboration settings.
    pub config: &'a ElabConfig,
    /// The genvar of the generate loop being unrolled, if any.
    pub genvar: Option<GenvarBinding>,
    sources: HashMap<ScopeId, ScopeSource<'a>>,
}

impl<'a> ElaborationContext<'a> {
    /// Creates a context with an empty design.
    pub fn new(
        library: &'a ModuleLibrary<'a>,
        interner: &'a Interner,
        sink: &'a DiagnosticSink,
        config: &'a ElabConfig,
    ) -> Self {
        Self {
            design: Design::new(),
            library,
            interner,
            sink,
            config,
            genvar: None,
            sources: HashMap::new(),
        }
    }

    /// Records the declaration a scope was created from.
    pub fn record_source(&mut self, scope: ScopeId, source: ScopeSource<'a>) {
        self.sources.insert(scope, source);
    }

    /// Returns the declaration a scope was created from.
    pub fn source(&self, scope: ScopeId) -> Option<ScopeSource<'a>> {
        self.sources.get(&scope).copied()
    }

    /// Returns every recorded scope with its declaration, in creation order.
    pub fn sources(&self) -> Vec<(ScopeId, ScopeSource<'a>)> {
        let mut out: Vec<_> = self.sources.iter().map(|(&id, &src)| (id, src)).collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }

    /// Returns the genvar value visible from `scope` under `name`.
    pub fn genvar_value(&self, scope: ScopeId, name: Ident) -> Option<i64> {
        self.genvar
            .filter(|g| g.scope == scope && g.name == name)
            .map(|g| g.value)
    }

    /// Resolves an identifier to its string.
    pub fn name(&self, ident: Ident) -> &'a str {
        self.interner.resolve(ident)
    }

    /// Returns the dotted hierarchical name of a scope.
    pub fn scope_name(&self, scope: ScopeId) -> String {
        self.interner.join_path(&self.design.scope_path(scope))
    }
}
