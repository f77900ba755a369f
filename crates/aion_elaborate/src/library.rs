//! Module library for looking up modules by name and finding the design roots.
//!
//! The [`ModuleLibrary`] indexes every parsed module by interned name and
//! records which modules instantiate which in a [`petgraph`] graph. Modules
//! that nothing instantiates are the default roots. Duplicate module names
//! are detected and reported.

use std::collections::HashMap;

use aion_common::{Ident, Interner, Loc};
use aion_diagnostics::DiagnosticSink;
use aion_pform::{Instantiation, Library, Module};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::errors;

/// Every module available for instantiation.
pub struct ModuleLibrary<'a> {
    /// Modules by name.
    modules: HashMap<Ident, &'a Module>,
    /// Module names in declaration order.
    order: Vec<Ident>,
    /// Instantiation graph; an edge `a -> b` means `a` instantiates `b`.
    graph: DiGraph<Ident, ()>,
    /// Graph node of each module.
    nodes: HashMap<Ident, NodeIndex>,
    /// Location of first declaration for duplicate detection.
    first_loc: HashMap<Ident, Loc>,
}

impl<'a> ModuleLibrary<'a> {
    /// Builds the library from a parsed module list.
    ///
    /// Emits `E301` for every module whose name was already declared; the
    /// first declaration wins.
    pub fn new(library: &'a Library, interner: &Interner, sink: &DiagnosticSink) -> Self {
        let mut lib = Self {
            modules: HashMap::new(),
            order: Vec::new(),
            graph: DiGraph::new(),
            nodes: HashMap::new(),
            first_loc: HashMap::new(),
        };

        for module in &library.modules {
            lib.register(module, interner, sink);
        }

        let registered: Vec<&'a Module> = lib.order.iter().map(|n| lib.modules[n]).collect();
        for module in registered {
            let from = lib.nodes[&module.name];
            for inst in instantiations(module) {
                if let Some(&to) = lib.nodes.get(&inst.module) {
                    lib.graph.update_edge(from, to, ());
                }
            }
        }

        lib
    }

    fn register(&mut self, module: &'a Module, interner: &Interner, sink: &DiagnosticSink) {
        if let Some(prev) = self.first_loc.get(&module.name) {
            sink.emit(errors::error_duplicate_module(
                interner.resolve(module.name),
                module.loc,
                &prev.display(interner),
            ));
            return;
        }
        self.first_loc.insert(module.name, module.loc);
        self.modules.insert(module.name, module);
        self.order.push(module.name);
        let node = self.graph.add_node(module.name);
        self.nodes.insert(module.name, node);
    }

    /// Looks up a module by name.
    pub fn lookup(&self, name: Ident) -> Option<&'a Module> {
        self.modules.get(&name).copied()
    }

    /// Returns the number of distinct modules.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the library holds no modules.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` if `parent` directly instantiates `child`.
    pub fn instantiates(&self, parent: Ident, child: Ident) -> bool {
        match (self.nodes.get(&parent), self.nodes.get(&child)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Picks the root modules of the design.
    ///
    /// If `tops` is non-empty, those modules are the roots and every name that
    /// does not exist is reported with `E302`. Otherwise the roots are the
    /// modules no other module instantiates, in declaration order.
    pub fn roots(&self, tops: &[String], interner: &Interner, sink: &DiagnosticSink) -> Vec<&'a Module> {
        if !tops.is_empty() {
            let mut roots = Vec::new();
            for top in tops {
                match interner.get(top).and_then(|id| self.lookup(id)) {
                    Some(module) => roots.push(module),
                    None => sink.emit(errors::error_root_not_found(top)),
                }
            }
            return roots;
        }

        self.order
            .iter()
            .filter(|name| {
                let node = self.nodes[*name];
                self.graph
                    .neighbors_directed(node, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|name| self.modules[name])
            .collect()
    }
}

/// Iterates over a module's instantiations, including those inside generates.
fn instantiations(module: &Module) -> impl Iterator<Item = &Instantiation> {
    module
        .instances
        .iter()
        .chain(module.generates.iter().flat_map(|g| g.instances.iter()))
}
