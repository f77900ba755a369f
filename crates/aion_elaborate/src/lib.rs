//! Verilog elaboration and constant folding.
//!
//! Turns a [`Library`] of parsed modules into an elaborated [`Design`]: the
//! scope tree of every root and instance, generate loops unrolled, parameter
//! overrides and defparams applied, every parameter folded to a constant,
//! signals declared and continuous assignments width-resolved.
//!
//! Passes run in a fixed order, each stopping the pipeline if it reported
//! errors:
//!
//! 1. scopes ([`scope`]), from each root downwards
//! 2. defparams and parameter evaluation ([`params`])
//! 3. signals ([`signals`])
//! 4. assignments ([`assign`])
//!
//! # Usage
//!
//! ```ignore
//! let design = elaborate(&library, &config, &interner, &sink)?;
//! ```

#![warn(missing_docs)]

pub mod assign;
pub mod context;
pub mod errors;
pub mod eval;
pub mod expr;
pub mod library;
pub mod lookup;
pub mod lval;
pub mod params;
pub mod scope;
pub mod signals;
pub mod width;

#[cfg(test)]
pub(crate) mod testutil;

use aion_common::{AionResult, Interner};
use aion_config::ElabConfig;
use aion_diagnostics::DiagnosticSink;
use aion_netlist::Design;
use aion_pform::Library;

pub use context::{ElaborationContext, GenvarBinding, ScopeSource};
pub use library::ModuleLibrary;
pub use lookup::Symbol;

/// Elaborates `library` into a [`Design`].
///
/// Roots are `config.design.top`, or every module no other module
/// instantiates. User errors go to `sink` and leave a partial design behind;
/// only internal invariant violations return `Err`.
pub fn elaborate(
    library: &Library,
    config: &ElabConfig,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> AionResult<Design> {
    let modules = ModuleLibrary::new(library, interner, sink);
    let mut ctx = ElaborationContext::new(&modules, interner, sink, config);
    run_passes(&mut ctx)?;
    Ok(ctx.design)
}

pub(crate) fn run_passes(ctx: &mut ElaborationContext<'_>) -> AionResult<()> {
    // 1. Design flags
    for (key, value) in &ctx.config.flags {
        ctx.design.set_flag(key.clone(), value.clone());
    }

    // 2. Root scopes and the hierarchy below them
    let roots = ctx
        .library
        .roots(&ctx.config.design.top, ctx.interner, ctx.sink);
    for module in roots {
        let root = ctx.design.make_root_scope(module.name);
        if ctx.config.elaborate.debug_scopes {
            log::debug!("root scope {}", ctx.name(module.name));
        }
        scope::elaborate_module_scope(ctx, module, root, &[])?;
    }
    if ctx.sink.has_errors() {
        return Ok(());
    }

    // 3. Defparams, then every parameter to its final value
    params::run_defparams(ctx);
    params::evaluate_parameters(ctx)?;
    if ctx.sink.has_errors() {
        return Ok(());
    }

    // 4. Nets and variables
    signals::elaborate_signals(ctx)?;
    if ctx.sink.has_errors() {
        return Ok(());
    }

    // 5. Continuous and procedural assignments
    assign::elaborate_assigns(ctx)
}
