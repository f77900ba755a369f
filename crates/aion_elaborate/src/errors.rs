//! Diagnostic codes and helper functions for elaboration errors and warnings.
//!
//! Error codes `E300`--`E317` cover bad source input (unknown modules,
//! unresolvable names, non-constant bounds, recursive instantiation).
//! `S300`--`S301` cover recognized but unsupported constructs. Warning codes
//! `W300`--`W303` cover overrides that could not be applied and constant
//! selects outside the declared range.

use aion_common::Loc;
use aion_diagnostics::{Category, Diagnostic, DiagnosticCode};

/// Instantiation of a module that is not in the library.
pub const E300: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 300,
};

/// Two modules with the same name.
pub const E301: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 301,
};

/// A configured root module does not exist.
pub const E302: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 302,
};

/// Module instantiation without an instance name.
pub const E303: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 303,
};

/// A scope name is already taken in the enclosing scope.
pub const E304: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 304,
};

/// A module instantiates itself, directly or through its instances.
pub const E305: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 305,
};

/// An identifier does not resolve to anything.
pub const E306: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 306,
};

/// A constant is required but the expression does not fold.
pub const E307: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 307,
};

/// A parameter's value depends on itself.
pub const E308: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 308,
};

/// A generate loop runs past the configured iteration limit.
pub const E309: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 309,
};

/// A name is declared twice in one scope.
pub const E310: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 310,
};

/// An expression cannot be assigned to.
pub const E311: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 311,
};

/// A select applied to something that cannot be indexed.
pub const E312: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 312,
};

/// An event expression or named event used as a value.
pub const E313: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 313,
};

/// A called function does not exist.
pub const E314: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 314,
};

/// An unsized constant inside a concatenation.
pub const E315: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 315,
};

/// A parameter expression references something other than a parameter.
pub const E316: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 316,
};

/// A range, select or replication too wide to represent.
pub const E317: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 317,
};

/// Generate schemes other than loops.
pub const S300: DiagnosticCode = DiagnosticCode {
    category: Category::Unsupported,
    number: 300,
};

/// Function calls inside constant expressions.
pub const S301: DiagnosticCode = DiagnosticCode {
    category: Category::Unsupported,
    number: 301,
};

/// An instance parameter override names no parameter of the module.
pub const W300: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 300,
};

/// A defparam's target scope does not exist.
pub const W301: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 301,
};

/// A defparam targets a localparam.
pub const W302: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 302,
};

/// A constant select lies outside the declared range.
pub const W303: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 303,
};

/// Creates a diagnostic for an unknown module in an instantiation.
pub fn error_unknown_module(name: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(E300, format!("Unknown module type: {name}"), loc)
}

/// Creates a diagnostic for a duplicate module name.
pub fn error_duplicate_module(name: &str, loc: Loc, prev: &str) -> Diagnostic {
    Diagnostic::error(E301, format!("Module {name} was already declared."), loc)
        .with_note(format!("The previous declaration is at {prev}."))
}

/// Creates a diagnostic for a configured root module that does not exist.
pub fn error_root_not_found(name: &str) -> Diagnostic {
    Diagnostic::error(E302, format!("Unable to find the root module \"{name}\" in the design."), Loc::DUMMY)
}

/// Creates a diagnostic for an instantiation without an instance name.
pub fn error_missing_instance_name(module: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(
        E303,
        format!("Instantiation of module {module} requires an instance name."),
        loc,
    )
}

/// Creates a diagnostic for a scope name that is already used.
pub fn error_duplicate_scope(name: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(
        E304,
        format!("Instance/Scope name {name} already used in this context."),
        loc,
    )
}

/// Creates a diagnostic for a module that instantiates itself.
pub fn error_recursive_instance(module: &str, instance: &str, ancestor: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(
        E305,
        format!("You cannot instantiate module {module} within itself."),
        loc,
    )
    .with_note(format!("The offending instance is {instance} within {ancestor}."))
}

/// Creates a diagnostic for an identifier that resolves to nothing.
pub fn error_unbound(name: &str, scope: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(
        E306,
        format!("Unable to bind wire/reg/memory `{name}' in `{scope}'"),
        loc,
    )
}

/// Creates a diagnostic for an expression that must be constant but is not.
pub fn error_not_constant(what: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(E307, format!("Unable to evaluate {what}."), loc)
}

/// Creates a diagnostic for a parameter that depends on itself.
pub fn error_circular_param(name: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(
        E308,
        format!("Parameter {name} depends on its own value."),
        loc,
    )
}

/// Creates a diagnostic for a generate loop that does not terminate.
pub fn error_generate_limit(name: &str, limit: u32, loc: Loc) -> Diagnostic {
    Diagnostic::error(
        E309,
        format!("Generate loop {name} exceeds {limit} iterations."),
        loc,
    )
    .with_note("Raise elaborate.max_generate_iterations if the loop is intended.")
}

/// Creates a diagnostic for a name declared twice in a scope.
pub fn error_duplicate_decl(name: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(
        E310,
        format!("{name} has already been declared in this scope."),
        loc,
    )
}

/// Creates a diagnostic for an invalid assignment target.
pub fn error_bad_lval(what: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(E311, what.to_string(), loc)
}

/// Creates a diagnostic for a select on something that cannot be indexed.
pub fn error_bad_select(what: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(E312, what.to_string(), loc)
}

/// Creates a diagnostic for an event used as a value.
pub fn error_event_expr(loc: Loc) -> Diagnostic {
    Diagnostic::error(
        E313,
        "Event expressions are not allowed in this context.",
        loc,
    )
}

/// Creates a diagnostic for an unknown function.
pub fn error_unknown_function(name: &str, scope: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(
        E314,
        format!("No function named `{name}' found in this context ({scope})."),
        loc,
    )
}

/// Creates a diagnostic for an unsized constant in a concatenation.
pub fn error_unsized_concat(value: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(
        E315,
        format!("Concatenation operand \"{value}\" has indefinite width."),
        loc,
    )
}

/// Creates a diagnostic for a parameter expression that references a non-parameter.
pub fn error_not_a_param(name: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(
        E316,
        format!("Identifier {name} in a parameter expression is not a parameter."),
        loc,
    )
}

/// Creates a diagnostic for a width that does not fit in 32 bits.
pub fn error_too_wide(what: &str, loc: Loc) -> Diagnostic {
    Diagnostic::error(E317, format!("The {what} is too wide."), loc)
}

/// Creates a diagnostic for an unsupported generate scheme.
pub fn sorry_generate_scheme(loc: Loc) -> Diagnostic {
    Diagnostic::sorry(
        S300,
        "Generate schemes other than loops are not supported.",
        loc,
    )
}

/// Creates a diagnostic for a function call in a constant expression.
pub fn sorry_constant_call(name: &str, loc: Loc) -> Diagnostic {
    Diagnostic::sorry(
        S301,
        format!("Function call {name} in a constant expression is not supported."),
        loc,
    )
}

/// Creates a warning for an override naming no parameter.
pub fn warning_param_not_found(name: &str, scope: &str, loc: Loc) -> Diagnostic {
    Diagnostic::warning(W300, format!("parameter {name} not found in {scope}."), loc)
}

/// Creates a warning for a defparam whose target scope does not exist.
pub fn warning_defparam_scope(path: &str, loc: Loc) -> Diagnostic {
    Diagnostic::warning(W301, format!("Cannot find scope {path} for defparam."), loc)
}

/// Creates a warning for a defparam targeting a localparam.
pub fn warning_defparam_local(name: &str, loc: Loc) -> Diagnostic {
    Diagnostic::warning(
        W302,
        format!("defparam cannot override localparam {name}; ignored."),
        loc,
    )
}

/// Creates a warning for a constant select outside the declared range.
pub fn warning_select_range(name: &str, index: i64, loc: Loc) -> Diagnostic {
    Diagnostic::warning(
        W303,
        format!("Constant bit select [{index}] is outside the range of {name}."),
        loc,
    )
}
