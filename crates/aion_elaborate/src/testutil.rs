//! Builders for hand-written parse-form trees used by the unit tests.

use aion_common::{Ident, Interner, Loc, Number};
use aion_config::ElabConfig;
use aion_diagnostics::{Diagnostic, DiagnosticSink};
use aion_netlist::{Design, ScopeId};
use aion_pform::{
    BinaryOp, ContinuousAssign, Expr, Generate, GenerateScheme, IdentExpr, Instantiation,
    Library, Module, NetKind, ParamDecl, ParamOverrides, Range, Select, UnaryOp, WireDecl,
};

use crate::context::ElaborationContext;
use crate::library::ModuleLibrary;

pub(crate) struct Fixture {
    pub interner: Interner,
    pub sink: DiagnosticSink,
    pub config: ElabConfig,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            sink: DiagnosticSink::new(),
            config: ElabConfig::default(),
        }
    }

    pub fn id(&self, s: &str) -> Ident {
        self.interner.get_or_intern(s)
    }

    pub fn name(&self, id: Ident) -> &str {
        self.interner.resolve(id)
    }

    /// An identifier reference; `.` separates hierarchy levels.
    pub fn ident(&self, path: &str) -> Expr {
        self.ident_sel(path, Select::None)
    }

    pub fn ident_sel(&self, path: &str, select: Select) -> Expr {
        Expr::Ident(IdentExpr {
            path: path.split('.').map(|p| self.id(p)).collect(),
            word: None,
            select,
            loc: Loc::DUMMY,
        })
    }

    pub fn bit(&self, path: &str, index: Expr) -> Expr {
        self.ident_sel(path, Select::Bit(Box::new(index)))
    }

    pub fn part(&self, path: &str, msb: i64, lsb: i64) -> Expr {
        self.ident_sel(
            path,
            Select::Part {
                msb: Box::new(num(msb)),
                lsb: Box::new(num(lsb)),
            },
        )
    }

    pub fn module(&self, name: &str) -> Module {
        Module::new(self.id(name), Loc::DUMMY)
    }

    pub fn param(&self, name: &str, expr: Expr) -> ParamDecl {
        ParamDecl {
            name: self.id(name),
            expr,
            range: None,
            signed: false,
            loc: Loc::DUMMY,
        }
    }

    pub fn ranged_param(&self, name: &str, msb: i64, lsb: i64, signed: bool, expr: Expr) -> ParamDecl {
        ParamDecl {
            range: Some(range(msb, lsb)),
            signed,
            ..self.param(name, expr)
        }
    }

    pub fn wire(&self, name: &str, kind: NetKind, bounds: Option<(i64, i64)>) -> WireDecl {
        WireDecl {
            name: self.id(name),
            kind,
            port: None,
            signed: false,
            range: bounds.map(|(m, l)| range(m, l)),
            array: None,
            loc: Loc::DUMMY,
        }
    }

    pub fn instance(&self, module: &str, name: &str) -> Instantiation {
        Instantiation {
            module: self.id(module),
            name: Some(self.id(name)),
            range: None,
            overrides: ParamOverrides::None,
            ports: Vec::new(),
            loc: Loc::DUMMY,
        }
    }

    pub fn assign(&self, lval: Expr, rval: Expr) -> ContinuousAssign {
        ContinuousAssign {
            lval,
            rval,
            loc: Loc::DUMMY,
        }
    }

    /// `for (genvar = init; genvar < limit; genvar = genvar + 1)` around `instances`.
    pub fn counting_loop(&self, block: &str, genvar: &str, init: i64, limit: Expr, instances: Vec<Instantiation>) -> Generate {
        Generate {
            scheme: GenerateScheme::Loop {
                genvar: self.id(genvar),
                init: num(init),
                test: bin(BinaryOp::Lt, self.ident(genvar), limit),
                step: bin(BinaryOp::Add, self.ident(genvar), num(1)),
            },
            name: self.id(block),
            instances,
            loc: Loc::DUMMY,
        }
    }

    /// Runs `f` on a fresh context over `modules`, before any elaboration.
    pub fn with_ctx<R>(&self, modules: Vec<Module>, f: impl FnOnce(&mut ElaborationContext<'_>) -> R) -> R {
        let mut library = Library::new();
        for m in modules {
            library.push(m);
        }
        let lib = ModuleLibrary::new(&library, &self.interner, &self.sink);
        let mut ctx = ElaborationContext::new(&lib, &self.interner, &self.sink, &self.config);
        f(&mut ctx)
    }

    /// Runs `f` on the context after full elaboration, with the first root scope.
    pub fn with_elaborated<R>(
        &self,
        modules: Vec<Module>,
        f: impl FnOnce(&mut ElaborationContext<'_>, ScopeId) -> R,
    ) -> R {
        self.with_ctx(modules, |ctx| {
            crate::run_passes(ctx).expect("no internal error");
            let root = ctx.design.roots[0];
            f(ctx, root)
        })
    }

    pub fn elaborate(&self, modules: Vec<Module>) -> Design {
        let mut library = Library::new();
        for m in modules {
            library.push(m);
        }
        crate::elaborate(&library, &self.config, &self.interner, &self.sink).expect("no internal error")
    }

    /// Finds a scope by dotted path.
    pub fn scope(&self, design: &Design, path: &str) -> ScopeId {
        let path: Vec<Ident> = path.split('.').map(|p| self.id(p)).collect();
        crate::lookup::find_scope(design, &path).unwrap_or_else(|| panic!("no scope {path:?}"))
    }

    pub fn messages(&self) -> Vec<String> {
        self.sink.diagnostics().iter().map(|d: &Diagnostic| d.message.clone()).collect()
    }
}

pub(crate) fn num(v: i64) -> Expr {
    Expr::Number {
        value: Number::from_i64(v),
        loc: Loc::DUMMY,
    }
}

pub(crate) fn sized(width: u32, v: u64) -> Expr {
    Expr::Number {
        value: Number::from_u64(v, width),
        loc: Loc::DUMMY,
    }
}

/// A sized unsigned literal from binary digits, e.g. `"1x0"`.
pub(crate) fn bits(digits: &str) -> Expr {
    Expr::Number {
        value: Number::from_binary_str(digits).expect("binary digits"),
        loc: Loc::DUMMY,
    }
}

pub(crate) fn real(v: f64) -> Expr {
    Expr::Real {
        value: v,
        loc: Loc::DUMMY,
    }
}

pub(crate) fn bin(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        loc: Loc::DUMMY,
    }
}

pub(crate) fn un(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
        loc: Loc::DUMMY,
    }
}

pub(crate) fn tern(cond: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
    Expr::Ternary {
        cond: Box::new(cond),
        then_expr: Box::new(then_expr),
        else_expr: Box::new(else_expr),
        loc: Loc::DUMMY,
    }
}

pub(crate) fn concat(parts: Vec<Expr>, repeat: Option<Expr>) -> Expr {
    Expr::Concat {
        parts,
        repeat: repeat.map(Box::new),
        loc: Loc::DUMMY,
    }
}

pub(crate) fn range(msb: i64, lsb: i64) -> Range {
    Range {
        msb: num(msb),
        lsb: num(lsb),
    }
}
