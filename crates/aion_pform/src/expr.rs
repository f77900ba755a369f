//! Expression nodes.

use aion_common::{Ident, Loc, Number};
use serde::{Deserialize, Serialize};

/// A dotted hierarchical name such as `top.u1.WIDTH`; a plain name has one component.
pub type HierName = Vec<Ident>;

/// A parse-form expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// A concatenation `{a, b}` or replication `{n{a, b}}`.
    Concat {
        /// The parts, most significant first.
        parts: Vec<Expr>,
        /// The replication count, if any.
        repeat: Option<Box<Expr>>,
        /// Source location.
        loc: Loc,
    },
    /// An event expression such as `posedge clk`.
    Event {
        /// The edge qualifier.
        edge: EdgeKind,
        /// The watched expression.
        expr: Box<Expr>,
        /// Source location.
        loc: Loc,
    },
    /// A real literal.
    Real {
        /// The literal value.
        value: f64,
        /// Source location.
        loc: Loc,
    },
    /// An identifier reference with optional word index and bit/part select.
    Ident(IdentExpr),
    /// An integer literal, sized or unsized.
    Number {
        /// The literal value.
        value: Number,
        /// Source location.
        loc: Loc,
    },
    /// A string literal.
    String {
        /// The literal text, without quotes.
        value: String,
        /// Source location.
        loc: Loc,
    },
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
        /// Source location.
        loc: Loc,
    },
    /// A binary operation, including comparisons and shifts.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
        /// Source location.
        loc: Loc,
    },
    /// A conditional `cond ? then_expr : else_expr`.
    Ternary {
        /// The condition.
        cond: Box<Expr>,
        /// The value when the condition is true.
        then_expr: Box<Expr>,
        /// The value when the condition is false.
        else_expr: Box<Expr>,
        /// Source location.
        loc: Loc,
    },
    /// A user function call or a system function call (`$clog2`).
    Call {
        /// The function name; system names keep their leading `$`.
        name: HierName,
        /// The arguments.
        args: Vec<Expr>,
        /// `true` for system functions.
        system: bool,
        /// Source location.
        loc: Loc,
    },
}

impl Expr {
    /// Returns the source location of this expression.
    pub fn loc(&self) -> Loc {
        match self {
            Expr::Ident(ident) => ident.loc,
            Expr::Concat { loc, .. }
            | Expr::Event { loc, .. }
            | Expr::Real { loc, .. }
            | Expr::Number { loc, .. }
            | Expr::String { loc, .. }
            | Expr::Unary { loc, .. }
            | Expr::Binary { loc, .. }
            | Expr::Ternary { loc, .. }
            | Expr::Call { loc, .. } => *loc,
        }
    }
}

/// An identifier reference: `path`, `path[word]`, `path[msb:lsb]`, ...
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentExpr {
    /// The referenced name.
    pub path: HierName,
    /// Word index into a memory, applied before `select`.
    pub word: Option<Box<Expr>>,
    /// The bit or part select.
    pub select: Select,
    /// Source location.
    pub loc: Loc,
}

impl IdentExpr {
    /// Returns `true` if the identifier carries a word index or a select.
    pub fn is_indexed(&self) -> bool {
        self.word.is_some() || !matches!(self.select, Select::None)
    }
}

/// The select suffix of an identifier reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Select {
    /// No select.
    None,
    /// `[index]`
    Bit(Box<Expr>),
    /// `[msb:lsb]`
    Part {
        /// Most significant bound.
        msb: Box<Expr>,
        /// Least significant bound.
        lsb: Box<Expr>,
    },
    /// `[base +: width]`
    IndexedUp {
        /// Lowest selected index.
        base: Box<Expr>,
        /// Number of bits; must be constant.
        width: Box<Expr>,
    },
    /// `[base -: width]`
    IndexedDown {
        /// Highest selected index.
        base: Box<Expr>,
        /// Number of bits; must be constant.
        width: Box<Expr>,
    },
}

/// Edge qualifier of an event expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Any change.
    Any,
    /// `posedge`
    Posedge,
    /// `negedge`
    Negedge,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `+` (unary plus)
    Plus,
    /// `-` (unary minus)
    Minus,
    /// `!` (logical NOT)
    LogNot,
    /// `~` (bitwise NOT)
    BitNot,
    /// `&` (reduction AND)
    RedAnd,
    /// `~&` (reduction NAND)
    RedNand,
    /// `|` (reduction OR)
    RedOr,
    /// `~|` (reduction NOR)
    RedNor,
    /// `^` (reduction XOR)
    RedXor,
    /// `~^` or `^~` (reduction XNOR)
    RedXnor,
}

impl UnaryOp {
    /// Returns `true` for operators with a 1-bit result.
    pub fn is_reduction(self) -> bool {
        !matches!(self, UnaryOp::Plus | UnaryOp::Minus | UnaryOp::BitNot)
    }

    /// Returns the source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::LogNot => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::RedAnd => "&",
            UnaryOp::RedNand => "~&",
            UnaryOp::RedOr => "|",
            UnaryOp::RedNor => "~|",
            UnaryOp::RedXor => "^",
            UnaryOp::RedXnor => "~^",
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `==`
    Eq,
    /// `!=`
    Neq,
    /// `===`
    CaseEq,
    /// `!==`
    CaseNeq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&`
    LogAnd,
    /// `||`
    LogOr,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `~^` or `^~`
    BitXnor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `<<<`
    AShl,
    /// `>>>`
    AShr,
}

impl BinaryOp {
    /// Returns `true` for the relational and equality operators.
    pub fn is_compare(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Neq
                | BinaryOp::CaseEq
                | BinaryOp::CaseNeq
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
        )
    }

    /// Returns `true` for `&&` and `||`.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::LogAnd | BinaryOp::LogOr)
    }

    /// Returns `true` for the four shift operators.
    pub fn is_shift(self) -> bool {
        matches!(
            self,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::AShl | BinaryOp::AShr
        )
    }

    /// Returns the source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::CaseEq => "===",
            BinaryOp::CaseNeq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::LogAnd => "&&",
            BinaryOp::LogOr => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitXnor => "~^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::AShl => "<<<",
            BinaryOp::AShr => ">>>",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_common::Interner;

    fn at(line: u32) -> Loc {
        Loc::new(Ident::from_raw(0), line)
    }

    #[test]
    fn loc_of_every_shape() {
        let interner = Interner::new();
        let a = interner.get_or_intern("a");
        let ident = Expr::Ident(IdentExpr {
            path: vec![a],
            word: None,
            select: Select::None,
            loc: at(3),
        });
        assert_eq!(ident.loc(), at(3));
        let sum = Expr::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(ident),
            rhs: Box::new(Expr::Number {
                value: Number::from_i64(1),
                loc: at(4),
            }),
            loc: at(5),
        };
        assert_eq!(sum.loc(), at(5));
    }

    #[test]
    fn operator_classes() {
        assert!(BinaryOp::Le.is_compare());
        assert!(BinaryOp::CaseNeq.is_compare());
        assert!(!BinaryOp::LogAnd.is_compare());
        assert!(BinaryOp::LogOr.is_logical());
        assert!(BinaryOp::AShr.is_shift());
        assert!(!BinaryOp::Pow.is_shift());
        assert!(UnaryOp::RedXnor.is_reduction());
        assert!(UnaryOp::LogNot.is_reduction());
        assert!(!UnaryOp::BitNot.is_reduction());
        assert_eq!(BinaryOp::AShl.symbol(), "<<<");
    }

    #[test]
    fn indexed_identifier() {
        let plain = IdentExpr {
            path: vec![Ident::from_raw(1)],
            word: None,
            select: Select::None,
            loc: Loc::DUMMY,
        };
        assert!(!plain.is_indexed());
        let bit = IdentExpr {
            select: Select::Bit(Box::new(Expr::Number {
                value: Number::from_i64(0),
                loc: Loc::DUMMY,
            })),
            ..plain
        };
        assert!(bit.is_indexed());
    }

    #[test]
    fn serde_roundtrip() {
        let expr = Expr::Ternary {
            cond: Box::new(Expr::Number {
                value: Number::from_binary_str("x").unwrap(),
                loc: at(1),
            }),
            then_expr: Box::new(Expr::String {
                value: "hi".to_string(),
                loc: at(1),
            }),
            else_expr: Box::new(Expr::Real {
                value: 2.5,
                loc: at(1),
            }),
            loc: at(1),
        };
        let json = serde_json::to_string(&expr).unwrap();
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(back.loc(), at(1));
        assert!(matches!(back, Expr::Ternary { .. }));
    }
}
