//! Operators
//!
//! Arithmetic, unary, comparison and boolean operators. Precedence values
//! are shared by the parser and the un-parser, so they are defined once here.
//!
//! Higher number = binds more tightly.

/// Arithmetic binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Pow => "**",
        }
    }

    /// Precedence level (see [`Precedence`]).
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => Precedence::ADDITIVE,
            Self::Mul | Self::Div | Self::FloorDiv | Self::Mod => Precedence::MULTIPLICATIVE,
            Self::Pow => Precedence::POWER,
        }
    }

    /// Whether the operator groups right-to-left (`2 ** 3 ** 2`).
    pub const fn is_right_assoc(self) -> bool {
        matches!(self, Self::Pow)
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

impl UnaryOp {
    /// Symbol as written in source. `not` needs a trailing space when printed.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Pos => "+",
            Self::Not => "not",
        }
    }

    pub const fn precedence(self) -> u8 {
        match self {
            Self::Not => Precedence::NOT,
            Self::Neg | Self::Pos => Precedence::UNARY,
        }
    }
}

/// Comparison operators. Comparisons chain: `a < b < c`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    NotIn,
    Is,
    IsNot,
}

impl CmpOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Is => "is",
            Self::IsNot => "is not",
        }
    }
}

/// Short-circuiting boolean operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }

    pub const fn precedence(self) -> u8 {
        match self {
            Self::And => Precedence::AND,
            Self::Or => Precedence::OR,
        }
    }
}

/// Expression precedence levels.
pub struct Precedence;

impl Precedence {
    pub const LAMBDA: u8 = 1;
    pub const TERNARY: u8 = 2;
    pub const OR: u8 = 3;
    pub const AND: u8 = 4;
    pub const NOT: u8 = 5;
    pub const COMPARE: u8 = 6;
    pub const ADDITIVE: u8 = 10;
    pub const MULTIPLICATIVE: u8 = 11;
    pub const UNARY: u8 = 12;
    pub const POWER: u8 = 13;
    pub const ATOM: u8 = 16;
}
