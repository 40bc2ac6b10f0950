use crate::util::{Constant, Function};

/// Possible tokens to find in the input string
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// A numeric literal
    Number(f64),
    /// One of the fixed function or constant names
    Identifier(Keyword),
    /// A binary operator, or `-` used as negation
    Operator(Op),
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
    /// Argument separator. No function takes more than one argument, so the
    /// parser always rejects it.
    Comma,
    /// Postfix factorial
    Bang,
    /// End of input
    End,
}

/// The closed set of names the lexer recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `sin`, `cos`, `tan`, `log`, `ln`, `exp`, `sqrt`
    Function(Function),
    /// `factorial`, the function spelling of `!`
    Factorial,
    /// `pi`, `e`
    Constant(Constant),
}

impl Keyword {
    /// Canonical lowercase spelling
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Function(func) => func.name(),
            Self::Factorial => "factorial",
            Self::Constant(constant) => constant.name(),
        }
    }
}

/// Allowed operators in the algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `^`
    Exp,
}

impl Op {
    /// The character this operator is written with
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Exp => '^',
        }
    }

    /// Apply the operator with IEEE-754 semantics. Division by zero gives an
    /// infinity (or NaN for `0/0`), never a panic.
    #[must_use]
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Self::Plus => left + right,
            Self::Minus => left - right,
            Self::Mul => left * right,
            Self::Div => left / right,
            Self::Exp => libm::pow(left, right),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Self::Number(value) => write!(fmt, "{}", value),
            Self::Identifier(keyword) => write!(fmt, "{}", keyword.name()),
            Self::Operator(op) => write!(fmt, "{}", op.symbol()),
            Self::LParen => write!(fmt, "("),
            Self::RParen => write!(fmt, ")"),
            Self::Comma => write!(fmt, ","),
            Self::Bang => write!(fmt, "!"),
            Self::End => write!(fmt, "end of input"),
        }
    }
}
