use crate::error::Error;
use crate::token::Op;
use crate::util::{factorial, Constant, Function};
use std::fmt::{self, Display, Formatter};

/// Ast nodes for the expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// A numeric literal
    Value(f64),
    /// `pi` or `e`
    Constant(Constant),
    /// fn(<arg>)
    Function(Function, Box<Ast>),
    /// <arg>! or factorial(<arg>)
    Factorial(Box<Ast>),
    /// <left> op <right>
    Binary(Op, Box<Ast>, Box<Ast>),
    /// -<arg>
    Neg(Box<Ast>),
}

impl Ast {
    /// Evaluate the tree. Infinities are ordinary results, but a NaN at any
    /// node stops the evaluation.
    pub fn eval(&self) -> Result<f64, Error> {
        let value = match *self {
            Self::Value(number) => number,
            Self::Constant(constant) => constant.value(),
            Self::Function(func, ref arg) => func.apply(arg.eval()?),
            Self::Factorial(ref arg) => factorial(arg.eval()?)?,
            Self::Binary(op, ref left, ref right) => op.apply(left.eval()?, right.eval()?),
            Self::Neg(ref arg) => -arg.eval()?,
        };
        if value.is_nan() {
            return Err(Error::EvalError("mathematical evaluation failed".into()));
        }
        Ok(value)
    }

    /// Whether the tree uses a named function, a factorial or a named
    /// constant anywhere
    #[must_use]
    pub fn is_scientific(&self) -> bool {
        match *self {
            Self::Value(_) => false,
            Self::Constant(_) | Self::Function(..) | Self::Factorial(_) => true,
            Self::Binary(_, ref left, ref right) => left.is_scientific() || right.is_scientific(),
            Self::Neg(ref arg) => arg.is_scientific(),
        }
    }
}

/// Fully parenthesized rendering, useful to check how an expression was
/// grouped
impl Display for Ast {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match *self {
            Self::Value(number) => write!(fmt, "{}", number),
            Self::Constant(constant) => write!(fmt, "{}", constant.name()),
            Self::Function(func, ref arg) => write!(fmt, "{}({})", func.name(), arg),
            Self::Factorial(ref arg) => write!(fmt, "({})!", arg),
            Self::Binary(op, ref left, ref right) => {
                write!(fmt, "({} {} {})", left, op.symbol(), right)
            }
            Self::Neg(ref arg) => write!(fmt, "-({})", arg),
        }
    }
}
