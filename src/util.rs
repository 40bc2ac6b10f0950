use crate::error::Error;
use crate::token::Keyword;
use hashbrown::HashMap;

/// Largest `n` whose factorial is finite in double precision
pub const MAX_FACTORIAL: f64 = 170.0;

/// Unary functions callable as `name(argument)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    /// Sine, radians
    Sin,
    /// Cosine, radians
    Cos,
    /// Tangent, radians
    Tan,
    /// Base-10 logarithm
    Log,
    /// Natural logarithm
    Ln,
    /// `e^x`
    Exp,
    /// Square root
    Sqrt,
}

impl Function {
    /// Canonical lowercase spelling
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Log => "log",
            Self::Ln => "ln",
            Self::Exp => "exp",
            Self::Sqrt => "sqrt",
        }
    }

    /// Apply the function. Domain violations come back as NaN, the caller
    /// decides what to do with them.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sin => libm::sin(x),
            Self::Cos => libm::cos(x),
            Self::Tan => libm::tan(x),
            Self::Log => libm::log10(x),
            Self::Ln => libm::log(x),
            Self::Exp => libm::exp(x),
            Self::Sqrt => libm::sqrt(x),
        }
    }
}

/// Named constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    /// π
    Pi,
    /// Euler's number
    E,
}

impl Constant {
    /// Canonical lowercase spelling
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Pi => "pi",
            Self::E => "e",
        }
    }

    /// Double-precision value
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Self::Pi => std::f64::consts::PI,
            Self::E => std::f64::consts::E,
        }
    }
}

lazy_static! {
    /// Functions available in expressions, by name
    pub static ref FUNCTIONS: HashMap<&'static str, Function> = {
        let functions = [
            Function::Sin,
            Function::Cos,
            Function::Tan,
            Function::Log,
            Function::Ln,
            Function::Exp,
            Function::Sqrt,
        ];
        let mut map = HashMap::with_capacity(functions.len());
        for func in functions {
            map.insert(func.name(), func);
        }
        map
    };

    /// Constants available in expressions, by name
    pub static ref CONSTANTS: HashMap<&'static str, Constant> = {
        let mut map = HashMap::with_capacity(2);
        map.insert(Constant::Pi.name(), Constant::Pi);
        map.insert(Constant::E.name(), Constant::E);
        map
    };

    /// Every recognized identifier, longest spelling first so that a prefix
    /// scan finds the greedy match (`exp` before `e`).
    pub(crate) static ref KEYWORDS: Vec<(&'static str, Keyword)> = {
        let mut keywords: Vec<(&'static str, Keyword)> = FUNCTIONS
            .values()
            .map(|&func| (func.name(), Keyword::Function(func)))
            .chain(CONSTANTS.values().map(|&c| (c.name(), Keyword::Constant(c))))
            .collect();
        keywords.push(("factorial", Keyword::Factorial));
        keywords.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
        keywords
    };
}

/// `n!` for an exact integer `0 <= n <= 170`, computed as the product
/// `2 * 3 * ... * n`.
pub fn factorial(n: f64) -> Result<f64, Error> {
    if !(0.0..=MAX_FACTORIAL).contains(&n) || n.fract() != 0.0 {
        return Err(Error::EvalError(
            "factorial only supported for non-negative integers up to 170".into(),
        ));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = n as u32;
    return Ok((2..=n).fold(1.0, |acc, i| acc * f64::from(i)));
}
