use crate::ast::Ast;
use crate::lexer::Lexer;
use crate::outcome::{Evaluation, OperationType};
use crate::parser::Parser;
use crate::Error;

/// Evaluate a single expression from `input`.
///
/// Surrounding whitespace is trimmed, and the trimmed text is what the
/// returned [`Evaluation`] carries. Returns `Err(cause)` if the input is
/// empty, or if lexing, parsing or evaluating the expression failed.
///
/// # Example
///
/// ```
/// # use tally::{evaluate, OperationType};
/// let evaluation = evaluate("  45 - 2^3 ").unwrap();
/// assert_eq!(evaluation.expression, "45 - 2^3");
/// assert_eq!(evaluation.result, 37.0);
/// assert_eq!(evaluation.operation_type, OperationType::Basic);
///
/// let evaluation = evaluate("sqrt(16)").unwrap();
/// assert_eq!(evaluation.operation_type, OperationType::Scientific);
///
/// assert!(evaluate("   ").is_err());
/// ```
pub fn evaluate(input: &str) -> Result<Evaluation, Error> {
    let expression = input.trim();
    if expression.is_empty() {
        return Err(Error::ValidationError("expression cannot be empty".into()));
    }
    let expr = Expr::parse(expression)?;
    Ok(Evaluation {
        expression: expression.to_owned(),
        result: expr.eval()?,
        operation_type: expr.operation_type(),
    })
}

/// A parsed mathematical expression.
///
/// # Examples
/// ```
/// # use tally::{Expr, OperationType};
/// let expr = Expr::parse("3 + 5 * 2").unwrap();
/// assert_eq!(expr.eval(), Ok(13.0));
/// assert_eq!(expr.operation_type(), OperationType::Basic);
///
/// let expr = Expr::parse("-2 * pi").unwrap();
/// assert_eq!(expr.eval(), Ok(-2.0 * std::f64::consts::PI));
/// assert_eq!(expr.operation_type(), OperationType::Scientific);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    ast: Ast,
}

impl Expr {
    /// Parse the given mathematical `expression` into an `Expr`.
    ///
    /// # Examples
    /// ```
    /// # use tally::Expr;
    /// // A valid expression
    /// assert!(Expr::parse("3 + 5 * 2").is_ok());
    /// // an invalid expression
    /// assert!(Expr::parse("3eff + 5 * 2").is_err());
    /// ```
    pub fn parse(expression: &str) -> Result<Self, Error> {
        if expression.trim().is_empty() {
            return Err(Error::ParseError("empty expression".into()));
        }
        let tokens = Lexer::new(expression).tokenize()?;
        let ast = Parser::new(&tokens).parse()?;
        Ok(Self { ast })
    }

    /// Evaluate the expression.
    ///
    /// Division by zero evaluates to an infinity. A NaN anywhere, or a
    /// factorial outside `0..=170`, is an [`Error::EvalError`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use tally::Expr;
    /// assert_eq!(Expr::parse("5/0").unwrap().eval(), Ok(f64::INFINITY));
    /// assert!(Expr::parse("sqrt(-1)").unwrap().eval().is_err());
    /// ```
    pub fn eval(&self) -> Result<f64, Error> {
        self.ast.eval()
    }

    /// `Scientific` if the expression uses a named function, a factorial or
    /// a named constant, `Basic` otherwise
    #[must_use]
    pub fn operation_type(&self) -> OperationType {
        if self.ast.is_scientific() {
            OperationType::Scientific
        } else {
            OperationType::Basic
        }
    }

    /// The parsed tree
    #[must_use]
    pub fn ast(&self) -> &Ast {
        &self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluate, Expr};
    use crate::outcome::OperationType;
    use crate::Error;
    use proptest::prelude::*;
    use std::f64::consts::{E, PI};
    use test_case::test_case;

    const FACTORIAL_RANGE: &str = "factorial only supported for non-negative integers up to 170";

    #[test]
    fn parse() {
        let valid_expressions = [
            "3 + 5",
            "(3 + -5)*45",
            "(3.0 + 5.25)*\t\n45",
            "sin(34.0) ^ sqrt(28.0)",
            "FACTORIAL(4) + 4!",
            "1/(2^2)",
            "ln(e) * log(10) - exp(0)",
        ];
        for expr in &valid_expressions {
            assert!(Expr::parse(expr).is_ok(), "{} should parse", expr);
        }
        assert_eq!(
            Expr::parse(" \t "),
            Err(Error::ParseError("empty expression".into()))
        );
    }

    #[test_case("2+3*4" => (14.0, OperationType::Basic) ; "precedence")]
    #[test_case("(2+3)*4" => (20.0, OperationType::Basic) ; "parentheses")]
    #[test_case("sin(0)" => (0.0, OperationType::Scientific) ; "sine")]
    #[test_case("cos(0)" => (1.0, OperationType::Scientific) ; "cosine")]
    #[test_case("sqrt(16)" => (4.0, OperationType::Scientific) ; "square root")]
    #[test_case("factorial(5)" => (120.0, OperationType::Scientific) ; "function factorial")]
    #[test_case("5!" => (120.0, OperationType::Scientific) ; "postfix factorial")]
    #[test_case("0!" => (1.0, OperationType::Scientific) ; "zero factorial")]
    #[test_case("(2+1)!" => (6.0, OperationType::Scientific) ; "factorial of a group")]
    #[test_case("7^2" => (49.0, OperationType::Basic) ; "square")]
    #[test_case("1/4" => (0.25, OperationType::Basic) ; "reciprocal")]
    #[test_case("-3 - -3" => (0.0, OperationType::Basic) ; "negation")]
    #[test_case("5/0" => (f64::INFINITY, OperationType::Basic) ; "division by zero")]
    #[test_case("-5/0" => (f64::NEG_INFINITY, OperationType::Basic) ; "negative division by zero")]
    #[test_case("exp(1000)" => (f64::INFINITY, OperationType::Scientific) ; "exp overflow")]
    #[test_case("ln(0)" => (f64::NEG_INFINITY, OperationType::Scientific) ; "log of zero")]
    #[test_case("1/0 + 1" => (f64::INFINITY, OperationType::Basic) ; "infinity propagates")]
    fn eval(input: &str) -> (f64, OperationType) {
        let evaluation = evaluate(input).unwrap();
        (evaluation.result, evaluation.operation_type)
    }

    #[test]
    fn constants() {
        let evaluation = evaluate("pi*2").unwrap();
        assert!((evaluation.result - 2.0 * PI).abs() < 1e-10);
        assert_eq!(evaluation.operation_type, OperationType::Scientific);

        let evaluation = evaluate("E").unwrap();
        assert!((evaluation.result - E).abs() < 1e-10);

        assert!((evaluate("ln(e)").unwrap().result - 1.0).abs() < 1e-12);
        assert!((evaluate("log(1000)").unwrap().result - 3.0).abs() < 1e-12);
        assert!((evaluate("tan(pi/4)").unwrap().result - 1.0).abs() < 1e-12);
        assert!(evaluate("sin(pi)").unwrap().result.abs() < 1e-12);
    }

    #[test_case("factorial(-1)" => Error::EvalError(FACTORIAL_RANGE.into()) ; "negative factorial")]
    #[test_case("factorial(200)" => Error::EvalError(FACTORIAL_RANGE.into()) ; "overflowing factorial")]
    #[test_case("171!" => Error::EvalError(FACTORIAL_RANGE.into()) ; "overflowing postfix factorial")]
    #[test_case("2.5!" => Error::EvalError(FACTORIAL_RANGE.into()) ; "fractional factorial")]
    #[test_case("-3!" => Error::EvalError(FACTORIAL_RANGE.into()) ; "factorial of a negation")]
    #[test_case("sqrt(-1)" => Error::EvalError("mathematical evaluation failed".into()) ; "square root of negative")]
    #[test_case("log(-1)" => Error::EvalError("mathematical evaluation failed".into()) ; "log of negative")]
    #[test_case("0/0" => Error::EvalError("mathematical evaluation failed".into()) ; "zero over zero")]
    #[test_case("1/0 - 1/0" => Error::EvalError("mathematical evaluation failed".into()) ; "infinity minus infinity")]
    #[test_case("2 + alert(1)" => Error::LexError("invalid character 'a' at position 4".into()) ; "script injection")]
    #[test_case("   " => Error::ValidationError("expression cannot be empty".into()) ; "whitespace only")]
    #[test_case("" => Error::ValidationError("expression cannot be empty".into()) ; "empty")]
    #[test_case("(1+2" => Error::ParseError("unbalanced parentheses".into()) ; "unbalanced")]
    fn errors(input: &str) -> Error {
        evaluate(input).unwrap_err()
    }

    #[test]
    fn normalized_expression() {
        let evaluation = evaluate("  2 + 3  ").unwrap();
        assert_eq!(evaluation.expression, "2 + 3");
        assert_eq!(evaluation.result, 5.0);
    }

    #[test]
    fn threads() {
        let handles: Vec<_> = (0..8)
            .map(|i| std::thread::spawn(move || evaluate(&format!("factorial({}) / {}", i, i + 1))))
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let expected = (1..=i).map(|k| k as f64).product::<f64>() / (i + 1) as f64;
            assert_eq!(handle.join().unwrap().unwrap().result, expected);
        }
    }

    fn expression() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            (0u32..1000).prop_map(|n| n.to_string()),
            Just("pi".to_string()),
            Just("e".to_string()),
        ];
        leaf.prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{} + {}", a, b)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{} * {}", a, b)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({}) / ({})", a, b)),
                inner.clone().prop_map(|a| format!("sin({})", a)),
                inner.clone().prop_map(|a| format!("sqrt({})", a)),
                inner.prop_map(|a| format!("-({})", a)),
            ]
        })
    }

    proptest! {
        #[test]
        fn deterministic(input in expression()) {
            let first = evaluate(&input);
            let second = evaluate(&input);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn never_nan(input in expression()) {
            if let Ok(evaluation) = evaluate(&input) {
                prop_assert!(!evaluation.result.is_nan());
            }
        }

        #[test]
        fn basic_without_names(a in 0u32..1000, b in 1u32..1000) {
            let evaluation = evaluate(&format!("{} / {} - {}", a, b, a)).unwrap();
            prop_assert_eq!(evaluation.operation_type, OperationType::Basic);
        }
    }
}
