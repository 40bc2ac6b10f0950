#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(
    clippy::needless_return,
    clippy::missing_docs_in_private_items,
    clippy::non_ascii_literal,
    clippy::missing_errors_doc
)]

//! Tally, the engine behind a scientific calculator.
//!
//! This crate evaluates the expressions a calculator keypad produces and
//! keeps a history of them. The easiest way to use this crate is with the
//! [`evaluate`](fn.evaluate.html) function:
//!
//! ```
//! use tally::OperationType;
//!
//! let evaluation = tally::evaluate("3 + 5 * 2").unwrap();
//! assert_eq!(evaluation.result, 13.0);
//! assert_eq!(evaluation.operation_type, OperationType::Basic);
//! ```
//!
//! Expressions using a named function, a factorial or a named constant are
//! classified as scientific:
//!
//! ```
//! use tally::OperationType;
//!
//! let evaluation = tally::evaluate("factorial(5) + 5!").unwrap();
//! assert_eq!(evaluation.result, 240.0);
//! assert_eq!(evaluation.operation_type, OperationType::Scientific);
//! ```
//!
//! It is also possible to separate the parsing from the evaluation of an
//! expression with the [`Expr`](struct.Expr.html) type.
//!
//! ```
//! use tally::Expr;
//!
//! let expr = Expr::parse("sqrt(16) / 0").unwrap();
//! assert_eq!(expr.eval(), Ok(f64::INFINITY));
//! ```
//!
//! # Language definition
//!
//! The language implemented by tally is closed, and can contain the
//! following elements:
//!
//! - decimal literals: `12`, `0.5`. Digits are required before the point,
//!   there is no exponent notation and no leading `+`;
//! - left and right parenthesis;
//! - mathematical operators: `+` for addition, `-` for subtraction and
//!   negation, `*` for multiplication, `/` for division and `^` for
//!   exponentiation;
//! - postfix `!` for the factorial;
//! - function calls with exactly one argument: `sin`, `cos`, `tan`
//!   (radians), `log` (base 10), `ln`, `exp`, `sqrt` and `factorial`;
//! - the constants `pi` and `e`.
//!
//! Names are case insensitive. Any other symbol is forbidden in the input.
//!
//! # Numeric behavior
//!
//! Everything is computed with `f64`. Division by zero gives an infinity,
//! which is a valid result. A NaN is never returned: an expression
//! producing one, like `sqrt(-1)` or `0/0`, fails with
//! [`Error::EvalError`]. The factorial is defined for the integers `0` to
//! `170`, the largest one with a finite result.
//!
//! # Technical details
//!
//! tally is based on an AST interpreter. A hand written lexer feeds a
//! recursive descent parser, and the resulting tree is walked once to
//! compute the result. There is no path from the input to anything but
//! arithmetic.
//!
//! The [`store`] and [`gateway`] modules provide the calculation history
//! and a line-delimited JSON request interface around the evaluator.

#[macro_use]
extern crate lazy_static;

mod ast;
pub mod config;
mod error;
mod expr;
pub mod gateway;
mod lexer;
mod outcome;
mod parser;
pub mod store;
mod token;
mod util;

pub use ast::Ast;
pub use config::Config;
pub use error::Error;
pub use expr::{evaluate, Expr};
pub use gateway::{Gateway, Request, Response};
pub use lexer::{tokenize, Lexer};
pub use outcome::{number, Evaluation, OperationType};
pub use parser::{parse, Parser, MAX_DEPTH};
pub use store::{Calculation, CalculationStore, HistoryQuery, MemoryStore, NewCalculation};
pub use token::{Keyword, Op, Token};
pub use util::{factorial, Constant, Function, CONSTANTS, FUNCTIONS, MAX_FACTORIAL};
