use crate::ast::Ast;
use crate::error::Error;
use crate::token::{Keyword, Op, Token};

/// Deepest tree the parser builds. Parentheses, calls, negations and each
/// operator of a chain all count one level.
pub const MAX_DEPTH: usize = 256;

/// Build the AST for `tokens`, as produced by [`tokenize`](fn.tokenize.html).
///
/// # Examples
///
/// ```
/// # use tally::{parse, tokenize};
/// let ast = parse(&tokenize("2 + 3 * 4").unwrap()).unwrap();
/// assert_eq!(ast.to_string(), "(2 + (3 * 4))");
/// ```
pub fn parse(tokens: &[Token]) -> Result<Ast, Error> {
    Parser::new(tokens).parse()
}

/// Recursive descent parser over a token slice.
///
/// ```text
/// expr     := term (('+'|'-') term)*
/// term     := factor (('*'|'/') factor)*
/// factor   := postfix ('^' postfix)*
/// postfix  := unary ('!')*
/// unary    := '-' unary | primary
/// primary  := number | constant | funcall | '(' expr ')'
/// funcall  := FUNCNAME '(' expr ')'
/// ```
pub struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    depth: usize,
    // parentheses opened and not yet closed
    open: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser at the start of `tokens`
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Parser<'a> {
        Parser {
            tokens,
            position: 0,
            depth: 0,
            open: 0,
        }
    }

    /// Parse a complete expression, which must consume every token
    pub fn parse(&mut self) -> Result<Ast, Error> {
        if self.peek() == Token::End {
            return Err(Error::ParseError("empty expression".into()));
        }
        let ast = self.expr()?;
        match self.peek() {
            Token::End => Ok(ast),
            Token::RParen => Err(unbalanced()),
            _ => Err(Error::ParseError("unexpected trailing input".into())),
        }
    }

    /// A missing trailing `End` reads as if it were there
    fn peek(&self) -> Token {
        self.tokens.get(self.position).copied().unwrap_or(Token::End)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek();
        if token != Token::End {
            self.position += 1;
        }
        token
    }

    /// Consume the next token if it is one of `ops`
    fn operator(&mut self, ops: &[Op]) -> Option<Op> {
        match self.peek() {
            Token::Operator(op) if ops.contains(&op) => {
                self.position += 1;
                Some(op)
            }
            _ => None,
        }
    }

    /// Go one level deeper, failing past [`MAX_DEPTH`]. Both the recursion
    /// here and the evaluation and drop of the tree are bounded by it.
    fn descend(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::ParseError("expression nested too deeply".into()));
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth -= levels;
    }

    /// `next (op next)*`, folded left
    fn chain(
        &mut self,
        ops: &[Op],
        next: fn(&mut Self) -> Result<Ast, Error>,
    ) -> Result<Ast, Error> {
        let mut left = next(self)?;
        let mut levels = 0;
        while let Some(op) = self.operator(ops) {
            self.descend()?;
            levels += 1;
            let right = next(self)?;
            left = Ast::Binary(op, Box::new(left), Box::new(right));
        }
        self.ascend(levels);
        Ok(left)
    }

    fn expr(&mut self) -> Result<Ast, Error> {
        self.chain(&[Op::Plus, Op::Minus], Self::term)
    }

    fn term(&mut self) -> Result<Ast, Error> {
        self.chain(&[Op::Mul, Op::Div], Self::factor)
    }

    fn factor(&mut self) -> Result<Ast, Error> {
        self.chain(&[Op::Exp], Self::postfix)
    }

    fn postfix(&mut self) -> Result<Ast, Error> {
        let mut ast = self.unary()?;
        let mut levels = 0;
        while self.peek() == Token::Bang {
            self.advance();
            self.descend()?;
            levels += 1;
            ast = Ast::Factorial(Box::new(ast));
        }
        self.ascend(levels);
        Ok(ast)
    }

    fn unary(&mut self) -> Result<Ast, Error> {
        if self.operator(&[Op::Minus]).is_some() {
            self.descend()?;
            let arg = self.unary()?;
            self.ascend(1);
            return Ok(Ast::Neg(Box::new(arg)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Ast, Error> {
        match self.advance() {
            Token::Number(value) => Ok(Ast::Value(value)),
            Token::Identifier(Keyword::Constant(constant)) => Ok(Ast::Constant(constant)),
            Token::Identifier(Keyword::Function(func)) => {
                let arg = self.call_argument(func.name())?;
                Ok(Ast::Function(func, Box::new(arg)))
            }
            Token::Identifier(Keyword::Factorial) => {
                let arg = self.call_argument("factorial")?;
                Ok(Ast::Factorial(Box::new(arg)))
            }
            Token::LParen => self.group(),
            Token::RParen => {
                if self.open > 0 {
                    Err(missing_operand())
                } else {
                    Err(unbalanced())
                }
            }
            Token::Comma => Err(Error::ParseError("unexpected ','".into())),
            Token::Operator(_) | Token::Bang | Token::End => Err(missing_operand()),
        }
    }

    /// `'(' expr ')'` after a function name
    fn call_argument(&mut self, name: &str) -> Result<Ast, Error> {
        if self.advance() != Token::LParen {
            return Err(Error::ParseError(format!("expected '(' after {}", name)));
        }
        self.group()
    }

    /// `expr ')'`, the `(` being already consumed
    fn group(&mut self) -> Result<Ast, Error> {
        self.descend()?;
        self.open += 1;
        let ast = self.expr()?;
        self.close()?;
        self.ascend(1);
        Ok(ast)
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.advance() {
            Token::RParen => {
                self.open -= 1;
                Ok(())
            }
            Token::End => Err(unbalanced()),
            Token::Comma => Err(Error::ParseError("unexpected ','".into())),
            _ => Err(Error::ParseError("unexpected trailing input".into())),
        }
    }
}

fn unbalanced() -> Error {
    Error::ParseError("unbalanced parentheses".into())
}

fn missing_operand() -> Error {
    Error::ParseError("missing operand".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use test_case::test_case;

    fn grouping(input: &str) -> Result<String, Error> {
        parse(&tokenize(input)?).map(|ast| ast.to_string())
    }

    #[test_case("2+3*4" => Ok("(2 + (3 * 4))".to_string()) ; "product binds tighter than sum")]
    #[test_case("(2+3)*4" => Ok("((2 + 3) * 4)".to_string()) ; "parentheses group")]
    #[test_case("8-3-2" => Ok("((8 - 3) - 2)".to_string()) ; "subtraction is left associative")]
    #[test_case("8/4/2" => Ok("((8 / 4) / 2)".to_string()) ; "division is left associative")]
    #[test_case("2*3^2" => Ok("(2 * (3 ^ 2))".to_string()) ; "power binds tighter than product")]
    #[test_case("2^3^2" => Ok("((2 ^ 3) ^ 2)".to_string()) ; "power folds left")]
    #[test_case("-2^2" => Ok("(-(2) ^ 2)".to_string()) ; "negation binds tighter than power")]
    #[test_case("--3" => Ok("-(-(3))".to_string()) ; "double negation")]
    #[test_case("5!" => Ok("(5)!".to_string()) ; "postfix factorial")]
    #[test_case("3!!" => Ok("((3)!)!".to_string()) ; "repeated factorial")]
    #[test_case("factorial(5)" => Ok("(5)!".to_string()) ; "function factorial")]
    #[test_case("2*5!" => Ok("(2 * (5)!)".to_string()) ; "factorial binds tighter than product")]
    #[test_case("sqrt(16)+1" => Ok("(sqrt(16) + 1)".to_string()) ; "function call")]
    #[test_case("sin(pi/2)" => Ok("sin((pi / 2))".to_string()) ; "expression argument")]
    #[test_case("1/(2)" => Ok("(1 / 2)".to_string()) ; "reciprocal")]
    #[test_case("((e))" => Ok("e".to_string()) ; "nested parentheses")]
    fn structure(input: &str) -> Result<String, Error> {
        grouping(input)
    }

    #[test_case("(2+3" => Error::ParseError("unbalanced parentheses".into()) ; "missing closing parenthesis")]
    #[test_case("2+3)" => Error::ParseError("unbalanced parentheses".into()) ; "extra closing parenthesis")]
    #[test_case("(1)+)" => Error::ParseError("unbalanced parentheses".into()) ; "closing parenthesis after a closed group")]
    #[test_case("(1)*()" => Error::ParseError("missing operand".into()) ; "empty group after a closed group")]
    #[test_case(")" => Error::ParseError("unbalanced parentheses".into()) ; "lone closing parenthesis")]
    #[test_case("sin(1" => Error::ParseError("unbalanced parentheses".into()) ; "unclosed call")]
    #[test_case("()" => Error::ParseError("missing operand".into()) ; "empty group")]
    #[test_case("2+" => Error::ParseError("missing operand".into()) ; "missing right operand")]
    #[test_case("*3" => Error::ParseError("missing operand".into()) ; "missing left operand")]
    #[test_case("!" => Error::ParseError("missing operand".into()) ; "bang alone")]
    #[test_case("+5" => Error::ParseError("missing operand".into()) ; "no unary plus")]
    #[test_case("2 3" => Error::ParseError("unexpected trailing input".into()) ; "juxtaposed numbers")]
    #[test_case("2pi" => Error::ParseError("unexpected trailing input".into()) ; "no implicit multiplication")]
    #[test_case("sin 1" => Error::ParseError("expected '(' after sin".into()) ; "call without parentheses")]
    #[test_case("factorial 3" => Error::ParseError("expected '(' after factorial".into()) ; "factorial without parentheses")]
    #[test_case("sin(1,2)" => Error::ParseError("unexpected ','".into()) ; "too many arguments")]
    #[test_case("," => Error::ParseError("unexpected ','".into()) ; "lone comma")]
    fn errors(input: &str) -> Error {
        grouping(input).unwrap_err()
    }

    fn repeated(open: &str, count: usize, close: &str) -> String {
        format!("{}1{}", open.repeat(count), close.repeat(count))
    }

    #[test_case(repeated("(", 100_000, ")") ; "parentheses")]
    #[test_case(repeated("-", 200_000, "") ; "negations")]
    #[test_case(repeated("sqrt(", 10_000, ")") ; "function calls")]
    #[test_case(repeated("", 50_000, "!") ; "factorials")]
    #[test_case(format!("1{}", "+1".repeat(100_000)) ; "long sum")]
    #[test_case(repeated("(", 300, ")") ; "just past the limit")]
    fn too_deep(input: String) {
        assert_eq!(
            grouping(&input),
            Err(Error::ParseError("expression nested too deeply".into()))
        );
    }

    #[test]
    fn deep_but_allowed() {
        let input = repeated("(", MAX_DEPTH - 1, ")");
        assert_eq!(grouping(&input), Ok("1".to_string()));

        let input = repeated("-(", 100, ")");
        assert_eq!(parse(&tokenize(&input).unwrap()).unwrap().eval(), Ok(1.0));

        let input = format!("1{}", "+1".repeat(200));
        assert_eq!(parse(&tokenize(&input).unwrap()).unwrap().eval(), Ok(201.0));
    }

    #[test]
    fn empty() {
        assert_eq!(
            parse(&[Token::End]),
            Err(Error::ParseError("empty expression".into()))
        );
        assert_eq!(
            parse(&[]),
            Err(Error::ParseError("empty expression".into()))
        );
    }
}
