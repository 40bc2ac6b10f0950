use crate::error::Error;
use crate::token::{Op, Token};
use crate::util::KEYWORDS;
use std::iter::Peekable;
use std::str::CharIndices;

/// Split `input` into tokens, terminated by [`Token::End`].
///
/// # Examples
///
/// ```
/// # use tally::{tokenize, Token};
/// let tokens = tokenize("2 * 3").unwrap();
/// assert_eq!(tokens.len(), 4);
/// assert_eq!(tokens.last(), Some(&Token::End));
///
/// assert!(tokenize("2 + alert(1)").is_err());
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Token>, Error> {
    Lexer::new(input).tokenize()
}

/// An helper struct for lexing the input
pub struct Lexer<'a> {
    source: &'a str,
    input: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `source`
    #[must_use]
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            source,
            input: source.char_indices().peekable(),
        }
    }

    /// Consume the whole input. The returned vector always ends with
    /// [`Token::End`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, Error> {
        let mut output = Vec::new();
        loop {
            let token = self.next_token()?;
            output.push(token);
            if token == Token::End {
                return Ok(output);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, Error> {
        let (start, c) = match self.input.next() {
            Some(next) => next,
            None => return Ok(Token::End),
        };
        let token = match c {
            ' ' | '\t' | '\n' | '\r' => return self.next_token(),
            c if c.is_ascii_digit() => self.number(start)?,
            c if c.is_ascii_alphabetic() => self.identifier(start)?,
            '+' => Token::Operator(Op::Plus),
            '-' => Token::Operator(Op::Minus),
            '*' => Token::Operator(Op::Mul),
            '/' => Token::Operator(Op::Div),
            '^' => Token::Operator(Op::Exp),
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '!' => Token::Bang,
            other => return Err(self.invalid_character(start, other)),
        };
        Ok(token)
    }

    /// `digits ('.' digits)?`, the first digit being already consumed
    fn number(&mut self, start: usize) -> Result<Token, Error> {
        let mut end = self.digits(start + 1);
        if let Some(&(dot, '.')) = self.input.peek() {
            self.input.next();
            end = self.digits(dot + 1);
            if end == dot + 1 {
                return Err(Error::LexError(format!(
                    "malformed number '{}' at position {}",
                    &self.source[start..end],
                    self.position(start)
                )));
            }
        }
        let literal = &self.source[start..end];
        literal.parse().map(Token::Number).map_err(|_| {
            Error::LexError(format!(
                "malformed number '{}' at position {}",
                literal,
                self.position(start)
            ))
        })
    }

    /// Skip ASCII digits, returning the byte offset just past the last one
    fn digits(&mut self, mut end: usize) -> usize {
        while let Some(&(i, c)) = self.input.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.input.next();
            end = i + 1;
        }
        end
    }

    /// Longest known name starting at `start`, whose first letter is already
    /// consumed
    fn identifier(&mut self, start: usize) -> Result<Token, Error> {
        let rest = &self.source[start..];
        let found = KEYWORDS.iter().find(|(name, _)| {
            rest.get(..name.len())
                .map_or(false, |prefix| prefix.eq_ignore_ascii_case(name))
        });
        match found {
            Some(&(name, keyword)) => {
                // names are ASCII, one char per byte
                for _ in 1..name.len() {
                    self.input.next();
                }
                Ok(Token::Identifier(keyword))
            }
            None => {
                let c = rest.chars().next().unwrap_or_default();
                Err(self.invalid_character(start, c))
            }
        }
    }

    fn invalid_character(&self, start: usize, c: char) -> Error {
        Error::LexError(format!(
            "invalid character '{}' at position {}",
            c,
            self.position(start)
        ))
    }

    /// Character offset of the byte offset `start`
    fn position(&self, start: usize) -> usize {
        self.source[..start].chars().count()
    }
}
