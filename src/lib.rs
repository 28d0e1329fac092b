//! Evaluates infix arithmetic over non-negative integers with `+ - * /` and
//! parentheses.
//!
//! A line is first validated and tokenized by [`Lexer`], and only a fully
//! valid token sequence is reduced by the two-stack [`Evaluator`].

pub mod error;
pub mod eval;
pub mod lex;
pub mod repl;

pub use error::EvaluationError;
pub use eval::Evaluator;
pub use lex::{BinOp, Lexer, Token, TokenKind};

/// Evaluates one expression.
///
/// Whitespace anywhere in `expression` is ignored. An expression with no
/// tokens at all is a [`EvaluationError::MalformedExpression`].
pub fn evaluate(expression: &str) -> Result<f64, EvaluationError> {
    let tokens = Lexer::new(expression).tokenize()?;
    Evaluator::new().evaluate(&tokens)
}
