use std::fmt::Display;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Which side of a parenthesis is missing its operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenSide {
    /// `(3+2)4`
    AfterRightParen,
    /// `3(4+2)`
    BeforeLeftParen,
}

impl Display for ParenSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParenSide::AfterRightParen => write!(f, "right parenthesis and number"),
            ParenSide::BeforeLeftParen => write!(f, "number and left parenthesis"),
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("character '{character}' at index {index} is not allowed")]
    #[diagnostic(
        code(infix_calc::invalid_character),
        help("only digits, `+`, `-`, `*`, `/` and parentheses are allowed")
    )]
    InvalidCharacter {
        character: char,
        /// Position in the expression once whitespace has been removed.
        index: usize,
        #[label("this character")]
        span: SourceSpan,
    },

    #[error("parentheses are not balanced")]
    #[diagnostic(
        code(infix_calc::unbalanced_parentheses),
        help("every `(` needs a matching `)` after it")
    )]
    UnbalancedParentheses {
        #[label("no match for this parenthesis")]
        span: SourceSpan,
    },

    #[error("missing operator between {side}")]
    #[diagnostic(
        code(infix_calc::missing_operator),
        help("implicit multiplication is not supported, write `*` explicitly")
    )]
    MissingOperator {
        side: ParenSide,
        /// Position of the parenthesis once whitespace has been removed.
        index: usize,
        #[label("operator expected here")]
        span: SourceSpan,
    },

    #[error("expression not formed correctly")]
    #[diagnostic(
        code(infix_calc::malformed_expression),
        help("every operator needs a number on both sides; unary minus is not supported")
    )]
    MalformedExpression,

    #[error("operator '{symbol}' is not an allowed binary operation")]
    #[diagnostic(code(infix_calc::unknown_operator))]
    UnknownOperator { symbol: char },

    #[error("division by zero")]
    #[diagnostic(code(infix_calc::division_by_zero))]
    DivisionByZero {
        #[label("right-hand side of this division is zero")]
        span: SourceSpan,
    },

    #[error("result of '{symbol}' is too large")]
    #[diagnostic(
        code(infix_calc::overflow),
        help("intermediate values must stay within the range of a 64-bit float")
    )]
    Overflow {
        symbol: char,
        #[label("this operation overflows")]
        span: SourceSpan,
    },

    #[error("number literal is too large")]
    #[diagnostic(code(infix_calc::literal_too_large))]
    LiteralTooLarge {
        #[label("this literal")]
        span: SourceSpan,
    },
}

impl EvaluationError {
    pub fn kind(&self) -> &'static str {
        match self {
            EvaluationError::InvalidCharacter { .. } => "InvalidCharacter",
            EvaluationError::UnbalancedParentheses { .. } => "UnbalancedParentheses",
            EvaluationError::MissingOperator { .. } => "MissingOperator",
            EvaluationError::MalformedExpression => "MalformedExpression",
            EvaluationError::UnknownOperator { .. } => "UnknownOperator",
            EvaluationError::DivisionByZero { .. } => "DivisionByZero",
            EvaluationError::Overflow { .. } => "Overflow",
            EvaluationError::LiteralTooLarge { .. } => "LiteralTooLarge",
        }
    }
}
