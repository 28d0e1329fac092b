use miette::SourceSpan;

use crate::{
    error::EvaluationError,
    lex::{BinOp, Token, TokenKind},
};

/// An entry on the operator stack.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Op(BinOp, SourceSpan),
    LeftParen,
}

impl Pending {
    fn precedence(&self) -> u8 {
        match self {
            Pending::Op(op, _) => op.precedence(),
            Pending::LeftParen => 0,
        }
    }
}

/// Two-stack operator precedence evaluator.
///
/// Both stacks are emptied at the start and end of every call to
/// [`Evaluator::evaluate`], so nothing carries over between expressions.
#[derive(Debug, Default)]
pub struct Evaluator {
    operands: Vec<f64>,
    operators: Vec<Pending>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&mut self, tokens: &[Token<'_>]) -> Result<f64, EvaluationError> {
        self.operands.clear();
        self.operators.clear();
        let result = self.run(tokens);
        self.operands.clear();
        self.operators.clear();
        result
    }

    fn run(&mut self, tokens: &[Token<'_>]) -> Result<f64, EvaluationError> {
        for token in tokens {
            match token.kind {
                TokenKind::LeftParen => self.operators.push(Pending::LeftParen),
                TokenKind::Number(n) => self.operands.push(n),
                TokenKind::RightParen => self.close_group()?,
                TokenKind::Op(op) => {
                    while let Some(top) = self.operators.last() {
                        if top.precedence() < op.precedence() {
                            break;
                        }
                        self.reduce()?;
                    }
                    self.operators.push(Pending::Op(op, token.span()));
                }
            }
        }

        while !self.operators.is_empty() {
            self.reduce()?;
        }

        match self.operands.as_slice() {
            [value] => Ok(*value),
            _ => Err(EvaluationError::MalformedExpression),
        }
    }

    /// Applies operators until the innermost open `(` is on top, then drops it.
    fn close_group(&mut self) -> Result<(), EvaluationError> {
        loop {
            match self.operators.last() {
                Some(Pending::LeftParen) => {
                    self.operators.pop();
                    return Ok(());
                }
                Some(Pending::Op(..)) => self.reduce()?,
                None => return Err(EvaluationError::MalformedExpression),
            }
        }
    }

    /// Pops the right operand, then the left one, then the operator, and
    /// pushes the result.
    fn reduce(&mut self) -> Result<(), EvaluationError> {
        let rhs = self.pop_operand()?;
        let lhs = self.pop_operand()?;
        let Some(Pending::Op(op, span)) = self.operators.pop() else {
            return Err(EvaluationError::MalformedExpression);
        };
        self.operands.push(apply(lhs, rhs, op, span)?);
        Ok(())
    }

    fn pop_operand(&mut self) -> Result<f64, EvaluationError> {
        self.operands
            .pop()
            .ok_or(EvaluationError::MalformedExpression)
    }
}

fn apply(lhs: f64, rhs: f64, op: BinOp, span: SourceSpan) -> Result<f64, EvaluationError> {
    let value = match op {
        BinOp::Add => lhs + rhs,
        BinOp::Sub => lhs - rhs,
        BinOp::Mul => lhs * rhs,
        BinOp::Div => {
            if rhs == 0.0 {
                return Err(EvaluationError::DivisionByZero { span });
            }
            lhs / rhs
        }
    };
    // operands are always finite, so a non-finite result means overflow
    if !value.is_finite() {
        return Err(EvaluationError::Overflow {
            symbol: op.symbol(),
            span,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexer;

    fn eval(input: &str) -> Result<f64, EvaluationError> {
        let tokens = Lexer::new(input).tokenize()?;
        Evaluator::new().evaluate(&tokens)
    }

    fn token(kind: TokenKind) -> Token<'static> {
        Token {
            kind,
            literal: "",
            offset: 0,
        }
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(eval("2+3*4"), Ok(14.0));
        assert_eq!(eval("2*3+4"), Ok(10.0));
    }

    #[test]
    fn parentheses_group() {
        assert_eq!(eval("(2+3)*4"), Ok(20.0));
        assert_eq!(eval("((((7))))"), Ok(7.0));
        assert_eq!(eval("2*(3+(4-1)*2)"), Ok(18.0));
    }

    #[test]
    fn operands_keep_their_order() {
        assert_eq!(eval("10-4"), Ok(6.0));
        assert_eq!(eval("8/2"), Ok(4.0));
        assert_eq!(eval("10-4-3"), Ok(3.0));
        assert_eq!(eval("10/2/5"), Ok(1.0));
        assert_eq!(eval("2-(5-1)"), Ok(-2.0));
    }

    #[test]
    fn division_is_not_truncated() {
        assert_eq!(eval("3/5"), Ok(0.6));
        let value = eval("1000/4 + 3/5+(3+(7*2))").unwrap();
        assert!((value - 267.6).abs() < 1e-9, "{value}");
    }

    #[test]
    fn division_by_zero_points_at_operator() {
        assert_eq!(
            eval("1 + 4/(2-2)"),
            Err(EvaluationError::DivisionByZero {
                span: SourceSpan::from(5..6),
            })
        );
        assert_eq!(eval("0/5"), Ok(0.0));
    }

    #[test]
    fn overflowing_result_is_an_error() {
        let big = format!("1{}", "0".repeat(300));
        let input = format!("{big}*{big}");
        assert_eq!(
            eval(&input),
            Err(EvaluationError::Overflow {
                symbol: '*',
                span: SourceSpan::from(301..302),
            })
        );
        assert_eq!(
            eval(&format!("{big}*{big}-{big}*{big}")).unwrap_err().kind(),
            "Overflow"
        );
        assert_eq!(eval(&format!("{big}/{big}")), Ok(1.0));
    }

    #[test]
    fn dangling_operators_are_malformed() {
        for input in ["2+", "*3", "-5+3", "(-5)", "2*-3", "()", "(1)(2)", "   "] {
            assert_eq!(
                eval(input),
                Err(EvaluationError::MalformedExpression),
                "{input:?}"
            );
        }
    }

    #[test]
    fn right_paren_without_left_is_malformed() {
        let tokens = [
            token(TokenKind::Number(1.0)),
            token(TokenKind::Op(BinOp::Add)),
            token(TokenKind::Number(2.0)),
            token(TokenKind::RightParen),
        ];
        assert_eq!(
            Evaluator::new().evaluate(&tokens),
            Err(EvaluationError::MalformedExpression)
        );
    }

    #[test]
    fn unclosed_left_paren_is_malformed() {
        let tokens = [token(TokenKind::LeftParen), token(TokenKind::Number(1.0))];
        assert_eq!(
            Evaluator::new().evaluate(&tokens),
            Err(EvaluationError::MalformedExpression)
        );
    }

    #[test]
    fn evaluator_is_reusable_after_failure() {
        let mut evaluator = Evaluator::new();
        let bad = Lexer::new("1+").tokenize().unwrap();
        let good = Lexer::new("6*7").tokenize().unwrap();
        assert!(evaluator.evaluate(&bad).is_err());
        assert_eq!(evaluator.evaluate(&good), Ok(42.0));
        assert!(evaluator.operands.is_empty());
        assert!(evaluator.operators.is_empty());
    }
}
