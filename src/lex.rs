use std::fmt::Display;

use miette::SourceSpan;

use crate::error::{EvaluationError, ParenSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn symbol(self) -> char {
        match self {
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
        }
    }

    /// `*` and `/` bind tighter than `+` and `-`.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
        }
    }
}

impl TryFrom<char> for BinOp {
    type Error = EvaluationError;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        match symbol {
            '+' => Ok(BinOp::Add),
            '-' => Ok(BinOp::Sub),
            '*' => Ok(BinOp::Mul),
            '/' => Ok(BinOp::Div),
            symbol => Err(EvaluationError::UnknownOperator { symbol }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Op(BinOp),
    LeftParen,
    RightParen,
}

impl TokenKind {
    /// Parentheses sit below every operator so that operator reduction
    /// never crosses an open group. Numbers have no precedence.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            TokenKind::Op(op) => Some(op.precedence()),
            TokenKind::LeftParen | TokenKind::RightParen => Some(0),
            TokenKind::Number(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    /// Byte offset of `literal` in the original input line.
    pub offset: usize,
}

impl Token<'_> {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::from(self.offset..self.offset + self.literal.len())
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit} null"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit} null"),
            TokenKind::Op(BinOp::Add) => write!(f, "PLUS {lit} null"),
            TokenKind::Op(BinOp::Sub) => write!(f, "MINUS {lit} null"),
            TokenKind::Op(BinOp::Mul) => write!(f, "STAR {lit} null"),
            TokenKind::Op(BinOp::Div) => write!(f, "SLASH {lit} null"),
            TokenKind::Number(n) => write!(f, "NUMBER {lit} {n}"),
        }
    }
}

/// Validates one line of input and turns it into tokens.
///
/// Validation happens in stages over the whitespace-free characters, and
/// tokens are only produced once every stage has passed.
pub struct Lexer<'de> {
    whole: &'de str,
}

/// A non-whitespace character and its byte offset in the original line.
type Located = (usize, char);

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer { whole: input }
    }

    pub fn tokenize(&self) -> Result<Vec<Token<'de>>, EvaluationError> {
        let chars = self.strip_whitespace();
        check_characters(&chars)?;
        check_parentheses(&chars)?;
        check_adjacency(&chars)?;
        self.scan(&chars)
    }

    fn strip_whitespace(&self) -> Vec<Located> {
        self.whole
            .char_indices()
            .filter(|(_, c)| !c.is_whitespace())
            .collect()
    }

    fn scan(&self, chars: &[Located]) -> Result<Vec<Token<'de>>, EvaluationError> {
        let mut tokens = Vec::with_capacity(chars.len());
        let mut i = 0;
        while let Some(&(offset, c)) = chars.get(i) {
            let process = |kind: TokenKind| Token {
                kind,
                literal: &self.whole[offset..offset + c.len_utf8()],
                offset,
            };

            let token = match c {
                '(' => process(TokenKind::LeftParen),
                ')' => process(TokenKind::RightParen),
                '0'..='9' => {
                    let run = chars[i..]
                        .iter()
                        .take_while(|(_, c)| c.is_ascii_digit())
                        .count();
                    let token = self.number(&chars[i..i + run])?;
                    i += run;
                    tokens.push(token);
                    continue;
                }
                c => process(TokenKind::Op(BinOp::try_from(c)?)),
            };
            tokens.push(token);
            i += 1;
        }
        Ok(tokens)
    }

    /// Coalesces a maximal run of digits into one literal, most significant
    /// digit first.
    fn number(&self, run: &[Located]) -> Result<Token<'de>, EvaluationError> {
        let (start, _) = run[0];
        let (last, _) = run[run.len() - 1];
        let literal = &self.whole[start..=last];

        let value = run
            .iter()
            .filter_map(|(_, c)| c.to_digit(10))
            .fold(0f64, |value, digit| value * 10.0 + f64::from(digit));
        if !value.is_finite() {
            return Err(EvaluationError::LiteralTooLarge {
                span: SourceSpan::from(start..last + 1),
            });
        }

        Ok(Token {
            kind: TokenKind::Number(value),
            literal,
            offset: start,
        })
    }
}

fn check_characters(chars: &[Located]) -> Result<(), EvaluationError> {
    for (index, &(offset, c)) in chars.iter().enumerate() {
        if !matches!(c, '0'..='9' | '+' | '-' | '*' | '/' | '(' | ')') {
            return Err(EvaluationError::InvalidCharacter {
                character: c,
                index,
                span: SourceSpan::from(offset..offset + c.len_utf8()),
            });
        }
    }
    Ok(())
}

fn check_parentheses(chars: &[Located]) -> Result<(), EvaluationError> {
    let mut open = Vec::new();
    for &(offset, c) in chars {
        match c {
            '(' => open.push(offset),
            ')' => {
                if open.pop().is_none() {
                    return Err(EvaluationError::UnbalancedParentheses {
                        span: SourceSpan::from(offset..offset + 1),
                    });
                }
            }
            _ => {}
        }
    }
    // the bottom of the stack is the earliest `(` left unmatched
    match open.first() {
        Some(&offset) => Err(EvaluationError::UnbalancedParentheses {
            span: SourceSpan::from(offset..offset + 1),
        }),
        None => Ok(()),
    }
}

fn check_adjacency(chars: &[Located]) -> Result<(), EvaluationError> {
    for (index, pair) in chars.windows(2).enumerate() {
        let [(left, a), (right, b)] = [pair[0], pair[1]];
        let side = match (a, b) {
            (')', b) if b.is_ascii_digit() => ParenSide::AfterRightParen,
            (a, '(') if a.is_ascii_digit() => ParenSide::BeforeLeftParen,
            _ => continue,
        };
        let index = match side {
            ParenSide::AfterRightParen => index,
            ParenSide::BeforeLeftParen => index + 1,
        };
        return Err(EvaluationError::MissingOperator {
            side,
            index,
            span: SourceSpan::from(left..right + 1),
        });
    }
    Ok(())
}
