use std::io::{self, BufRead, Write};

use miette::{NamedSource, Report};

use crate::error::EvaluationError;

pub const BANNER: &str = "\
******************************************************************************
ARITHMETIC EXPRESSION CALCULATOR

Evaluates expressions made of non-negative integers and parentheses with
binary addition, subtraction, multiplication and division.

ALLOWED CHARACTERS: ()+-/*0123456789   SPACES ARE OPTIONAL.

EXAMPLE VALID INPUT: (54 * (4 + 3*2 ) + 876) or 1000/4 + 3/5+(3+(7*2))
******************************************************************************

";

pub const PROMPT: &str =
    "Enter an arithmetic expression or hit enter with no input to exit the program:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplOptions {
    /// Stop at the first line that fails to evaluate.
    pub halt_on_error: bool,
    pub banner: bool,
}

impl Default for ReplOptions {
    fn default() -> Self {
        Self {
            halt_on_error: false,
            banner: true,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplSummary {
    pub evaluated: usize,
    pub failed: usize,
    pub halted: bool,
}

/// Attaches the offending line so the diagnostic can point into it.
pub fn report(error: EvaluationError, expression: &str) -> Report {
    Report::new(error).with_source_code(NamedSource::new("<input>", expression.to_string()))
}

/// Prompts for and evaluates lines until end of input or an empty line.
pub fn run(
    mut input: impl BufRead,
    mut output: impl Write,
    mut errors: impl Write,
    options: &ReplOptions,
) -> io::Result<ReplSummary> {
    if options.banner {
        write!(output, "{BANNER}")?;
    }

    let mut summary = ReplSummary::default();
    let mut buf = Vec::new();
    loop {
        writeln!(output, "{PROMPT}")?;
        output.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        // bytes that are not UTF-8 become U+FFFD and are rejected by the lexer
        let line = String::from_utf8_lossy(&buf);
        let expression = line.trim_end_matches(['\r', '\n']);
        if expression.is_empty() {
            break;
        }

        match crate::evaluate(expression) {
            Ok(value) => {
                summary.evaluated += 1;
                writeln!(output, "RESULT IS: {value}")?;
            }
            Err(e) => {
                summary.failed += 1;
                writeln!(errors, "{:?}", report(e, expression))?;
                if options.halt_on_error {
                    summary.halted = true;
                    break;
                }
            }
        }
    }
    Ok(summary)
}
