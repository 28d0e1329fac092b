use std::io;

use clap::Parser;
use clap::Subcommand;
use infix_calc::Lexer;
use infix_calc::repl::{self, ReplOptions};
use miette::IntoDiagnostic;
use miette::WrapErr;

/// Calculator for infix arithmetic over non-negative integers.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read expressions from standard input, one per line (the default).
    Repl {
        /// Stop at the first expression that fails to evaluate.
        #[arg(long)]
        halt_on_error: bool,
        /// Don't print the usage banner.
        #[arg(short, long)]
        quiet: bool,
    },
    /// Evaluate a single expression.
    Eval { expression: String },
    /// Print the tokens of a single expression.
    Tokenize { expression: String },
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    let command = args.command.unwrap_or(Commands::Repl {
        halt_on_error: false,
        quiet: false,
    });

    match command {
        Commands::Repl {
            halt_on_error,
            quiet,
        } => {
            let options = ReplOptions {
                halt_on_error,
                banner: !quiet,
            };
            let summary = repl::run(io::stdin().lock(), io::stdout(), io::stderr(), &options)
                .into_diagnostic()
                .wrap_err("reading expressions from standard input failed")?;
            if summary.halted {
                std::process::exit(65);
            }
        }
        Commands::Eval { expression } => match infix_calc::evaluate(&expression) {
            Ok(value) => println!("RESULT IS: {value}"),
            Err(e) => {
                eprintln!("{:?}", repl::report(e, &expression));
                std::process::exit(65);
            }
        },
        Commands::Tokenize { expression } => {
            let tokens = match Lexer::new(&expression).tokenize() {
                Ok(tokens) => tokens,
                Err(e) => {
                    eprintln!("{:?}", repl::report(e, &expression));
                    std::process::exit(65);
                }
            };
            for token in &tokens {
                println!("{token}");
            }
            println!("EOF  null");
        }
    }
    Ok(())
}
