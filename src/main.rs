//! MochaScript interpreter
//!
//! Runs `.mocha` scripts, checks them for syntax errors, dumps their tokens
//! or AST as JSON, or starts an interactive read-eval loop.

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use mochascript::feedback::{render_human, ErrorReport};
use mochascript::{lex, parse, run_source_with, Environment, Error, Interpreter, InterpreterOptions};

/// MochaScript interpreter
#[derive(Parser, Debug)]
#[command(name = "mocha")]
#[command(version)]
#[command(about = "MochaScript interpreter - run scripts or start a REPL")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Script to run (starts the REPL when omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Print the token stream or AST as JSON instead of running
    #[arg(long, value_enum, global = true)]
    emit: Option<Emit>,

    /// Diagnostic format on stderr
    #[arg(long, value_enum, default_value_t = ErrorFormat::Human, global = true)]
    error_format: ErrorFormat,

    /// Give if/elif/else branches and for-loops their own scope
    #[arg(long, global = true)]
    block_scope: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a script
    Run {
        /// Input source file
        input: PathBuf,
    },
    /// Check a script for lexical and syntax errors without running it
    Check {
        /// Input source file
        input: PathBuf,
    },
    /// Start the interactive read-eval loop
    Repl,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    Tokens,
    Ast,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ErrorFormat {
    Human,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Some(Commands::Run { input }) => run_file(input, &cli),
        Some(Commands::Check { input }) => check_file(input, &cli),
        Some(Commands::Repl) => repl(&cli),
        None => match &cli.input {
            Some(input) => run_file(input, &cli),
            None => repl(&cli),
        },
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn options(cli: &Cli) -> InterpreterOptions {
    InterpreterOptions {
        block_scope: cli.block_scope,
    }
}

/// Where diagnostics for one source text go
struct Diagnostics<'a> {
    file: &'a str,
    source: &'a str,
    format: ErrorFormat,
}

impl Diagnostics<'_> {
    /// Print `err` to stderr; returns the exit code for a failed run
    fn report(&self, err: &Error) -> i32 {
        match self.format {
            ErrorFormat::Human => eprint!("{}", render_human(err, self.file, self.source)),
            ErrorFormat::Json => eprintln!("{}", ErrorReport::from_error(err, self.file).to_json_compact()),
        }
        1
    }
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Run a script file; the result is the process exit code
fn run_file(path: &Path, cli: &Cli) -> anyhow::Result<i32> {
    let source = read_source(path)?;
    let file = path.display().to_string();
    let diagnostics = Diagnostics {
        file: &file,
        source: &source,
        format: cli.error_format,
    };

    let tokens = match lex(&source) {
        Ok(tokens) => tokens,
        Err(e) => return Ok(diagnostics.report(&e)),
    };
    log::debug!("{}: {} tokens", file, tokens.len());
    if cli.emit == Some(Emit::Tokens) {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(0);
    }

    let program = match parse(tokens) {
        Ok(program) => program,
        Err(e) => return Ok(diagnostics.report(&e)),
    };
    if cli.emit == Some(Emit::Ast) {
        println!("{}", serde_json::to_string_pretty(&program)?);
        return Ok(0);
    }

    let mut env = Environment::new();
    let stdout = io::stdout();
    let mut interpreter = Interpreter::with_options(stdout.lock(), options(cli));
    match interpreter.interpret(&program, &mut env) {
        Ok(code) => Ok(code.unwrap_or(0)),
        Err(e) => Ok(diagnostics.report(&e)),
    }
}

/// Lex and parse only
fn check_file(path: &Path, cli: &Cli) -> anyhow::Result<i32> {
    let source = read_source(path)?;
    let file = path.display().to_string();
    let diagnostics = Diagnostics {
        file: &file,
        source: &source,
        format: cli.error_format,
    };

    match lex(&source).and_then(parse) {
        Ok(program) => {
            println!("{}: ok ({} statements)", file, program.len());
            Ok(0)
        }
        Err(e) => Ok(diagnostics.report(&e)),
    }
}

/// Read-eval loop. Each line runs against the same environment; an error
/// aborts only that line. A top-level `ret` ends the session with its code.
fn repl(cli: &Cli) -> anyhow::Result<i32> {
    println!("MochaScript v{}", env!("CARGO_PKG_VERSION"));

    let mut env = Environment::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        print!(">> ");
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(0);
        }

        let input = line.trim();
        match input {
            "" => continue,
            "exit" => {
                println!(">> Exiting Process");
                return Ok(0);
            }
            ":vars" => {
                for (name, var) in env.variables() {
                    let marker = if var.mutable { "mut " } else { "" };
                    println!("{}{}: {} = {}", marker, name, var.value.type_name(), var.value);
                }
                continue;
            }
            _ => {}
        }

        let mut output = Vec::new();
        let result = run_source_with(input, &mut env, &mut output, options(cli));

        stdout.write_all(&output)?;
        if !output.is_empty() && !output.ends_with(b"\n") {
            writeln!(stdout)?;
        }

        match result {
            Ok(Some(code)) => return Ok(code),
            Ok(None) => {}
            Err(e) => {
                let diagnostics = Diagnostics {
                    file: "<repl>",
                    source: input,
                    format: cli.error_format,
                };
                diagnostics.report(&e);
            }
        }
        debug_assert_eq!(env.depth(), 1);
    }
}
