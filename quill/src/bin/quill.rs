// Quill command-line interpreter
// Runs a Quill source file with optional runtime type checking

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process;
use yansi::Paint;

use quill::config::type_config::{self, TypeCheckMode, TypeConfig};
use quill::error_reporting::{render_snippet, SourceLocation};
use quill::parser;
use quill::runtime::Evaluator;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Quill interpreter with optional runtime type checking")]
#[command(version = "0.1.0")]
struct Args {
    /// Quill source file to run
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Type checking mode; overrides QUILL_TYPE_CHECK and quill.json
    #[arg(long, value_name = "MODE")]
    type_check: Option<TypeCheckMode>,

    /// Print the parse tree as JSON instead of running the program
    #[arg(long)]
    dump_ast: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report(source: &str, file: &PathBuf, message: &str, location: Option<SourceLocation>) {
    eprintln!("{} {}", "error:".red().bold(), message);
    if let Some(location) = location {
        eprintln!("  {} {}:{}", "-->".blue(), file.display(), location);
        if let Some(snippet) = render_snippet(source, &location) {
            eprintln!("{}", snippet);
        }
    }
}

fn run(args: Args) -> anyhow::Result<bool> {
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let program = match parser::parse(&source) {
        Ok(program) => program,
        Err(e) => {
            report(&source, &args.file, &e.to_string(), e.location());
            return Ok(false);
        }
    };

    if args.dump_ast {
        println!("{}", serde_json::to_string_pretty(&program)?);
        return Ok(true);
    }

    let mut config = TypeConfig::load();
    config.set_cli_override(args.type_check);
    config.set_current_file(fs::canonicalize(&args.file).unwrap_or_else(|_| args.file.clone()));
    tracing::debug!(
        mode = %config.effective_mode(),
        source = ?config.mode_source(),
        excluded = config.is_excluded(),
        "type checking configured"
    );
    type_config::install_global(config);

    let mut evaluator = Evaluator::with_global_config();
    match evaluator.execute(&program) {
        Ok(value) => {
            tracing::debug!(result = %value, "program finished");
            Ok(true)
        }
        Err(e) => {
            report(&source, &args.file, &e.to_string(), e.location().copied());
            Ok(false)
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            process::exit(1);
        }
    }
}
