use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use coolc_semant::cli;

/// The semantic analyzer phase: reads a serialized abstract syntax tree,
/// checks it, and writes the type-annotated tree to standard output.
#[derive(Parser, Debug)]
#[command(name = "semant", about = "Cool semantic analyzer")]
struct Args {
    /// Serialized tree to analyze; standard input when omitted.
    file: Option<PathBuf>,

    /// Enable semantic debug tracing on standard error.
    #[arg(short = 's')]
    semant_debug: bool,
}

pub fn main() -> ExitCode {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.semant_debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    cli::check(args.file.as_deref())
}
