//! Implements the command line behavior.
//!
//! The tool follows the pipeline contract of the surrounding compiler
//! phases: the serialized tree arrives on standard input (or from a file
//! argument), the annotated tree leaves on standard output, diagnostics go
//! to standard error one line each, and the exit status is non-zero
//! exactly when a diagnostic was emitted.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use coolc_dsl::core::FileId;
use coolc_dsl::dump;
use coolc_dsl::symbol::SymbolTable;
use log::debug;

use crate::stages;

/// Reads the serialized tree, analyzes it, and prints the annotated tree.
pub fn check(input: Option<&Path>) -> ExitCode {
    let (source, file_id) = match read_input(input) {
        Ok(pair) => pair,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let mut symbols = SymbolTable::new();
    let mut program = match coolc_parser::parse_program(&source, &file_id, &mut symbols) {
        Ok(program) => program,
        Err(diagnostic) => {
            debug!("[{}]", diagnostic.code);
            eprintln!("{diagnostic}");
            return ExitCode::FAILURE;
        }
    };

    match stages::analyze(&mut program, &mut symbols) {
        Ok(()) => {
            print!("{}", dump::dump_program(&program, &symbols));
            ExitCode::SUCCESS
        }
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                debug!("[{}]", diagnostic.code);
                eprintln!("{diagnostic}");
            }
            eprintln!("Compilation halted due to static semantic errors.");
            ExitCode::FAILURE
        }
    }
}

fn read_input(input: Option<&Path>) -> Result<(String, FileId), String> {
    let mut contents = String::new();
    match input {
        Some(path) => {
            File::open(path)
                .map_err(|e| format!("Failed opening file {}. {}", path.display(), e))?
                .read_to_string(&mut contents)
                .map_err(|e| format!("Failed to read file {}. {}", path.display(), e))?;
            Ok((contents, FileId::from_path(path)))
        }
        None => {
            std::io::stdin()
                .read_to_string(&mut contents)
                .map_err(|e| format!("Failed to read standard input. {e}"))?;
            Ok((contents, FileId::from_string("<stdin>")))
        }
    }
}
