//! The thin compilation driver: file I/O, phase sequencing, diagnostics.
//! The lexical/syntactic frontend is an external collaborator behind the
//! [`Frontend`] trait; an embedding binary supplies one and calls
//! [`driver_main`].

pub mod config;

use self::config::{Args, CliArgs, EmitKind};
use crate::common::diag::CompileError;
use crate::stage1_ast::CompileUnit;
use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use std::fs;
use std::process::ExitCode;

/// The external parser: source text in, AST out. Syntax errors tunnel
/// through as [`CompileError::SyntaxError`].
pub trait Frontend {
    fn parse(&self, src: &str) -> std::result::Result<CompileUnit, CompileError>;
}

/// Parse the command line, run the pipeline, write the output file.
/// Compilation diagnostics go to stderr as `Line N: message`.
pub fn driver_main(frontend: &dyn Frontend) -> ExitCode {
    let args = Args::from(CliArgs::parse());
    match run(frontend, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

pub fn run(frontend: &dyn Frontend, args: &Args) -> Result<()> {
    let src = fs::read_to_string(&args.src_filepath)
        .with_context(|| format!("failed to read {}", args.src_filepath.display()))?;

    let output = compile(frontend, &src, args.emit)?;

    let out_path = args.output_filepath();
    fs::write(&out_path, output)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    log::debug!("wrote {}", out_path.display());
    Ok(())
}

fn compile(frontend: &dyn Frontend, src: &str, emit: EmitKind) -> Result<String> {
    let ast = frontend.parse(src)?;
    let output = match emit {
        EmitKind::Ir => crate::compile_to_ir(&ast)?,
        EmitKind::Asm => crate::compile_to_asm(&ast)?,
    };
    Ok(output)
}
