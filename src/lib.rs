pub mod binder;
pub mod block_table;
pub mod buffer;
pub mod emitter;
pub mod error;
pub mod learn_blocks;
pub mod program;
pub mod registry;
pub mod session;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(not(target_arch = "wasm32"))]
pub mod python_check;

#[cfg(all(target_arch = "wasm32", feature = "wasm-bindings"))]
pub mod wasm;

use anyhow::{anyhow, Result};
use buffer::RenderOptions;
use registry::BlockRegistry;
use session::{compile_program, CompileReport};
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

pub use binder::RawBindings;
pub use emitter::EmittedFragment;
pub use error::{GenerateError, RegistryError};
pub use session::{generate_fragment, CompileSession};

#[cfg(not(target_arch = "wasm32"))]
pub fn run_cli(args: &cli::Args) -> Result<()> {
    let mut registry = BlockRegistry::builtin()?;
    for table in &args.block_tables {
        block_table::load_block_table(table, &mut registry)?;
    }

    if args.list_blocks {
        for spec in registry.iter() {
            println!("{}", spec.signature());
        }
        return Ok(());
    }
    let input = args
        .input
        .as_deref()
        .ok_or_else(|| anyhow!("An INPUT program is required unless --list-blocks is given."))?;

    let total_stages = 2 + usize::from(args.check) + usize::from(args.output.is_some());
    let progress = CliProgress {
        total: total_stages,
    };
    let mut stage = 0usize;

    stage += 1;
    progress.stage(stage, "Reading program");
    let instances = program::read_program_file(input)?;

    stage += 1;
    progress.stage(stage, "Binding parameters and emitting code");
    let options = RenderOptions {
        header: !args.no_header,
    };
    let report = compile_program(&registry, &instances);
    ensure_compiled(&report)?;
    let source = report.render(options);

    if args.check {
        stage += 1;
        progress.stage(stage, "Checking Python syntax");
        if let python_check::SyntaxCheck::Failed { line, message } =
            python_check::check_python_syntax(&args.python, &source)?
        {
            anyhow::bail!(
                "Generated source does not compile{}:\n{}",
                describe_line(&report.buffer, &instances, line, options),
                message
            );
        }
    }

    match &args.output {
        Some(output) => {
            stage += 1;
            progress.stage(stage, "Writing output");
            write_source(output, &source)?;
        }
        None => print!("{}", source),
    }
    Ok(())
}

/// Generates a whole program document with the built-in block table.
pub fn generate_program_source(program_json: &str, options: RenderOptions) -> Result<String> {
    let registry = BlockRegistry::builtin()?;
    generate_program_source_with(&registry, program_json, options)
}

pub fn generate_program_source_with(
    registry: &BlockRegistry,
    program_json: &str,
    options: RenderOptions,
) -> Result<String> {
    let instances = program::parse_program(program_json)?;
    let report = compile_program(registry, &instances);
    ensure_compiled(&report)?;
    Ok(report.render(options))
}

fn ensure_compiled(report: &CompileReport) -> Result<()> {
    if report.is_success() {
        return Ok(());
    }
    let details = report
        .errors
        .iter()
        .map(|e| format!("  {}", e))
        .collect::<Vec<_>>()
        .join("\n");
    let headline = if report.aborted {
        "Code generation aborted"
    } else {
        "Code generation failed"
    };
    Err(anyhow!(
        "{} ({} block error{}):\n{}",
        headline,
        report.errors.len(),
        if report.errors.len() == 1 { "" } else { "s" },
        details
    ))
}

#[cfg(not(target_arch = "wasm32"))]
fn describe_line(
    buffer: &crate::buffer::ProgramBuffer,
    instances: &[program::BlockInstance],
    line: Option<usize>,
    options: RenderOptions,
) -> String {
    let Some(line) = line else {
        return String::new();
    };
    match buffer.locate_line(line, options) {
        Some(crate::buffer::LineOrigin::Code {
            instance: Some(instance),
            ..
        }) => {
            let block = instances
                .get(instance)
                .map(|i| i.block.as_str())
                .unwrap_or("?");
            format!(" (line {}, from block #{} '{}')", line, instance + 1, block)
        }
        Some(crate::buffer::LineOrigin::Import(_)) => format!(" (line {}, import section)", line),
        _ => format!(" (line {})", line),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_source(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, source.as_bytes())?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
struct CliProgress {
    total: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl CliProgress {
    fn stage(&self, step: usize, label: &str) {
        eprintln!("[Generate] {}... ({}/{})", label, step.min(self.total), self.total);
    }
}
