use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{Context, IntoDiagnostic};

use efx_backend_core::{BackendOptions, BackendRegistry, OutputContent};

/// efxc — effect-program compilation driver
///
/// Consumes a pre-parsed, type-checked effect program (JSON) produced by
/// an efx front end and dispatches it to a code-generation backend.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Input program file (serialized typed AST)
    input: PathBuf,

    /// Target backend (default: sse)
    #[arg(short, long, default_value = "sse")]
    target: String,

    /// Directory for output files (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the peer name used for generated entry points
    #[arg(long)]
    peer_name: Option<String>,

    /// Host-side interface the generated wrapper should implement
    #[arg(long)]
    interface: Option<String>,

    /// Dump the AST to stderr before backend compilation
    #[arg(long)]
    emit_ast: bool,

    /// Validate without producing output
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    // 1. Read the serialized program.
    let source = std::fs::read_to_string(&cli.input)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", cli.input.display()))?;

    // 2. Deserialize and validate.
    let program: efx_ast::Program = serde_json::from_str(&source)
        .into_diagnostic()
        .wrap_err("malformed program file")?;
    program
        .validate()
        .map_err(|e| miette::miette!("{e}"))
        .wrap_err("program failed validation")?;

    // 3. Optionally dump the AST to stderr.
    if cli.emit_ast {
        eprintln!("{}", efx_ast::dump_program(&program));
    }

    // 4. Dry-run: stop here.
    if cli.dry_run {
        return Ok(());
    }

    // 5. Backend dispatch.
    let mut registry = BackendRegistry::with_builtins();
    registry.register(Box::new(efx_backend_sse::SseBackend));
    let backend = registry.find(&cli.target).ok_or_else(|| {
        let available = registry.list_targets().join(", ");
        miette::miette!("unknown target '{}' (available: {})", cli.target, available)
    })?;

    let opts = BackendOptions {
        peer_name: cli.peer_name.clone(),
        interface: cli.interface.clone(),
    };
    let output = backend
        .compile(&program, &opts)
        .map_err(|e| miette::miette!("{e}"))
        .wrap_err("backend compilation failed")?;

    // 6. Print diagnostics.
    for diag in &output.diagnostics {
        eprintln!("{}: {}", diag.level, diag.message);
    }

    // 7. Write output.
    for file in &output.files {
        match &cli.output {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("failed to create {}", dir.display()))?;
                let path = dir.join(&file.name);
                match &file.content {
                    OutputContent::Text(text) => std::fs::write(&path, text),
                    OutputContent::Binary(bytes) => std::fs::write(&path, bytes),
                }
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
                eprintln!("wrote {}", path.display());
            }
            None => match &file.content {
                OutputContent::Text(text) => {
                    println!("// ==== {} ====", file.name);
                    println!("{text}");
                }
                OutputContent::Binary(_) => {
                    return Err(miette::miette!(
                        "binary output '{}' requires --output",
                        file.name
                    ));
                }
            },
        }
    }

    Ok(())
}
