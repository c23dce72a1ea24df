//! svcgen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use svcgen_core::config::{ErrorDeclaration, GenerationType};
use svcgen_core::{generate, generate_with, ArtifactKind, Config, MemoryWriter};
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT_DIR: &str = "generated";

#[derive(Parser, Debug)]
#[command(name = "svcgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate artifacts from a service model
    Generate(GenerateArgs),
    /// List the artifact kinds svcgen can generate
    Kinds,
}

#[derive(clap::Args, Debug, Default)]
struct GenerateArgs {
    /// Configuration file (YAML, or TOML with a .toml extension)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Path or URL of the service model (YAML or JSON)
    ///
    /// Example: --model path/to/model.yaml
    /// Example: --model https://example.com/model.json
    #[arg(long)]
    model: Option<String>,
    /// Base name used for type prefixes and the output module
    #[arg(long)]
    base_name: Option<String>,
    /// Output directory for generated artifacts
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Artifact kinds to generate, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    kinds: Vec<ArtifactKind>,
    /// Text prepended to every artifact
    #[arg(long)]
    file_header: Option<String>,
    /// Import ValidationError from this library instead of declaring it
    #[arg(long)]
    error_library: Option<String>,
    /// Directory holding a header.rs.tera override
    #[arg(long)]
    template_dir: Option<PathBuf>,
    /// server regenerates everything; server-update keeps existing handler stubs
    #[arg(long)]
    generation_type: Option<GenerationType>,
    /// Render everything but write nothing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate(args) => run_generate(args).await,
        Commands::Kinds => {
            for kind in ArtifactKind::all() {
                println!("{:<24} <base_name>/{}.rs", kind.as_str(), kind.as_str());
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args).await?;
    tracing::info!(
        base_name = %config.base_name,
        model = %config.model_path,
        kinds = config.artifact_kinds.len(),
        "Generating artifacts"
    );

    if args.dry_run {
        let writer = MemoryWriter::new();
        let artifacts = generate_with(&config, &writer)
            .await
            .context("Generation failed")?;
        for artifact in &artifacts {
            println!(
                "{} ({} bytes, not written)",
                artifact.path.display(),
                artifact.content.len()
            );
        }
        return Ok(());
    }

    let written = generate(&config).await.context("Generation failed")?;
    for path in &written {
        println!("Generated {}", path.display());
    }
    Ok(())
}

/// Load the config file when given, then apply command-line overrides.
async fn resolve_config(args: &GenerateArgs) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let model = args
                .model
                .clone()
                .context("--model is required when no --config is given")?;
            let base_name = args
                .base_name
                .clone()
                .context("--base-name is required when no --config is given")?;
            Config::new(base_name, model, DEFAULT_OUTPUT_DIR)
        }
    };

    if let Some(model) = &args.model {
        config.model_path = model.clone();
    }
    if let Some(base_name) = &args.base_name {
        config.base_name = base_name.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.to_string_lossy().into_owned();
    }
    if !args.kinds.is_empty() {
        config.artifact_kinds = args.kinds.clone();
    }
    if let Some(file_header) = &args.file_header {
        config.file_header = Some(file_header.clone());
    }
    if let Some(library_import) = &args.error_library {
        config.error_declaration = ErrorDeclaration::External {
            library_import: library_import.clone(),
        };
    }
    if let Some(template_dir) = &args.template_dir {
        config.template_dir = Some(template_dir.to_string_lossy().into_owned());
    }
    if let Some(generation_type) = args.generation_type {
        config.generation_type = generation_type;
    }

    config.validate().context("Invalid configuration")?;
    log::debug!("Resolved configuration: {:?}", config);
    Ok(config)
}
