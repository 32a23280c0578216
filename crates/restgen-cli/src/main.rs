//! restgen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use restgen_core::{ApiDocument, Config, Diagnostics, Generator};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "restgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by commands that read a descriptor document
#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Path or URL to the descriptor document (YAML or JSON)
    ///
    /// Can be a local file path or an HTTP/HTTPS URL
    /// Example: --input descriptors.yaml
    /// Example: --input https://example.com/descriptors.json
    #[arg(long)]
    input: String,
    /// Configuration file (YAML, or TOML when ending in .toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate declaration and API stub files
    Generate {
        #[command(flatten)]
        input: InputArgs,
        /// Output directory (overrides the configuration)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Extension of generated files (overrides the configuration)
        #[arg(long)]
        extension: Option<String>,
        /// Skip the declaration file
        #[arg(long)]
        no_types: bool,
        /// Type rendered as `any` with a manual-conversion comment (repeatable)
        #[arg(long = "ignore", value_name = "TYPE")]
        ignores: Vec<String>,
        /// Exit with an error when any diagnostic was recorded
        #[arg(long)]
        deny_diagnostics: bool,
    },
    /// Generate in memory and report diagnostics without writing files
    Check {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Write a configuration file with default values
    InitConfig {
        #[arg(long, default_value = "restgen.yaml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging, RUST_LOG controls the filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            input,
            output_dir,
            extension,
            no_types,
            ignores,
            deny_diagnostics,
        } => {
            let mut config = load_config(input.config.as_deref()).await?;
            if let Some(dir) = output_dir {
                config.output_dir = dir.to_string_lossy().into_owned();
            }
            if let Some(extension) = extension {
                config.extension = extension;
            }
            if no_types {
                config.generate_types = false;
            }
            config.ignores.extend(ignores);
            config.validate().context("Invalid configuration")?;

            let generator = load_generator(&input.input, config).await?;
            let output_dir = generator.config().output_dir.clone();
            tracing::info!("Generating into {}", output_dir);

            let generation = generator.generate_to_dir(&output_dir).await;
            for path in &generation.written {
                println!("wrote {}", path.display());
            }
            print_diagnostics(&generation.diagnostics);
            if deny_diagnostics && !generation.diagnostics.is_empty() {
                anyhow::bail!(
                    "{} diagnostic(s) recorded",
                    generation.diagnostics.len()
                );
            }
        }
        Commands::Check { input } => {
            let config = load_config(input.config.as_deref()).await?;
            let generator = load_generator(&input.input, config).await?;
            let generation = generator.generate();
            print_diagnostics(&generation.diagnostics);
            if !generation.diagnostics.is_empty() {
                anyhow::bail!(
                    "{} diagnostic(s) recorded",
                    generation.diagnostics.len()
                );
            }
            println!(
                "ok: {} stub group(s), no diagnostics",
                generation.stubs.len()
            );
        }
        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists, pass --force to overwrite",
                    path.display()
                );
            }
            Config::default()
                .save(&path)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("wrote {}", path.display());
        }
    }

    Ok(())
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

async fn load_generator(input: &str, config: Config) -> anyhow::Result<Generator> {
    tracing::info!("Loading descriptors from {}", input);
    let document = ApiDocument::from_file_or_url(input)
        .await
        .with_context(|| format!("Failed to load descriptors from {}", input))?;
    Ok(Generator::from_document(config, document))
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
    if !diagnostics.is_empty() {
        tracing::warn!("{} diagnostic(s) recorded", diagnostics.len());
    }
}
