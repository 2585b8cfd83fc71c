//! avj — encode, inspect and export .avj files.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use avj::DEFAULT_CAPTION;
use avj_cli::commands::{self, EncodeOptions};
use avj_cli::config::{resolve_embedding_dim, resolve_output_path, resolve_variant};

#[derive(Parser)]
#[command(
    name = "avj",
    about = "Encode images with captions and embeddings into .avj files, and read them back",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an image file into .avj.
    Encode {
        /// Input image (png, jpg, webp, ...).
        input: PathBuf,

        /// Caption stored alongside the image.
        #[arg(short, long, default_value = DEFAULT_CAPTION)]
        caption: String,

        /// Output path (defaults to <input>.avj).
        #[arg(short, long)]
        output: Option<String>,

        /// Layout: a/plain or b/embedded. Also reads AVJ_VARIANT.
        #[arg(long)]
        variant: Option<String>,

        /// JSON file with {"text": [...], "image": [...]} embeddings.
        /// Without it, the embedded layout stores zero vectors.
        #[arg(long)]
        embeddings: Option<PathBuf>,
    },

    /// Print caption, dimensions and embeddings as JSON.
    Metadata {
        input: PathBuf,

        /// Layout: a/plain or b/embedded. Also reads AVJ_VARIANT.
        #[arg(long)]
        variant: Option<String>,
    },

    /// Rebuild the stored image and save it as PNG.
    Decode {
        input: PathBuf,

        /// Output path (defaults to the input with a .png extension).
        #[arg(short, long)]
        output: Option<String>,

        /// Layout: a/plain or b/embedded. Also reads AVJ_VARIANT.
        #[arg(long)]
        variant: Option<String>,
    },

    /// Check that a .avj file decodes and its pixels match its dimensions.
    Validate {
        input: PathBuf,

        /// Layout: a/plain or b/embedded. Also reads AVJ_VARIANT.
        #[arg(long)]
        variant: Option<String>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   avj completions bash > ~/.local/share/bash-completion/completions/avj
    ///   avj completions zsh > ~/.zfunc/_avj
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode {
            input,
            caption,
            output,
            variant,
            embeddings,
        } => {
            let opts = EncodeOptions {
                output: resolve_output_path(output.as_deref(), &input, "avj"),
                input,
                caption,
                variant: resolve_variant(variant.as_deref())?,
                embeddings,
                embedding_dim: resolve_embedding_dim()?,
            };
            let summary = commands::encode_image(&opts)?;
            println!(
                "Encoded {}x{} image as {} .avj: {} ({} bytes)",
                summary.width,
                summary.height,
                summary.variant,
                summary.output.display(),
                summary.bytes
            );
        }

        Commands::Metadata { input, variant } => {
            let variant = resolve_variant(variant.as_deref())?;
            let meta = commands::read_metadata(&input, variant)?;
            println!("{}", meta.to_json_pretty()?);
        }

        Commands::Decode {
            input,
            output,
            variant,
        } => {
            let variant = resolve_variant(variant.as_deref())?;
            let output = resolve_output_path(output.as_deref(), &input, "png");
            commands::export_png(&input, variant, &output)?;
            println!("Decoded image written to {}", output.display());
        }

        Commands::Validate {
            input,
            variant,
            json,
        } => {
            let variant = resolve_variant(variant.as_deref())?;
            match commands::validate(&input, variant) {
                Ok(report) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    } else {
                        println!("Valid {} .avj file: {}", variant, input.display());
                        println!("  Size: {}x{} {}", report.width, report.height, report.colour_mode);
                        println!("  Caption: {} bytes", report.caption_bytes);
                        if let (Some(t), Some(i)) =
                            (report.text_embedding_dim, report.image_embedding_dim)
                        {
                            println!("  Embeddings: text {t}, image {i}");
                        }
                        if let Some(err) = &report.pixel_error {
                            println!("  Pixels: {err}");
                        }
                    }
                    if !report.is_valid() {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Invalid .avj file: {e:#}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "avj", &mut std::io::stdout());
        }
    }

    Ok(())
}
