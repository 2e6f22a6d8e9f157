use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use design_studio::app::{App, GenerateRequest};
use design_studio::models::{AspectRatio, Resolution};
use design_studio::prompts;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "design-studio")]
#[command(about = "Generate design visualizations from a prompt and reference images")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate one or more designs and save them as PNG files.
    Generate(GenerateArgs),
    /// Select and store the API key used for generation.
    SelectKey {
        #[arg(long)]
        password: Option<String>,
    },
    /// Print a random sample prompt.
    Suggest,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Description of the design to generate.
    #[arg(short, long)]
    prompt: String,

    /// Reference image to guide layout, style and palette. Repeatable.
    #[arg(short = 'r', long = "reference", value_name = "PATH")]
    references: Vec<PathBuf>,

    #[arg(long, default_value = "16:9", value_parser = parse_aspect_ratio)]
    aspect_ratio: AspectRatio,

    #[arg(long, default_value = "2K", value_parser = parse_resolution)]
    resolution: Resolution,

    /// Number of images to generate from the same request.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    variations: u32,

    /// Directory for exported images (defaults to OUTPUT_DIR).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[arg(long)]
    password: Option<String>,
}

fn parse_aspect_ratio(input: &str) -> std::result::Result<AspectRatio, String> {
    input.parse().map_err(|e: design_studio::Error| e.to_string())
}

fn parse_resolution(input: &str) -> std::result::Result<Resolution, String> {
    input.parse().map_err(|e: design_studio::Error| e.to_string())
}

impl From<GenerateArgs> for GenerateRequest {
    fn from(args: GenerateArgs) -> Self {
        Self {
            prompt: args.prompt,
            reference_paths: args.references,
            aspect_ratio: args.aspect_ratio,
            resolution: args.resolution,
            variations: args.variations,
            password: args.password,
            output_dir: args.output_dir,
        }
    }
}

async fn run(command: Command) -> design_studio::Result<()> {
    match command {
        Command::Suggest => {
            println!("{}", prompts::random_sample_prompt(&mut rand::thread_rng()));
            Ok(())
        }
        Command::SelectKey { password } => {
            let mut app = App::new().await?;
            app.select_key(password.as_deref()).await
        }
        Command::Generate(args) => {
            let mut app = App::new().await?;
            match app.generate(args.into()).await {
                Ok(paths) => {
                    for path in paths {
                        println!("{}", path.display());
                    }
                    Ok(())
                }
                Err(e) => {
                    if let design_studio::Error::PartialExport { saved, .. } = &e {
                        for path in saved {
                            println!("{}", path.display());
                        }
                    }
                    Err(e)
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "design_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    info!("Starting design-studio");

    match run(args.command).await {
        Ok(()) => {
            info!("Done");
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
