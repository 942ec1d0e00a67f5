use anyhow::{Context, Result};
use clap::Parser;
use healthcheck::utils::logging::{debug_enabled, setup_logging};
use healthcheck_packaging::{recipe::load, render, ImageRecipe};
use std::{fs, path::PathBuf};
use tracing::info;

/// Render the Dockerfile for a service from its image recipe.
#[derive(Parser, Debug)]
#[command(name = "healthcheck-dockerfile", version)]
struct RenderArgs {
    /// YAML image recipe
    #[arg(short, long, value_parser)]
    recipe_path: PathBuf,
    /// Write the Dockerfile here instead of stdout
    #[arg(short, long, value_parser)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = RenderArgs::parse();
    setup_logging(debug_enabled());

    let recipe = load::<ImageRecipe>(&args.recipe_path)?;
    let dockerfile = render(&recipe).context("Unable to render Dockerfile")?;

    match &args.output {
        Some(path) => {
            fs::write(path, &dockerfile)
                .with_context(|| format!("failed to write the file at path: {:?}", path))?;
            info!(path = ?path, "[Packaging] Dockerfile written");
        },
        None => print!("{}", dockerfile),
    }
    Ok(())
}
