//! dome-warp - warp flat screen images for a spherical-mirror dome
//!
//! Main entry point for the command line tool.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use dome_warp::{load_config, save_config, DomeConfig, DomeProjection};

/// Warp one frame of source screen images into a projector image.
#[derive(Debug, Parser)]
#[command(name = "dome-warp", version)]
struct Args {
    /// Write the reference configuration to PATH and exit.
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<PathBuf>,

    /// Dome configuration file (JSON).
    #[arg(required_unless_present = "write_default_config")]
    config: Option<PathBuf>,

    /// Where to write the projector image (PNG).
    #[arg(required_unless_present = "write_default_config")]
    output: Option<PathBuf>,

    /// One image per configured screen, in configuration order.
    images: Vec<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Starting dome-warp v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    if let Some(path) = &args.write_default_config {
        save_config(&DomeConfig::default(), path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        return Ok(());
    }

    let (Some(config_path), Some(output_path)) = (&args.config, &args.output) else {
        bail!("a configuration file and an output path are required");
    };

    let config = load_config(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    if args.images.len() != config.screens.len() {
        bail!(
            "{} screens are configured but {} images were given",
            config.screens.len(),
            args.images.len()
        );
    }

    let projection = DomeProjection::new(&config)?;
    let fov = projection.fields_of_view()?;
    log::info!(
        "Front camera field of view {:.1} x {:.1} deg",
        fov.camera.horizontal,
        fov.camera.vertical
    );
    match fov.dome {
        Some(dome) => log::info!(
            "Dome image field of view {:.1} x {:.1} deg",
            dome.horizontal,
            dome.vertical
        ),
        None => log::warn!("No projector pixel shows any source screen"),
    }

    let images = args
        .images
        .iter()
        .map(|path| {
            image::open(path)
                .map(|image| image.to_rgb8())
                .with_context(|| format!("failed to read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let frame = projection.warper().warp(&images)?;
    frame
        .save(output_path)
        .with_context(|| format!("failed to write {}", output_path.display()))?;
    log::info!(
        "Wrote {}x{} projector image to {}",
        frame.width(),
        frame.height(),
        output_path.display()
    );

    Ok(())
}
