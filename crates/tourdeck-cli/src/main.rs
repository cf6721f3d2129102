//! Tourdeck CLI: upload tour attachments and compose tour schedule PDFs.
//!
//! Configure via environment (or .env): STORAGE_BACKEND plus its backend
//! settings, MAPBOX_ACCESS_TOKEN for map rendering, TEMPLATE_DIR and
//! FONT_DIR for document composition.

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tourdeck_cli::init_tracing;
use tourdeck_composer::{ComposerAssets, TourComposer};
use tourdeck_core::models::Tour;
use tourdeck_core::Config;
use tourdeck_overlay::MapboxStaticMaps;
use tourdeck_pipeline::{AttachmentPipeline, UploadFile};
use tourdeck_storage::create_storage;

#[derive(Parser)]
#[command(name = "tourdeck", about = "Property tour attachment and document tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file, deriving a thumbnail for images
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Key prefix to store under
        #[arg(long, default_value = "attachments")]
        prefix: String,
    },
    /// Issue a time-limited retrieval URL for a stored key
    Presign {
        /// Storage key
        key: String,
        /// Expiry in seconds
        #[arg(long, default_value = "3600")]
        expires_in: u64,
    },
    /// Write a scannable map-link code image for a coordinate pair
    Qr {
        /// Latitude in degrees
        lat: f64,
        /// Longitude in degrees
        lon: f64,
        /// Output PNG path
        output: PathBuf,
    },
    /// Compose a tour definition into a schedule PDF
    Compose {
        /// Tour definition JSON file
        tour: PathBuf,
        /// Output PDF path
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload { file, prefix } => {
            let config = Config::from_env().context("Load configuration")?;
            let storage = create_storage(&config.storage)
                .await
                .context("Create storage backend")?;
            let pipeline = AttachmentPipeline::new(storage);

            let filename = file
                .file_name()
                .context("Upload path has no file name")?
                .to_string_lossy()
                .to_string();
            let content_type = mime_guess::from_path(&file)
                .first_or_octet_stream()
                .to_string();
            let data = std::fs::read(&file)
                .with_context(|| format!("Read {}", file.display()))?;

            let outcome = pipeline
                .upload(
                    UploadFile {
                        filename,
                        content_type,
                        data: Bytes::from(data),
                    },
                    &prefix,
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Presign { key, expires_in } => {
            let config = Config::from_env().context("Load configuration")?;
            let storage = create_storage(&config.storage)
                .await
                .context("Create storage backend")?;
            let pipeline = AttachmentPipeline::new(storage);

            let url = pipeline
                .presigned_link(&key, Some(Duration::from_secs(expires_in)))
                .await?;
            println!("{}", serde_json::json!({ "url": url, "expires_in": expires_in }));
        }
        Commands::Qr { lat, lon, output } => {
            let png = tourdeck_overlay::code_image(lat, lon)?;
            std::fs::write(&output, &png)
                .with_context(|| format!("Write {}", output.display()))?;
            println!("{}", output.display());
        }
        Commands::Compose { tour, output } => {
            let config = Config::from_env().context("Load configuration")?;
            let maps = MapboxStaticMaps::new(&config.map).context("Create map provider")?;

            let text = std::fs::read_to_string(&tour)
                .with_context(|| format!("Read {}", tour.display()))?;
            let tour: Tour = serde_json::from_str(&text).context("Parse tour definition")?;

            let logo_png = load_logo(tour.logo.as_deref(), config.compose.logo_path.as_deref())?;
            let assets = ComposerAssets {
                template_dir: config.compose.template_dir.clone(),
                template_name: config.compose.template_name.clone(),
                font_dir: config.compose.font_dir.clone(),
                font_family: config.compose.font_family.clone(),
                logo_png,
            };

            let composer = TourComposer::new(Arc::new(maps), assets)
                .with_map_size(config.map.width, config.map.height);
            composer.compose(&tour, &output).await?;
            println!("{}", output.display());
        }
    }

    Ok(())
}

/// The logo named in the tour definition wins over the configured default;
/// with neither set a blank placeholder keeps the template renderable.
fn load_logo(
    tour_logo: Option<&str>,
    configured: Option<&std::path::Path>,
) -> anyhow::Result<Bytes> {
    let path = match (tour_logo, configured) {
        (Some(p), _) => Some(PathBuf::from(p)),
        (None, Some(p)) => Some(p.to_path_buf()),
        (None, None) => None,
    };
    match path {
        Some(path) => {
            let data =
                std::fs::read(&path).with_context(|| format!("Read logo {}", path.display()))?;
            Ok(Bytes::from(data))
        }
        None => {
            let img = image::RgbImage::from_pixel(1, 1, image::Rgb([255, 255, 255]));
            let mut buffer = Vec::new();
            image::DynamicImage::ImageRgb8(img)
                .write_to(
                    &mut std::io::Cursor::new(&mut buffer),
                    image::ImageFormat::Png,
                )
                .context("Encode placeholder logo")?;
            Ok(Bytes::from(buffer))
        }
    }
}
