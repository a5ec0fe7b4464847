use clap::{Parser, Subcommand};
use cli::{ScanConfig, ScanOutcome, scan_directory, write_scan};
use color_eyre::eyre::{Result, bail};
use docscan::{Detection, io};
use scan_common::utils;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Turn photos of documents into flat scans", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect, rectify and binarize the document in one image
    Scan {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Output image path (defaults to <stem>_scan.png next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// TOML or JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Working resolution percentage (overrides the config)
        #[arg(long)]
        scale: Option<u32>,
        /// Rectify this previously exported detection instead of detecting
        #[arg(long)]
        quad: Option<PathBuf>,
        /// Also write the detection as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,
        /// Write the warped page without thresholding
        #[arg(long)]
        raw: bool,
    },
    /// Locate the document and print its corners without rectifying
    Detect {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// TOML or JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Also write the detection as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Scan every image in a directory
    Batch {
        #[arg(short, long)]
        input_dir: PathBuf,
        #[arg(short, long)]
        output_dir: PathBuf,
        /// TOML or JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Scan {
            input,
            output,
            config,
            scale,
            quad,
            geojson,
            raw,
        } => {
            let mut config = ScanConfig::load(config.as_deref())?;
            if let Some(scale) = scale {
                config.scale_percent = *scale;
            }
            if *raw {
                config.threshold.enabled = false;
            }
            scan(
                &config,
                input,
                output.as_deref(),
                quad.as_deref(),
                geojson.as_deref(),
            )?;
        }
        Commands::Detect {
            input,
            config,
            geojson,
        } => {
            let config = ScanConfig::load(config.as_deref())?;
            detect(&config, input, geojson.as_deref())?;
        }
        Commands::Batch {
            input_dir,
            output_dir,
            config,
        } => {
            let config = ScanConfig::load(config.as_deref())?;
            batch(&config, input_dir, output_dir)?;
        }
        Commands::Schema => {
            println!("{}", ScanConfig::schema()?);
        }
    }

    Ok(())
}

fn scan(
    config: &ScanConfig,
    input: &Path,
    output: Option<&Path>,
    quad: Option<&Path>,
    geojson: Option<&Path>,
) -> Result<()> {
    let pipeline = config.to_pipeline();
    info!("{}", pipeline.info());

    let image = io::load_grayscale(input)?;
    let result = match quad {
        Some(quad_path) => {
            let detection = Detection::from_geojson_file(quad_path)?;
            info!(quad = %quad_path.display(), "Using supplied corners");
            pipeline.process_detection(&image, &detection)?
        }
        None => match pipeline.process(&image)? {
            Some(result) => result,
            None => bail!("No document found in {}", input.display()),
        },
    };

    if let Some(geojson_path) = geojson {
        result.detection.save_geojson(geojson_path)?;
        info!(path = %geojson_path.display(), "Detection written");
    }

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => utils::scan_output_path(input, None)?,
    };
    write_scan(&result, &output)?;

    info!("✅ Scan written to {}", output.display());
    Ok(())
}

fn detect(config: &ScanConfig, input: &Path, geojson: Option<&Path>) -> Result<()> {
    let pipeline = config.to_pipeline();
    let image = io::load_grayscale(input)?;

    let Some(detection) = pipeline.detect(&image)? else {
        bail!("No document found in {}", input.display());
    };

    if let Some(geojson_path) = geojson {
        detection.save_geojson(geojson_path)?;
        info!(path = %geojson_path.display(), "Detection written");
    }

    println!("{}", serde_json::to_string_pretty(&detection)?);
    Ok(())
}

fn batch(config: &ScanConfig, input_dir: &Path, output_dir: &Path) -> Result<()> {
    let pipeline = config.to_pipeline();
    let report = scan_directory(&pipeline, input_dir, output_dir)?;

    let mut scanned = 0;
    for (input, outcome) in &report {
        match outcome {
            Ok(ScanOutcome::Scanned { .. }) => scanned += 1,
            Ok(ScanOutcome::NoDocument) => warn!("Skipped {}: no document found", input.display()),
            Err(e) => error!("Failed {}: {}", input.display(), e),
        }
    }

    info!("✅ Batch completed: {}/{} scanned", scanned, report.len());
    if scanned < report.len() {
        bail!("{} of {} images were not scanned", report.len() - scanned, report.len());
    }
    Ok(())
}
