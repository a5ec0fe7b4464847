use docscan::{
    AdaptiveMethod, AdaptiveThreshold, CannyEdgeDetector, GaussianBlurPreprocessor, ScanError,
    ScanPipeline, ScanResult, io,
};
use scan_common::{CommonError, utils};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Common(#[from] CommonError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Final binarization settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Write the warped grayscale page as-is when false
    pub enabled: bool,
    pub max_value: u8,
    /// Odd neighbourhood size, at least 3
    pub block_size: u32,
    /// Subtracted from the local mean before comparing
    pub c: f64,
    pub method: AdaptiveMethod,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        let defaults = AdaptiveThreshold::default();
        Self {
            enabled: true,
            max_value: defaults.max_value,
            block_size: defaults.block_size,
            c: defaults.c,
            method: defaults.method,
        }
    }
}

/// Scanner configuration; every field is optional in the file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Working resolution as a percentage of the input size
    pub scale_percent: u32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Optional blur before edge detection
    pub blur_sigma: Option<f32>,
    /// Polygon approximation tolerance as a fraction of contour perimeter
    pub epsilon_ratio: f64,
    pub threshold: ThresholdConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let canny = CannyEdgeDetector::default();
        Self {
            scale_percent: 50,
            canny_low: canny.low_threshold,
            canny_high: canny.high_threshold,
            blur_sigma: None,
            epsilon_ratio: docscan::DEFAULT_EPSILON_RATIO,
            threshold: ThresholdConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Load ScanConfig from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load ScanConfig from TOML string
    pub fn from_toml(content: &str) -> Result<Self, JobError> {
        Ok(toml::from_str(content)?)
    }

    /// Load ScanConfig from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load ScanConfig from JSON string
    pub fn from_json(content: &str) -> Result<Self, JobError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(JobError::UnsupportedFileFormat),
        }
    }

    /// Load from `path` if given, otherwise the defaults
    pub fn load(path: Option<&Path>) -> Result<Self, JobError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Convert ScanConfig to TOML string
    pub fn to_toml(&self) -> Result<String, JobError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert ScanConfig to JSON string
    pub fn to_json(&self) -> Result<String, JobError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// JSON schema of the configuration file
    pub fn schema() -> Result<String, JobError> {
        let schema = schemars::schema_for!(ScanConfig);
        Ok(serde_json::to_string_pretty(&schema)?)
    }

    pub fn to_pipeline(&self) -> ScanPipeline {
        let mut builder = ScanPipeline::builder()
            .scale_percent(self.scale_percent)
            .with_canny(self.canny_low, self.canny_high)
            .epsilon_ratio(self.epsilon_ratio);

        if let Some(sigma) = self.blur_sigma {
            builder = builder.add_preprocessor(GaussianBlurPreprocessor { sigma });
        }

        builder = if self.threshold.enabled {
            builder.set_binarizer(AdaptiveThreshold {
                max_value: self.threshold.max_value,
                method: self.threshold.method,
                block_size: self.threshold.block_size,
                c: self.threshold.c,
            })
        } else {
            builder.without_binarization()
        };

        builder.build()
    }
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Scanned { output: PathBuf },
    NoDocument,
}

/// Write the scan of `result` to `output`, creating parent directories
pub fn write_scan(result: &ScanResult, output: &Path) -> Result<(), JobError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        utils::ensure_output_dir(parent)?;
    }
    io::save_grayscale(result.output(), output)?;
    Ok(())
}

/// Scan one file into `output_dir` as `<stem>_scan.png`
pub fn scan_file(
    pipeline: &ScanPipeline,
    input: &Path,
    output_dir: Option<&Path>,
) -> Result<ScanOutcome, JobError> {
    let image = io::load_grayscale(input)?;
    let Some(result) = pipeline.process(&image)? else {
        warn!(input = %input.display(), "No document found");
        return Ok(ScanOutcome::NoDocument);
    };

    let output = utils::scan_output_path(input, output_dir)?;
    write_scan(&result, &output)?;
    info!(input = %input.display(), output = %output.display(), "Scanned");
    Ok(ScanOutcome::Scanned { output })
}

/// Scan every image in `input_dir`.
///
/// Files are independent: a failure is recorded for that file and the
/// batch carries on.
pub fn scan_directory(
    pipeline: &ScanPipeline,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<(PathBuf, Result<ScanOutcome, JobError>)>, JobError> {
    let inputs = utils::list_image_files(input_dir)?;
    utils::ensure_output_dir(output_dir)?;
    info!(count = inputs.len(), dir = %input_dir.display(), "Starting batch");

    Ok(inputs
        .into_iter()
        .map(|input| {
            let outcome = scan_file(pipeline, &input, Some(output_dir));
            (input, outcome)
        })
        .collect())
}
