// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::graph::FilterGraph;

fn default_speed_factor() -> f64 {
    1.0
}

/// Output frame size for the optional rescale stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Create a new resolution with validation
    pub fn new(width: u32, height: u32) -> Result<Self, DomainError> {
        let resolution = Self { width, height };
        resolution.validate()?;
        Ok(resolution)
    }

    /// Parse `WIDTHxHEIGHT` (e.g. `640x480`)
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        let (width, height) = trimmed
            .split_once(|c| c == 'x' || c == 'X' || c == ':')
            .ok_or_else(|| {
                DomainError::InvalidRequest(format!(
                    "Invalid resolution '{}'. Expected WIDTHxHEIGHT, e.g. 640x480",
                    trimmed
                ))
            })?;
        let width = width
            .trim()
            .parse::<u32>()
            .map_err(|_| DomainError::InvalidRequest(format!("Invalid width: {}", width)))?;
        let height = height
            .trim()
            .parse::<u32>()
            .map_err(|_| DomainError::InvalidRequest(format!("Invalid height: {}", height)))?;
        Self::new(width, height)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.width == 0 || self.height == 0 {
            return Err(DomainError::InvalidRequest(format!(
                "Target resolution must be positive, got {}",
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Transform options applied to the merged streams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOptions {
    /// Multiplier applied to presentation timestamps (1.0 = unchanged)
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f64,
    #[serde(default)]
    pub target_resolution: Option<Resolution>,
    /// Audio gain multiplier
    #[serde(default)]
    pub volume_factor: Option<f64>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            speed_factor: default_speed_factor(),
            target_resolution: None,
            volume_factor: None,
        }
    }
}

impl TransformOptions {
    pub fn with_speed(mut self, speed_factor: f64) -> Self {
        self.speed_factor = speed_factor;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.target_resolution = Some(resolution);
        self
    }

    pub fn with_volume(mut self, volume_factor: f64) -> Self {
        self.volume_factor = Some(volume_factor);
        self
    }

    /// Whether a timestamp-scale and tempo stage is needed
    pub fn changes_speed(&self) -> bool {
        self.speed_factor != 1.0
    }

    /// Validate every option against the compiler's preconditions
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.speed_factor.is_finite() || self.speed_factor <= 0.0 {
            return Err(DomainError::InvalidRequest(format!(
                "Speed factor must be a positive number, got {}",
                self.speed_factor
            )));
        }

        // The audio tempo stage is built from the reciprocal.
        if !(1.0 / self.speed_factor).is_finite() {
            return Err(DomainError::InvalidRequest(format!(
                "Speed factor {:e} is too small to invert",
                self.speed_factor
            )));
        }

        if let Some(resolution) = &self.target_resolution {
            resolution.validate()?;
        }

        if let Some(volume) = self.volume_factor {
            if !volume.is_finite() || volume <= 0.0 {
                return Err(DomainError::InvalidRequest(format!(
                    "Volume factor must be a positive number, got {}",
                    volume
                )));
            }
        }

        Ok(())
    }
}

/// Ordered clip list plus transform options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    pub inputs: Vec<String>,
    #[serde(default)]
    pub options: TransformOptions,
}

impl MergeRequest {
    /// Create new merge request with validation
    pub fn new(inputs: Vec<String>, options: TransformOptions) -> Result<Self, DomainError> {
        let request = Self { inputs, options };
        request.validate()?;
        Ok(request)
    }

    /// Parse a request in the bridge's JSON shape
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let request: Self = serde_json::from_str(json)
            .map_err(|e| DomainError::InvalidRequest(format!("Malformed merge request: {}", e)))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_inputs(&self.inputs)?;
        self.options.validate()
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }
}

/// Input list must be non-empty and contain no blank entries
pub fn validate_inputs(inputs: &[String]) -> Result<(), DomainError> {
    if inputs.is_empty() {
        return Err(DomainError::InvalidRequest(
            "At least one input clip is required".to_string(),
        ));
    }

    if let Some(index) = inputs.iter().position(|input| input.trim().is_empty()) {
        return Err(DomainError::InvalidRequest(format!(
            "Input clip {} has an empty path",
            index
        )));
    }

    Ok(())
}

/// Compiled engine invocation for one merge
#[derive(Debug, Clone, PartialEq)]
pub struct MergeCommand {
    /// Argument vector handed to the engine, program name excluded
    pub args: Vec<String>,
    pub output_path: PathBuf,
    pub graph: FilterGraph,
}

impl MergeCommand {
    /// Shell-style rendering for logs and dry runs
    pub fn display_line(&self) -> String {
        self.args
            .iter()
            .map(|arg| {
                if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == ';' || c == '[') {
                    format!("\"{}\"", arg)
                } else {
                    arg.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Successful merge result; the caller owns the file from here on
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutput {
    pub path: PathBuf,
}

impl MergeOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `file://` reference to the merged output
    pub fn source_uri(&self) -> String {
        format!("file://{}", self.path.to_string_lossy())
    }
}

#[cfg(test)]
mod tests;
