//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::{MergeRequest, Resolution, TransformOptions};
use crate::error::{MergeXError, MergeXResult};

/// Clips and transform options shared by `merge` and `plan`
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Input clips, in output order
    #[arg(required_unless_present = "request", conflicts_with = "request")]
    pub inputs: Vec<String>,

    /// Timestamp multiplier (2 plays at half speed, 0.5 at double speed)
    #[arg(long, conflicts_with = "request")]
    pub speed: Option<f64>,

    /// Output resolution as WIDTHxHEIGHT
    #[arg(long, conflicts_with = "request")]
    pub resolution: Option<String>,

    /// Audio gain multiplier
    #[arg(long, conflicts_with = "request")]
    pub volume: Option<f64>,

    /// JSON request file (`{"inputs": [...], "options": {...}}`)
    #[arg(long)]
    pub request: Option<PathBuf>,
}

impl RequestArgs {
    /// Build a validated request from the file or the positional clips
    pub fn to_request(&self) -> MergeXResult<MergeRequest> {
        if let Some(path) = &self.request {
            let content = std::fs::read_to_string(path).map_err(|e| MergeXError::RequestFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            return MergeRequest::from_json(&content).map_err(|e| MergeXError::RequestFile {
                path: path.display().to_string(),
                message: e.message().to_string(),
            });
        }

        let mut options = TransformOptions::default();
        if let Some(speed) = self.speed {
            options = options.with_speed(speed);
        }
        if let Some(resolution) = &self.resolution {
            options = options.with_resolution(Resolution::parse(resolution)?);
        }
        if let Some(volume) = self.volume {
            options = options.with_volume(volume);
        }

        Ok(MergeRequest::new(self.inputs.clone(), options)?)
    }
}

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Move the merged file here (default: leave it in the cache dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the result as a JSON payload
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Output path written into the plan
    #[arg(short, long, default_value = "merged.mp4")]
    pub output: PathBuf,

    /// Print the argument vector as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_args(inputs: &[&str]) -> RequestArgs {
        RequestArgs {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            speed: None,
            resolution: None,
            volume: None,
            request: None,
        }
    }

    #[test]
    fn test_flags_become_options() {
        let mut args = request_args(&["a.mp4", "b.mp4"]);
        args.speed = Some(1.5);
        args.resolution = Some("640x480".to_string());
        args.volume = Some(3.0);

        let request = args.to_request().unwrap();
        assert_eq!(request.input_count(), 2);
        assert_eq!(request.options.speed_factor, 1.5);
        assert_eq!(request.options.target_resolution, Some(Resolution { width: 640, height: 480 }));
        assert_eq!(request.options.volume_factor, Some(3.0));
    }

    #[test]
    fn test_bad_flags_are_rejected() {
        let mut args = request_args(&["a.mp4"]);
        args.resolution = Some("wide".to_string());
        assert_eq!(args.to_request().unwrap_err().error_code(), "E_INVALID_REQUEST");

        let mut args = request_args(&["a.mp4"]);
        args.speed = Some(-1.0);
        assert_eq!(args.to_request().unwrap_err().error_code(), "E_INVALID_REQUEST");
    }

    #[test]
    fn test_request_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{"inputs": ["a.mp4", "b.mp4"], "options": {"volumeFactor": 0.5}}"#,
        )
        .unwrap();

        let mut args = request_args(&[]);
        args.request = Some(path);
        let request = args.to_request().unwrap();
        assert_eq!(request.inputs, vec!["a.mp4", "b.mp4"]);
        assert_eq!(request.options.volume_factor, Some(0.5));
        assert_eq!(request.options.speed_factor, 1.0);

        args.request = Some(dir.path().join("missing.json"));
        assert!(matches!(args.to_request(), Err(MergeXError::RequestFile { .. })));
    }
}
