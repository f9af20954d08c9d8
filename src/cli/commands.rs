//! Command implementations

use std::path::Path;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::{AppContainer, BridgePayload, ResultSink, StdoutJsonSink};
use crate::cli::args::{MergeArgs, PlanArgs};
use crate::domain::compiler::compile_request;
use crate::domain::model::MergeOutput;
use crate::error::MergeXError;

/// Execute the merge command
pub async fn merge(container: &dyn AppContainer, args: MergeArgs) -> Result<()> {
    let request = args.request.to_request()?;
    info!("Merging {} clips", request.input_count());

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling merge");
                cancel.cancel();
            }
        })
    };

    let result = container
        .merge_interactor()
        .execute_with_cancel(request, cancel)
        .await;
    interrupt.abort();

    let result = match (result, &args.output) {
        (Ok(output), Some(destination)) => container
            .temp_files()
            .persist(output.path(), destination)
            .await
            .map(|()| MergeOutput::new(destination)),
        (result, _) => result,
    };

    if args.json {
        Box::new(StdoutJsonSink).resolve(BridgePayload::from_result(&result));
    }

    let output = result.map_err(MergeXError::from)?;
    if !args.json {
        println!("Merged output: {}", output.path().display());
    }
    Ok(())
}

/// Execute the plan command
pub fn plan(program: &Path, args: PlanArgs) -> Result<()> {
    let request = args.request.to_request()?;
    let command = compile_request(&request, &args.output)
        .map_err(MergeXError::from)
        .context("Failed to compile merge")?;

    if args.json {
        println!("{}", serde_json::to_string(&command.args)?);
    } else {
        println!("{} {}", program.display(), command.display_line());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::RequestArgs;
    use std::path::PathBuf;

    #[test]
    fn test_plan_rejects_empty_request() {
        let args = PlanArgs {
            request: RequestArgs {
                inputs: vec![],
                speed: None,
                resolution: None,
                volume: None,
                request: None,
            },
            output: PathBuf::from("merged.mp4"),
            json: false,
        };
        assert!(plan(Path::new("ffmpeg"), args).is_err());
    }
}
