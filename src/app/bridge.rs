// Bridge - Payloads handed back to the caller that requested a merge

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::domain::errors::DomainError;
use crate::domain::model::MergeOutput;

/// Terminal outcome of a merge as seen by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BridgePayload {
    #[serde(rename_all = "camelCase")]
    Success { output_path: String, source: String },
    #[serde(rename_all = "camelCase")]
    Failure { error_code: String, message: String },
}

impl BridgePayload {
    pub fn success(output: &MergeOutput) -> Self {
        BridgePayload::Success {
            output_path: output.path().to_string_lossy().into_owned(),
            source: output.source_uri(),
        }
    }

    pub fn failure(error: &DomainError) -> Self {
        BridgePayload::Failure {
            error_code: error.error_code().to_string(),
            message: error.message().to_string(),
        }
    }

    pub fn from_result(result: &Result<MergeOutput, DomainError>) -> Self {
        match result {
            Ok(output) => Self::success(output),
            Err(e) => Self::failure(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BridgePayload::Success { .. })
    }

    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(self)
            .map_err(|e| DomainError::InternalError(format!("Failed to encode payload: {}", e)))
    }
}

/// Receives the outcome of one merge. Consuming `self` allows one resolution.
pub trait ResultSink: Send {
    fn resolve(self: Box<Self>, payload: BridgePayload);
}

impl ResultSink for oneshot::Sender<BridgePayload> {
    fn resolve(self: Box<Self>, payload: BridgePayload) {
        // A dropped receiver means nobody is waiting any more.
        let _ = (*self).send(payload);
    }
}

/// Prints the payload as one JSON line on stdout
#[derive(Debug, Default)]
pub struct StdoutJsonSink;

impl ResultSink for StdoutJsonSink {
    fn resolve(self: Box<Self>, payload: BridgePayload) {
        match payload.to_json() {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_payload_shape() {
        let payload = BridgePayload::success(&MergeOutput::new("/cache/x-merged.mp4"));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "outputPath": "/cache/x-merged.mp4",
                "source": "file:///cache/x-merged.mp4"
            })
        );
    }

    #[test]
    fn test_failure_payload_shape() {
        let payload =
            BridgePayload::failure(&DomainError::EngineExecutionFailure("codec error".into()));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({ "errorCode": "E_ENGINE_EXECUTION", "message": "codec error" })
        );
        assert!(!payload.is_success());
    }

    #[test]
    fn test_payload_decodes_either_shape() {
        let ok: BridgePayload =
            serde_json::from_str(r#"{"outputPath":"/a.mp4","source":"file:///a.mp4"}"#).unwrap();
        assert!(ok.is_success());

        let err: BridgePayload =
            serde_json::from_str(r#"{"errorCode":"E_TIMEOUT","message":"late"}"#).unwrap();
        assert!(matches!(err, BridgePayload::Failure { ref error_code, .. } if error_code == "E_TIMEOUT"));
    }

    #[tokio::test]
    async fn test_oneshot_sink_delivers() {
        let (tx, rx) = oneshot::channel();
        let sink: Box<dyn ResultSink> = Box::new(tx);
        sink.resolve(BridgePayload::failure(&DomainError::Cancelled("stop".into())));
        assert_eq!(
            rx.await.unwrap(),
            BridgePayload::Failure {
                error_code: "E_CANCELLED".into(),
                message: "stop".into()
            }
        );
    }
}
