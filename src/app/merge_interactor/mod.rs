// Merge interactor - Orchestrates one merge from temp allocation to terminal outcome

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::adapters::toml_config::MergerConfig;
use crate::app::bridge::{BridgePayload, ResultSink};
use crate::domain::compiler::compile_request;
use crate::domain::errors::*;
use crate::domain::execution::{EngineEvent, ExecutionHandle, ExecutionState, Transition};
use crate::domain::model::*;
use crate::domain::progress::EngineProgress;
use crate::ports::*;

/// How long an aborted engine gets to acknowledge before cleanup proceeds
const ENGINE_EXIT_GRACE: Duration = Duration::from_secs(5);

/// Controller settings taken from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MergeSettings {
    pub output_extension: String,
    /// `None` waits for the engine indefinitely
    pub timeout: Option<Duration>,
    pub keep_failed_output: bool,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self::from_config(&MergerConfig::default())
    }
}

impl MergeSettings {
    pub fn from_config(config: &MergerConfig) -> Self {
        Self {
            output_extension: config.output_extension.clone(),
            timeout: config.timeout(),
            keep_failed_output: config.keep_failed_output,
        }
    }
}

/// Engine callbacks forwarded as events to the controller
struct ChannelCallbacks {
    tx: UnboundedSender<EngineEvent>,
}

impl ChannelCallbacks {
    fn send(&self, event: EngineEvent) {
        // The receiver is gone once the merge has been resolved and drained.
        let _ = self.tx.send(event);
    }
}

impl EngineCallbacks for ChannelCallbacks {
    fn on_start(&self) {
        self.send(EngineEvent::Start);
    }

    fn on_progress(&self, message: &str) {
        self.send(EngineEvent::Progress(message.to_string()));
    }

    fn on_failure(&self, message: &str) {
        self.send(EngineEvent::Failure(message.to_string()));
    }

    fn on_success(&self, message: &str) {
        self.send(EngineEvent::Success(message.to_string()));
    }

    fn on_finish(&self) {
        self.send(EngineEvent::Finish);
    }
}

/// Interactor for the merge use case
pub struct MergeInteractor {
    engine_port: Arc<dyn EnginePort>,
    temp_port: Arc<dyn TempFilePort>,
    log_port: Arc<dyn LogPort>,
    settings: MergeSettings,
}

impl MergeInteractor {
    /// Create new merge interactor with injected ports
    pub fn new(
        engine_port: Arc<dyn EnginePort>,
        temp_port: Arc<dyn TempFilePort>,
        log_port: Arc<dyn LogPort>,
        settings: MergeSettings,
    ) -> Self {
        Self {
            engine_port,
            temp_port,
            log_port,
            settings,
        }
    }

    pub fn settings(&self) -> &MergeSettings {
        &self.settings
    }

    /// Merge the request's clips into a fresh temp output
    pub async fn execute(&self, request: MergeRequest) -> Result<MergeOutput, DomainError> {
        self.execute_with_cancel(request, CancellationToken::new()).await
    }

    /// Run a merge and hand the outcome to `sink` exactly once
    pub async fn execute_into(&self, request: MergeRequest, sink: Box<dyn ResultSink>) {
        let result = self.execute(request).await;
        sink.resolve(BridgePayload::from_result(&result));
    }

    /// Merge, resolving as cancelled as soon as `cancel` fires
    pub async fn execute_with_cancel(
        &self,
        request: MergeRequest,
        cancel: CancellationToken,
    ) -> Result<MergeOutput, DomainError> {
        self.log_port
            .log_event(
                &LogEvent::new(LogLevel::Info, "Starting merge")
                    .with("inputs", request.input_count())
                    .with("speed_factor", request.options.speed_factor),
            )
            .await;

        // Validation happens before any filesystem access.
        if let Err(e) = request.validate() {
            self.log_port.error(&format!("Rejected merge request: {}", e)).await;
            return Err(e);
        }

        let output_path = match self.temp_port.allocate(&self.settings.output_extension).await {
            Ok(path) => path,
            Err(e) => {
                let e = match e {
                    DomainError::TempAllocationFailure(_) => e,
                    other => DomainError::TempAllocationFailure(other.to_string()),
                };
                self.log_port.error(&format!("{}", e)).await;
                return Err(e);
            }
        };

        let command = match compile_request(&request, &output_path) {
            Ok(command) => command,
            Err(e) => {
                self.log_port.error(&format!("Failed to compile merge: {}", e)).await;
                self.cleanup_failed_output(&output_path).await;
                return Err(e);
            }
        };
        self.log_port
            .debug(&format!(
                "{} {}",
                self.engine_port.name(),
                command.display_line()
            ))
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let callbacks: Arc<dyn EngineCallbacks> = Arc::new(ChannelCallbacks { tx });
        let engine_cancel = cancel.child_token();
        // Abort the engine if this future is dropped before a terminal outcome.
        let _engine_guard = engine_cancel.clone().drop_guard();

        let mut handle = ExecutionHandle::new(&output_path);

        if let Err(e) = self
            .engine_port
            .submit(&command.args, callbacks, engine_cancel.clone())
            .await
        {
            let e = match e {
                DomainError::EngineInvocationFailure(_) => e,
                other => DomainError::EngineInvocationFailure(other.to_string()),
            };
            self.log_port
                .error(&format!("Engine rejected merge {}: {}", handle.id(), e))
                .await;
            self.cleanup_failed_output(&output_path).await;
            return Err(e);
        }

        let outcome = self.await_outcome(&mut handle, &mut rx, &cancel).await;

        if matches!(
            outcome,
            Err(DomainError::Cancelled(_)) | Err(DomainError::TimedOut(_))
        ) {
            engine_cancel.cancel();
            // The output may still be open until the engine acknowledges the abort.
            self.await_engine_exit(&handle, &mut rx).await;
        }
        self.spawn_drain(handle.clone(), rx);

        match outcome {
            Ok(output) => {
                self.log_port
                    .log_event(
                        &LogEvent::new(LogLevel::Info, "Merge completed")
                            .with("handle", handle.id())
                            .with("output", output.path.display())
                            .with("progress_events", handle.progress_events()),
                    )
                    .await;
                Ok(output)
            }
            Err(e) => {
                self.log_port
                    .error(&format!("Merge {} failed: {}", handle.id(), e))
                    .await;
                self.cleanup_failed_output(&output_path).await;
                Err(e)
            }
        }
    }

    /// Feed engine events to the handle until the first terminal one
    async fn await_outcome(
        &self,
        handle: &mut ExecutionHandle,
        rx: &mut UnboundedReceiver<EngineEvent>,
        cancel: &CancellationToken,
    ) -> Result<MergeOutput, DomainError> {
        let deadline = self.settings.timeout.map(|timeout| Instant::now() + timeout);

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => EngineEvent::Cancelled,
                _ = sleep_until(deadline) => EngineEvent::TimedOut,
                received = rx.recv() => match received {
                    Some(event) => event,
                    None => EngineEvent::Failure(
                        "engine stopped reporting before a terminal outcome".to_string(),
                    ),
                },
            };

            if let EngineEvent::Progress(message) = &event {
                self.report_progress(handle, message).await;
            }

            match handle.apply(event) {
                Transition::Advanced(ExecutionState::Running) => {
                    self.log_port
                        .info(&format!("Engine started merge {}", handle.id()))
                        .await;
                }
                Transition::Resolved(result) => return result,
                Transition::Advanced(_) | Transition::Observed | Transition::Ignored => {}
            }
        }
    }

    /// Wait, bounded by [`ENGINE_EXIT_GRACE`], for a cancelled engine to finish
    async fn await_engine_exit(
        &self,
        handle: &ExecutionHandle,
        rx: &mut UnboundedReceiver<EngineEvent>,
    ) {
        let finished = tokio::time::timeout(ENGINE_EXIT_GRACE, async {
            while let Some(event) = rx.recv().await {
                if event == EngineEvent::Finish {
                    break;
                }
            }
        })
        .await;

        if finished.is_err() {
            self.log_port
                .warn(&format!(
                    "Engine did not stop within {:?} after merge {} was aborted",
                    ENGINE_EXIT_GRACE,
                    handle.id()
                ))
                .await;
        }
    }

    async fn report_progress(&self, handle: &ExecutionHandle, message: &str) {
        let progress = EngineProgress::parse(message);
        let mut event = LogEvent::new(LogLevel::Debug, &progress.raw).with("handle", handle.id());
        if let Some(frame) = progress.frame {
            event = event.with("frame", frame);
        }
        if let Some(out_time) = progress.out_time {
            event = event.with("out_time", out_time);
        }
        if let Some(speed) = progress.speed {
            event = event.with("speed", speed);
        }
        self.log_port.log_event(&event).await;
    }

    /// Observe callbacks that arrive after resolution without acting on them
    fn spawn_drain(&self, mut handle: ExecutionHandle, mut rx: UnboundedReceiver<EngineEvent>) {
        let log_port = Arc::clone(&self.log_port);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let name = event.name();
                if handle.apply(event) == Transition::Ignored {
                    log_port
                        .debug(&format!(
                            "Ignoring {} callback for resolved merge {} ({})",
                            name,
                            handle.id(),
                            handle.state()
                        ))
                        .await;
                }
            }
        });
    }

    async fn cleanup_failed_output(&self, path: &Path) {
        if self.settings.keep_failed_output {
            self.log_port
                .info(&format!("Keeping failed output at {}", path.display()))
                .await;
            return;
        }

        if let Err(e) = self.temp_port.discard(path).await {
            self.log_port
                .warn(&format!("Failed to remove failed output: {}", e))
                .await;
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
