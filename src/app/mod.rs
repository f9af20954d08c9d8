// Application layer - Use case interactors

pub mod bridge;
pub mod container;
pub mod merge_interactor;

// Re-export interactors
pub use bridge::{BridgePayload, ResultSink, StdoutJsonSink};
pub use container::{AppContainer, DefaultAppContainer};
pub use merge_interactor::{MergeInteractor, MergeSettings};
