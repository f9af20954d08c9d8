// Domain layer - Core business logic

pub mod compiler;
pub mod errors;
pub mod execution;
pub mod graph;
pub mod model;
pub mod progress;
