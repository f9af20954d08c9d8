use std::sync::Arc;

use crate::adapters::{CacheDirAdapter, FFmpegAdapter, MergerConfig, TracingLogAdapter};
use crate::app::merge_interactor::{MergeInteractor, MergeSettings};
use crate::domain::errors::DomainError;
use crate::ports::{EnginePort, LogPort, TempFilePort};

pub trait AppContainer: Send + Sync {
    fn merge_interactor(&self) -> Arc<MergeInteractor>;
    fn temp_files(&self) -> Arc<dyn TempFilePort>;
}

pub struct DefaultAppContainer {
    merge_interactor: Arc<MergeInteractor>,
    temp_port: Arc<dyn TempFilePort>,
}

impl DefaultAppContainer {
    pub fn new(config: &MergerConfig) -> Result<Self, DomainError> {
        let log_level = config.log_level()?;

        let engine_port = Arc::new(FFmpegAdapter::new(&config.ffmpeg_path));
        let temp_port = Arc::new(CacheDirAdapter::new(
            config
                .cache_dir
                .clone()
                .unwrap_or_else(CacheDirAdapter::default_cache_dir),
        ));
        let log_port = Arc::new(TracingLogAdapter::new(log_level));

        let merge_interactor = Arc::new(MergeInteractor::new(
            engine_port as Arc<dyn EnginePort>,
            Arc::clone(&temp_port) as Arc<dyn TempFilePort>,
            log_port as Arc<dyn LogPort>,
            MergeSettings::from_config(config),
        ));

        Ok(Self {
            merge_interactor,
            temp_port,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn merge_interactor(&self) -> Arc<MergeInteractor> {
        Arc::clone(&self.merge_interactor)
    }

    fn temp_files(&self) -> Arc<dyn TempFilePort> {
        Arc::clone(&self.temp_port) as Arc<dyn TempFilePort>
    }
}
