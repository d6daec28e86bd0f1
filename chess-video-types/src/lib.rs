//! Configuration and quota data-transfer objects shared across the chess-video-index
//! workspace.
#![warn(missing_docs)]

mod config;

pub use config::{
    PipelineConfig, QualityTier, QuotaConfig, QuotaConsumptionStrategy, QuotaState,
    TrustedChannel, TrustedChannelFile,
};
