//! Error types for KINEMA

use thiserror::Error;

use crate::{GeneratorKind, Target};

/// Core KINEMA errors
#[derive(Error, Debug)]
pub enum KinemaError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    // Input errors
    #[error("Non-finite sample from {source_kind:?}: {field}")]
    NonFiniteSample {
        source_kind: GeneratorKind,
        field: &'static str,
    },

    #[error("Generator {generator:?} cannot drive target {target}")]
    TargetRejected {
        generator: GeneratorKind,
        target: Target,
    },

    // Skeleton errors
    #[error("Missing bone: {0}")]
    MissingBone(String),

    #[error("Skeleton error: {0}")]
    SkeletonError(String),

    // Transport errors
    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Transport error: {0}")]
    TransportError(String),
}

/// Result type for KINEMA operations
pub type KinemaResult<T> = Result<T, KinemaError>;
