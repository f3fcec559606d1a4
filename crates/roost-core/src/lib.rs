//! Roost Core Library
//!
//! This crate provides the domain models, error types, configuration and result
//! envelope shared by every Roost component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod result;

// Re-export commonly used types
pub use config::{
    BaseConfig, CacheDriver, Config, MediaLimits, ProxyConfig, RemoteConfig, TwitterCredentials,
};
pub use error::{
    AppError, BatchError, BatchProblem, ErrorMetadata, FieldMessage, LogLevel, OperationError,
    RemoteCallError, ValidationError,
};
pub use models::{
    ClassifiedUpload, Information, MediaCategory, MediaId, MediaUpload, SizeBoundary,
    SubmittedFile, TweetReference, UploadBatch,
};
pub use result::{IntoErrorMessages, OperationResult};
