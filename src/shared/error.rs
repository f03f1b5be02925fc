// This is free and unencumbered software released into the public domain.

use crate::shared::SecurityLevel;
use std::error::Error as StdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unauthorized, credentials may be invalid")]
    Unauthorized,

    #[error("security level {level} is too low, {required} is required")]
    PermissionDenied {
        level: SecurityLevel,
        required: SecurityLevel,
    },

    /// The device answered with an error sentinel; holds the full body.
    #[error("device error: {0}")]
    Protocol(String),

    #[error("parameter not found: {0}")]
    KeyNotFound(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("value {value} is out of range {start}..={end}")]
    OutOfRange { value: i64, start: i64, end: i64 },

    #[error("transport error while {context}")]
    Transport {
        context: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{0}")]
    Other(String),
}

impl CameraError {
    #[inline]
    pub fn transport(context: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::Transport {
            context,
            source: Box::new(source),
        }
    }

    #[inline]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    #[inline]
    pub fn protocol(body: impl Into<String>) -> Self {
        Self::Protocol(body.into())
    }

    #[inline]
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound(key.into())
    }

    #[inline]
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
