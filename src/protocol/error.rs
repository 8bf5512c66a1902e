//! Display protocol error types

use thiserror::Error;

use super::{DescriptionId, ProtocolVariant};

/// Result type for display protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised by a [`ProtocolQueue`](super::ProtocolQueue) implementation
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Could not reach the compositor or open a queue on its connection
    #[error("Wayland connection error: {0}")]
    Connection(String),

    /// Dispatching or round-tripping the event queue failed
    #[error("Wayland dispatch failed: {0}")]
    Dispatch(String),

    /// Binding a color-management global failed
    #[error("Failed to bind {variant} global: {reason}")]
    Bind {
        /// Variant that was being bound
        variant: ProtocolVariant,
        /// Backend supplied reason
        reason: String,
    },

    /// A request needed an object that was never created on this queue
    #[error("Protocol object missing: {0}")]
    MissingObject(&'static str),

    /// A token has no counterpart in the bound protocol's enum
    #[error("Unknown {kind} token {value} for {variant}")]
    UnknownToken {
        /// Variant the token was meant for
        variant: ProtocolVariant,
        /// Enum the token belongs to
        kind: &'static str,
        /// Raw wire value
        value: u32,
    },

    /// No image description with this id is alive on the queue
    #[error("Unknown image description {0}")]
    UnknownDescription(DescriptionId),
}
