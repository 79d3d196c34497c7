//! Error types for volflow-network

use crate::processor::ProcessorId;
use thiserror::Error;

/// Errors raised by network operations
///
/// Refused connections are not errors; `connect_ports` and
/// `test_connectivity` report them as `false`.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Processor name already used in the network
    #[error("duplicate processor name: {0}")]
    DuplicateName(String),

    /// Processor id does not refer to a processor of this network
    #[error("processor {0} is not in the network")]
    ProcessorNotInNetwork(ProcessorId),

    /// Port not found on a processor
    #[error("processor '{processor}' has no port '{port}'")]
    UnknownPort { processor: String, port: String },

    /// Body declares two ports with the same id
    #[error("processor '{processor}' declares port '{port}' twice")]
    DuplicatePortId { processor: String, port: String },

    /// Loop-iteration operation on a port that does not support it
    #[error("not a loop port: {0}")]
    NotALoopPort(String),

    /// Output set with data of the wrong port type
    #[error("port '{port}' expects {expected} data")]
    PortTypeMismatch { port: String, expected: String },

    /// A processor's computation failed
    #[error("processor '{processor}' failed: {message}")]
    ProcessingFailed { processor: String, message: String },

    /// No factory registered for a processor class
    #[error("unknown processor class: {0}")]
    UnknownProcessorClass(String),

    /// Property not supported by a processor class
    #[error("processor class '{class}' has no property '{property}'")]
    UnknownProperty { class: String, property: String },

    /// Property value could not be parsed
    #[error("invalid value for property '{property}': {value}")]
    InvalidPropertyValue { property: String, value: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network description decode error
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] volflow_core::Error),
}

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;
