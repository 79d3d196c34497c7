//! Ports - typed, directional connection endpoints
//!
//! Every [`Port`] belongs to exactly one processor and is declared by that
//! processor's body through a [`PortSpec`]. Ports of a network refer to each
//! other through [`PortRef`]s (processor id plus port index); the network
//! keeps connection lists symmetric.

use crate::processor::{InvalidationLevel, ProcessorId};
use std::fmt;
use volflow_core::Volume;

/// Direction of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    /// Receives data
    In,
    /// Provides data
    Out,
}

/// Kind of data carried by a port
///
/// Two ports can only be connected when their types are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PortType {
    /// Volume data
    Volume,
    /// Text data
    Text,
    /// Scalar value
    Scalar,
    /// Application-defined data, compared by name
    Custom(String),
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortType::Volume => write!(f, "volume"),
            PortType::Text => write!(f, "text"),
            PortType::Scalar => write!(f, "scalar"),
            PortType::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Data held by an outport
#[derive(Debug, Clone, PartialEq)]
pub enum PortData {
    /// A volume; cloning shares the voxel grid
    Volume(Volume),
    /// Text
    Text(String),
    /// Scalar value
    Scalar(f64),
}

impl PortData {
    /// Port type able to carry this data.
    pub fn port_type(&self) -> PortType {
        match self {
            PortData::Volume(_) => PortType::Volume,
            PortData::Text(_) => PortType::Text,
            PortData::Scalar(_) => PortType::Scalar,
        }
    }

    /// Borrow the volume, if this is volume data.
    pub fn as_volume(&self) -> Option<&Volume> {
        match self {
            PortData::Volume(volume) => Some(volume),
            _ => None,
        }
    }
}

/// Declaration of a port, supplied by a processor body
#[derive(Debug, Clone, PartialEq)]
pub struct PortSpec {
    /// Identifier, unique within the processor
    pub id: String,
    /// Direction
    pub direction: PortDirection,
    /// Data type
    pub port_type: PortType,
    /// Whether an inport accepts more than one connection
    pub allow_multiple_connections: bool,
    /// Whether this port belongs to a feedback loop
    pub is_loop_port: bool,
    /// Level at which the owning processor is invalidated
    pub invalidation_level: InvalidationLevel,
}

impl PortSpec {
    /// Declare an inport accepting a single connection
    pub fn inport(id: &str, port_type: PortType) -> Self {
        Self::new(id, PortDirection::In, port_type)
    }

    /// Declare an outport
    pub fn outport(id: &str, port_type: PortType) -> Self {
        Self::new(id, PortDirection::Out, port_type)
    }

    fn new(id: &str, direction: PortDirection, port_type: PortType) -> Self {
        PortSpec {
            id: id.to_string(),
            direction,
            port_type,
            allow_multiple_connections: direction == PortDirection::Out,
            is_loop_port: false,
            invalidation_level: InvalidationLevel::InvalidResult,
        }
    }

    /// Allow multiple connections on an inport
    pub fn with_multiple_connections(mut self) -> Self {
        self.allow_multiple_connections = true;
        self
    }

    /// Mark the port as a loop port
    pub fn as_loop_port(mut self) -> Self {
        self.is_loop_port = true;
        self
    }

    /// Set the invalidation level
    pub fn with_invalidation_level(mut self, level: InvalidationLevel) -> Self {
        self.invalidation_level = level;
        self
    }
}

/// Non-owning reference to a port of a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRef {
    /// Owning processor
    pub processor: ProcessorId,
    /// Index of the port within its processor
    pub index: usize,
}

impl PortRef {
    /// Create a port reference
    pub fn new(processor: ProcessorId, index: usize) -> Self {
        PortRef { processor, index }
    }
}

/// A port owned by a processor
#[derive(Debug, Clone)]
pub struct Port {
    spec: PortSpec,
    pub(crate) connections: Vec<PortRef>,
    pub(crate) has_changed: bool,
    pub(crate) initialized: bool,
    pub(crate) num_loop_iterations: usize,
    pub(crate) current_loop_iteration: usize,
    pub(crate) data: Option<PortData>,
}

impl Port {
    pub(crate) fn new(spec: PortSpec) -> Self {
        Port {
            spec,
            connections: Vec::new(),
            has_changed: false,
            initialized: false,
            num_loop_iterations: 1,
            current_loop_iteration: 0,
            data: None,
        }
    }

    /// Port identifier
    pub fn id(&self) -> &str {
        &self.spec.id
    }

    /// Port direction
    pub fn direction(&self) -> PortDirection {
        self.spec.direction
    }

    /// Whether this is an inport
    pub fn is_inport(&self) -> bool {
        self.spec.direction == PortDirection::In
    }

    /// Whether this is an outport
    pub fn is_outport(&self) -> bool {
        self.spec.direction == PortDirection::Out
    }

    /// Port data type
    pub fn port_type(&self) -> &PortType {
        &self.spec.port_type
    }

    /// Whether more than one connection is accepted (always true for outports)
    pub fn allows_multiple_connections(&self) -> bool {
        self.is_outport() || self.spec.allow_multiple_connections
    }

    /// Whether this port belongs to a feedback loop
    pub fn is_loop_port(&self) -> bool {
        self.spec.is_loop_port
    }

    /// Level at which the owning processor is invalidated
    pub fn invalidation_level(&self) -> InvalidationLevel {
        self.spec.invalidation_level
    }

    /// Connected ports
    pub fn connections(&self) -> &[PortRef] {
        &self.connections
    }

    /// Whether the port has at least one connection
    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }

    /// Whether `other` is connected to this port
    pub fn is_connected_to(&self, other: PortRef) -> bool {
        self.connections.contains(&other)
    }

    /// Dirty bit, set by invalidation and cleared when the owner has run
    pub fn has_changed(&self) -> bool {
        self.has_changed
    }

    /// Whether the owning processor has initialized this port
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Data currently held (outports)
    pub fn data(&self) -> Option<&PortData> {
        self.data.as_ref()
    }

    /// The declaration this port was created from
    pub fn spec(&self) -> &PortSpec {
        &self.spec
    }
}
