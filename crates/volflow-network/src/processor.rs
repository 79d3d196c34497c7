//! Processors - computation nodes of a network
//!
//! A [`Processor`] pairs the network-side state (name, ports, invalidation
//! level, lifecycle flag) with a boxed [`ProcessorBody`] supplying the
//! actual computation. Bodies declare their ports once; the processor
//! creates and owns them.

use crate::error::{NetworkError, NetworkResult};
use crate::port::{Port, PortData, PortSpec, PortType};
use std::any::Any;
use std::fmt;

/// Identifier of a processor within its network
///
/// Ids are never reused, so a stale id can be detected after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessorId(pub(crate) usize);

impl ProcessorId {
    /// Slot index in the network
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How much of a processor's state must be recomputed
///
/// Levels are ordered by severity; invalidating never lowers the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum InvalidationLevel {
    /// Up to date
    #[default]
    Valid,
    /// Output must be recomputed
    InvalidResult,
    /// Internal programs must be rebuilt
    InvalidProgram,
    /// Port configuration changed
    InvalidPorts,
}

/// Computation behind a processor
pub trait ProcessorBody: Any {
    /// Class name used by the registry and in network descriptions
    fn class_name(&self) -> &'static str;

    /// Name used when the processor is added without one
    fn default_name(&self) -> String {
        self.class_name().to_string()
    }

    /// Ports of this processor, in a fixed order
    fn ports(&self) -> Vec<PortSpec>;

    /// Compute outputs from inputs
    fn process(&mut self, ctx: &mut ProcessContext) -> NetworkResult<()>;

    /// Prepare resources; called once before the first `process`
    fn initialize(&mut self) -> NetworkResult<()> {
        Ok(())
    }

    /// Release resources
    fn deinitialize(&mut self) {}

    /// Persistent parameters as `(name, value)` pairs
    fn properties(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Restore a parameter written by [`ProcessorBody::properties`]
    fn set_property(&mut self, name: &str, _value: &str) -> NetworkResult<()> {
        Err(NetworkError::UnknownProperty {
            class: self.class_name().to_string(),
            property: name.to_string(),
        })
    }

    /// Upcast for downcasting to the concrete body
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete body
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A node of a processor network
pub struct Processor {
    name: String,
    body: Box<dyn ProcessorBody>,
    pub(crate) ports: Vec<Port>,
    pub(crate) invalidation_level: InvalidationLevel,
    pub(crate) initialized: bool,
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("name", &self.name)
            .field("class", &self.body.class_name())
            .field("ports", &self.ports)
            .field("invalidation_level", &self.invalidation_level)
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl Processor {
    pub(crate) fn new(name: String, body: Box<dyn ProcessorBody>) -> Self {
        let ports = body.ports().into_iter().map(Port::new).collect();
        Processor {
            name,
            body,
            ports,
            invalidation_level: InvalidationLevel::InvalidResult,
            initialized: false,
        }
    }

    /// Processor name, unique within its network
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Class name of the body
    pub fn class_name(&self) -> &'static str {
        self.body.class_name()
    }

    /// All ports in declaration order
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Inports in declaration order
    pub fn inports(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(|p| p.is_inport())
    }

    /// Outports in declaration order
    pub fn outports(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(|p| p.is_outport())
    }

    /// Index of the port with the given id
    pub fn port_index(&self, id: &str) -> Option<usize> {
        self.ports.iter().position(|p| p.id() == id)
    }

    /// Port with the given id
    pub fn port(&self, id: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.id() == id)
    }

    /// Current invalidation level
    pub fn invalidation_level(&self) -> InvalidationLevel {
        self.invalidation_level
    }

    /// Whether the processor is up to date
    pub fn is_valid(&self) -> bool {
        self.invalidation_level == InvalidationLevel::Valid
    }

    /// Raise the invalidation level to at least `level`.
    pub fn invalidate(&mut self, level: InvalidationLevel) {
        self.invalidation_level = self.invalidation_level.max(level);
    }

    pub(crate) fn set_valid(&mut self) {
        self.invalidation_level = InvalidationLevel::Valid;
    }

    /// Whether every non-loop inport is connected
    pub fn is_ready(&self) -> bool {
        self.inports()
            .filter(|p| !p.is_loop_port())
            .all(|p| p.is_connected())
    }

    /// Whether the body has been initialized
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Borrow the body
    pub fn body(&self) -> &dyn ProcessorBody {
        self.body.as_ref()
    }

    pub(crate) fn body_mut(&mut self) -> &mut dyn ProcessorBody {
        self.body.as_mut()
    }

    pub(crate) fn initialize(&mut self) -> NetworkResult<()> {
        if self.initialized {
            return Ok(());
        }
        self.body.initialize()?;
        for port in &mut self.ports {
            port.initialized = true;
        }
        self.initialized = true;
        Ok(())
    }

    pub(crate) fn deinitialize(&mut self) {
        if !self.initialized {
            return;
        }
        self.body.deinitialize();
        for port in &mut self.ports {
            port.initialized = false;
        }
        self.initialized = false;
    }
}

struct InputSlot {
    id: String,
    data: Vec<PortData>,
    changed: bool,
}

struct OutputSlot {
    id: String,
    port_type: PortType,
    update: Option<Option<PortData>>,
}

/// View of a processor's ports during [`ProcessorBody::process`]
///
/// Inputs are the data of the outports connected to each inport; outputs
/// set here are published after `process` returns, invalidating everything
/// downstream.
pub struct ProcessContext {
    processor: String,
    inputs: Vec<InputSlot>,
    outputs: Vec<OutputSlot>,
}

impl ProcessContext {
    pub(crate) fn new(processor: &str) -> Self {
        ProcessContext {
            processor: processor.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub(crate) fn add_input(&mut self, id: &str, data: Vec<PortData>, changed: bool) {
        self.inputs.push(InputSlot {
            id: id.to_string(),
            data,
            changed,
        });
    }

    pub(crate) fn add_output(&mut self, id: &str, port_type: PortType) {
        self.outputs.push(OutputSlot {
            id: id.to_string(),
            port_type,
            update: None,
        });
    }

    /// Name of the running processor
    pub fn processor_name(&self) -> &str {
        &self.processor
    }

    /// First data item arriving at an inport.
    pub fn input(&self, id: &str) -> Option<&PortData> {
        self.inputs
            .iter()
            .find(|slot| slot.id == id)
            .and_then(|slot| slot.data.first())
    }

    /// All data items arriving at an inport, in connection order.
    pub fn inputs(&self, id: &str) -> &[PortData] {
        self.inputs
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| slot.data.as_slice())
            .unwrap_or(&[])
    }

    /// Whether an inport was invalidated since the last run.
    pub fn has_changed(&self, id: &str) -> bool {
        self.inputs.iter().any(|slot| slot.id == id && slot.changed)
    }

    fn output_slot(&mut self, id: &str) -> NetworkResult<&mut OutputSlot> {
        let processor = &self.processor;
        self.outputs
            .iter_mut()
            .find(|slot| slot.id == id)
            .ok_or_else(|| NetworkError::UnknownPort {
                processor: processor.clone(),
                port: id.to_string(),
            })
    }

    /// Publish data on an outport.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownPort`] if `id` is not an outport and
    /// [`NetworkError::PortTypeMismatch`] if the data does not fit its type.
    pub fn set_output(&mut self, id: &str, data: PortData) -> NetworkResult<()> {
        let slot = self.output_slot(id)?;
        if data.port_type() != slot.port_type {
            return Err(NetworkError::PortTypeMismatch {
                port: id.to_string(),
                expected: slot.port_type.to_string(),
            });
        }
        slot.update = Some(Some(data));
        Ok(())
    }

    /// Clear an outport's data.
    pub fn clear_output(&mut self, id: &str) -> NetworkResult<()> {
        self.output_slot(id)?.update = Some(None);
        Ok(())
    }

    pub(crate) fn into_updates(self) -> impl Iterator<Item = (String, Option<PortData>)> {
        self.outputs
            .into_iter()
            .filter_map(|slot| slot.update.map(|data| (slot.id, data)))
    }
}
