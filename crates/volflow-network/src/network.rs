//! Processor network
//!
//! [`ProcessorNetwork`] owns every processor (and through them every port)
//! in a slot arena. It enforces the connection rules, propagates
//! invalidation from changed ports to the processors that depend on them
//! and evaluates invalid processors in dependency order.
//!
//! # Connection rules
//!
//! An outport may be connected to an inport when:
//!
//! - both ports exist and are distinct, the first is an outport and the
//!   second an inport
//! - they are not connected yet, and a single-connection inport is free
//! - they belong to different processors and carry the same [`PortType`]
//! - both or neither are loop ports
//! - a non-loop edge does not close a cycle of non-loop edges
//!
//! Loop-port edges are exempt from the cycle check, which is what allows
//! intentional feedback loops.
//!
//! [`PortType`]: crate::port::PortType

use crate::error::{NetworkError, NetworkResult};
use crate::observer::{NetworkEvent, NetworkObserver, Observer};
use crate::port::{Port, PortRef};
use crate::processor::{InvalidationLevel, ProcessContext, Processor, ProcessorBody, ProcessorId};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::{debug, trace, warn};

/// Reason a connection was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionRefusal {
    /// A port reference does not resolve
    UnknownPort,
    /// Both references name the same port
    SamePort,
    /// The first port is not an outport or the second not an inport
    WrongDirection,
    /// The ports are already connected
    AlreadyConnected,
    /// The inport accepts a single connection and has one
    InportOccupied,
    /// Both ports belong to the same processor
    SameProcessor,
    /// The port types differ
    TypeMismatch,
    /// Exactly one of the ports is a loop port
    LoopPortMismatch,
    /// The edge would close a cycle of non-loop edges
    IllegalLoop,
}

impl fmt::Display for ConnectionRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ConnectionRefusal::UnknownPort => "unknown port",
            ConnectionRefusal::SamePort => "same port",
            ConnectionRefusal::WrongDirection => "wrong port direction",
            ConnectionRefusal::AlreadyConnected => "already connected",
            ConnectionRefusal::InportOccupied => "inport already connected",
            ConnectionRefusal::SameProcessor => "ports of the same processor",
            ConnectionRefusal::TypeMismatch => "port types differ",
            ConnectionRefusal::LoopPortMismatch => "loop port connected to non-loop port",
            ConnectionRefusal::IllegalLoop => "illegal loop",
        };
        f.write_str(reason)
    }
}

/// A dataflow network of processors
///
/// # Examples
///
/// ```
/// use volflow_network::{
///     NetworkResult, PortSpec, PortType, ProcessContext, ProcessorBody, ProcessorNetwork,
/// };
/// use std::any::Any;
///
/// struct Relay;
///
/// impl ProcessorBody for Relay {
///     fn class_name(&self) -> &'static str {
///         "Relay"
///     }
///     fn ports(&self) -> Vec<PortSpec> {
///         vec![
///             PortSpec::inport("in", PortType::Scalar),
///             PortSpec::outport("out", PortType::Scalar),
///         ]
///     }
///     fn process(&mut self, _ctx: &mut ProcessContext) -> NetworkResult<()> {
///         Ok(())
///     }
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///     fn as_any_mut(&mut self) -> &mut dyn Any {
///         self
///     }
/// }
///
/// let mut network = ProcessorNetwork::new();
/// let a = network.add_processor(Box::new(Relay), "a").unwrap();
/// let b = network.add_processor(Box::new(Relay), "b").unwrap();
/// let out = network.port_ref(a, "out").unwrap();
/// let inp = network.port_ref(b, "in").unwrap();
///
/// assert!(network.connect_ports(inp, out));
/// assert!(!network.connect_ports(out, inp)); // already connected
/// assert!(network.add_processor(Box::new(Relay), "a").is_err());
/// ```
#[derive(Default)]
pub struct ProcessorNetwork {
    slots: Vec<Option<Processor>>,
    observers: Vec<Observer>,
}

impl fmt::Debug for ProcessorNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorNetwork")
            .field("processors", &self.processors().collect::<Vec<_>>())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Drop for ProcessorNetwork {
    fn drop(&mut self) {
        self.deinitialize();
    }
}

impl ProcessorNetwork {
    /// Create an empty network
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Processors
    // ------------------------------------------------------------------

    /// Add a processor.
    ///
    /// An empty `name` selects the body's default name.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DuplicateName`] if the name is taken and
    /// [`NetworkError::DuplicatePortId`] if the body declares a port id
    /// more than once.
    pub fn add_processor(
        &mut self,
        body: Box<dyn ProcessorBody>,
        name: &str,
    ) -> NetworkResult<ProcessorId> {
        let name = if name.is_empty() {
            body.default_name()
        } else {
            name.to_string()
        };
        if self.processor_by_name(&name).is_some() {
            return Err(NetworkError::DuplicateName(name));
        }
        let mut port_ids = HashSet::new();
        let duplicate = body
            .ports()
            .into_iter()
            .find(|spec| !port_ids.insert(spec.id.clone()));
        if let Some(spec) = duplicate {
            return Err(NetworkError::DuplicatePortId {
                processor: name,
                port: spec.id,
            });
        }

        let id = ProcessorId(self.slots.len());
        let processor = Processor::new(name.clone(), body);
        debug!(
            target: "volflow-network",
            %id,
            name = %name,
            class = processor.class_name(),
            "processor added"
        );
        self.slots.push(Some(processor));
        self.notify(NetworkEvent::ProcessorAdded { id, name });
        Ok(id)
    }

    /// Remove a processor, disconnecting all of its ports first.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::ProcessorNotInNetwork`] for an unknown id.
    pub fn remove_processor(&mut self, id: ProcessorId) -> NetworkResult<()> {
        let processor = self.get(id)?;
        let name = processor.name().to_string();
        for index in 0..processor.ports().len() {
            self.disconnect_all(PortRef::new(id, index));
        }

        self.notify(NetworkEvent::ProcessorRemoved {
            id,
            name: name.clone(),
        });
        if let Some(mut processor) = self.slots[id.0].take() {
            processor.deinitialize();
        }
        debug!(target: "volflow-network", %id, name = %name, "processor removed");
        Ok(())
    }

    /// Rename a processor.
    ///
    /// An empty `name` selects the body's default name.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::ProcessorNotInNetwork`] for an unknown id and
    /// [`NetworkError::DuplicateName`] if another processor has the name.
    pub fn set_processor_name(&mut self, id: ProcessorId, name: &str) -> NetworkResult<()> {
        let processor = self.get(id)?;
        let name = if name.is_empty() {
            processor.body().default_name()
        } else {
            name.to_string()
        };
        if processor.name() == name {
            return Ok(());
        }
        if self.processor_by_name(&name).is_some() {
            return Err(NetworkError::DuplicateName(name));
        }

        let processor = self.get_mut(id)?;
        let old_name = processor.name().to_string();
        processor.set_name(name.clone());
        self.notify(NetworkEvent::ProcessorRenamed {
            id,
            old_name,
            new_name: name,
        });
        Ok(())
    }

    /// A name not yet used in the network: `base`, `base 2`, `base 3`, ...
    pub fn unique_processor_name(&self, base: &str) -> String {
        if self.processor_by_name(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base} {n}"))
            .find(|name| self.processor_by_name(name).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    fn get(&self, id: ProcessorId) -> NetworkResult<&Processor> {
        self.processor(id)
            .ok_or(NetworkError::ProcessorNotInNetwork(id))
    }

    fn get_mut(&mut self, id: ProcessorId) -> NetworkResult<&mut Processor> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(NetworkError::ProcessorNotInNetwork(id))
    }

    /// Borrow a processor
    pub fn processor(&self, id: ProcessorId) -> Option<&Processor> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Whether `id` refers to a processor of this network
    pub fn contains(&self, id: ProcessorId) -> bool {
        self.processor(id).is_some()
    }

    /// Find a processor by name
    pub fn processor_by_name(&self, name: &str) -> Option<ProcessorId> {
        self.processors()
            .find(|(_, p)| p.name() == name)
            .map(|(id, _)| id)
    }

    /// Iterate over all processors in insertion order
    pub fn processors(&self) -> impl Iterator<Item = (ProcessorId, &Processor)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|p| (ProcessorId(i), p)))
    }

    /// Number of processors
    pub fn num_processors(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the network holds no processor
    pub fn is_empty(&self) -> bool {
        self.num_processors() == 0
    }

    /// Borrow a processor's body as its concrete type
    pub fn body<T: ProcessorBody>(&self, id: ProcessorId) -> Option<&T> {
        self.processor(id)?.body().as_any().downcast_ref()
    }

    /// Mutably borrow a processor's body as its concrete type.
    ///
    /// The processor is invalidated at [`InvalidationLevel::InvalidResult`]
    /// since its parameters may change.
    pub fn body_mut<T: ProcessorBody>(&mut self, id: ProcessorId) -> Option<&mut T> {
        let processor = self.slots.get_mut(id.0)?.as_mut()?;
        if !processor.body().as_any().is::<T>() {
            return None;
        }
        processor.invalidate(InvalidationLevel::InvalidResult);
        processor.body_mut().as_any_mut().downcast_mut()
    }

    /// Raise a processor's invalidation level.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::ProcessorNotInNetwork`] for an unknown id.
    pub fn invalidate_processor(
        &mut self,
        id: ProcessorId,
        level: InvalidationLevel,
    ) -> NetworkResult<()> {
        self.get_mut(id)?.invalidate(level);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ports
    // ------------------------------------------------------------------

    /// Reference to the port `port_id` of processor `id`
    pub fn port_ref(&self, id: ProcessorId, port_id: &str) -> Option<PortRef> {
        let index = self.processor(id)?.port_index(port_id)?;
        Some(PortRef::new(id, index))
    }

    /// Borrow a port
    pub fn port(&self, port: PortRef) -> Option<&Port> {
        self.processor(port.processor)?.ports().get(port.index)
    }

    fn port_mut(&mut self, port: PortRef) -> Option<&mut Port> {
        self.slots
            .get_mut(port.processor.0)?
            .as_mut()?
            .ports
            .get_mut(port.index)
    }

    /// Ports connected to `port` (empty for unknown ports)
    pub fn connections(&self, port: PortRef) -> &[PortRef] {
        self.port(port).map(Port::connections).unwrap_or(&[])
    }

    fn unknown_port(&self, port: PortRef) -> NetworkError {
        NetworkError::UnknownPort {
            processor: self
                .processor(port.processor)
                .map(|p| p.name().to_string())
                .unwrap_or_else(|| port.processor.to_string()),
            port: self
                .port(port)
                .map(|p| p.id().to_string())
                .unwrap_or_else(|| port.index.to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Why connecting `outport` to `inport` would be refused, if it would.
    pub fn connection_refusal(&self, outport: PortRef, inport: PortRef) -> Option<ConnectionRefusal> {
        let (Some(out), Some(inp)) = (self.port(outport), self.port(inport)) else {
            return Some(ConnectionRefusal::UnknownPort);
        };
        if outport == inport {
            return Some(ConnectionRefusal::SamePort);
        }
        if !out.is_outport() || !inp.is_inport() {
            return Some(ConnectionRefusal::WrongDirection);
        }
        if out.is_connected_to(inport) {
            return Some(ConnectionRefusal::AlreadyConnected);
        }
        if !inp.allows_multiple_connections() && inp.is_connected() {
            return Some(ConnectionRefusal::InportOccupied);
        }
        if outport.processor == inport.processor {
            return Some(ConnectionRefusal::SameProcessor);
        }
        if out.port_type() != inp.port_type() {
            return Some(ConnectionRefusal::TypeMismatch);
        }
        if out.is_loop_port() != inp.is_loop_port() {
            return Some(ConnectionRefusal::LoopPortMismatch);
        }
        if !out.is_loop_port() && self.detect_illegal_loop(outport.processor, inport.processor) {
            return Some(ConnectionRefusal::IllegalLoop);
        }
        None
    }

    /// Whether `outport` may be connected to `inport`.
    pub fn test_connectivity(&self, outport: PortRef, inport: PortRef) -> bool {
        self.connection_refusal(outport, inport).is_none()
    }

    /// Whether a new edge `from -> to` would close a cycle of non-loop edges.
    ///
    /// Breadth-first search from `{from, to}` along non-loop outport
    /// connections; reaching `from` again means the edge is illegal.
    fn detect_illegal_loop(&self, from: ProcessorId, to: ProcessorId) -> bool {
        if from == to {
            return true;
        }
        let mut visited = HashSet::from([from, to]);
        let mut frontier = VecDeque::from([from, to]);

        while let Some(current) = frontier.pop_front() {
            let Some(processor) = self.processor(current) else {
                continue;
            };
            for port in processor.outports().filter(|p| !p.is_loop_port()) {
                for connected in port.connections() {
                    let next = connected.processor;
                    if next == from {
                        return true;
                    }
                    if visited.insert(next) {
                        frontier.push_back(next);
                    }
                }
            }
        }
        false
    }

    /// Connect an outport to an inport.
    ///
    /// On success the outport's processor is invalidated at the outport's
    /// level, observers are notified and the inport is invalidated. Returns
    /// `false` without side effects if the connection is refused.
    pub fn connect(&mut self, outport: PortRef, inport: PortRef) -> bool {
        if let Some(reason) = self.connection_refusal(outport, inport) {
            debug!(
                target: "volflow-network",
                ?outport,
                ?inport,
                %reason,
                "connection refused"
            );
            return false;
        }

        let mut level = InvalidationLevel::Valid;
        if let Some(out) = self.port_mut(outport) {
            out.connections.push(inport);
            level = out.invalidation_level();
        }
        if let Some(inp) = self.port_mut(inport) {
            inp.connections.push(outport);
        }
        if let Some(processor) = self.slots[outport.processor.0].as_mut() {
            processor.invalidate(level);
        }

        debug!(target: "volflow-network", ?outport, ?inport, "ports connected");
        self.notify(NetworkEvent::PortsConnected { outport, inport });
        self.invalidate_port(inport);
        true
    }

    fn normalize(&self, a: PortRef, b: PortRef) -> (PortRef, PortRef) {
        match self.port(a) {
            Some(port) if port.is_inport() => (b, a),
            _ => (a, b),
        }
    }

    /// Connect two ports given in either order.
    pub fn connect_ports(&mut self, a: PortRef, b: PortRef) -> bool {
        let (outport, inport) = self.normalize(a, b);
        self.connect(outport, inport)
    }

    /// Disconnect two ports given in either order.
    ///
    /// Returns `false` if they were not connected.
    pub fn disconnect_ports(&mut self, a: PortRef, b: PortRef) -> bool {
        let (outport, inport) = self.normalize(a, b);
        let connected = self
            .port(outport)
            .is_some_and(|out| out.is_outport() && out.is_connected_to(inport));
        if !connected {
            return false;
        }

        let mut level = InvalidationLevel::Valid;
        if let Some(out) = self.port_mut(outport) {
            out.connections.retain(|&p| p != inport);
            level = out.invalidation_level();
        }
        if let Some(inp) = self.port_mut(inport) {
            inp.connections.retain(|&p| p != outport);
        }
        if let Some(processor) = self.slots[outport.processor.0].as_mut() {
            processor.invalidate(level);
        }

        debug!(target: "volflow-network", ?outport, ?inport, "ports disconnected");
        self.invalidate_port(inport);
        self.notify(NetworkEvent::PortsDisconnected { outport, inport });
        true
    }

    /// Disconnect every connection of a port.
    pub fn disconnect_all(&mut self, port: PortRef) {
        let others = self.connections(port).to_vec();
        for other in others {
            self.disconnect_ports(port, other);
        }
    }

    /// Mark a port as changed and propagate.
    ///
    /// An outport forwards the invalidation to every connected inport; an
    /// inport invalidates its processor at the port's invalidation level.
    pub fn invalidate_port(&mut self, port: PortRef) {
        let mut pending = vec![port];
        let mut visited = HashSet::new();

        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(processor) = self
                .slots
                .get_mut(current.processor.0)
                .and_then(Option::as_mut)
            else {
                continue;
            };
            let Some(port) = processor.ports.get_mut(current.index) else {
                continue;
            };

            port.has_changed = true;
            if port.is_outport() {
                pending.extend(port.connections.iter().copied());
            } else {
                let level = port.invalidation_level();
                processor.invalidate(level);
                trace!(
                    target: "volflow-network",
                    processor = processor.name(),
                    ?level,
                    "processor invalidated"
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Loop ports
    // ------------------------------------------------------------------

    fn loop_port(&self, port: PortRef) -> NetworkResult<&Port> {
        let resolved = self.port(port).ok_or_else(|| self.unknown_port(port))?;
        if !resolved.is_loop_port() {
            return Err(NetworkError::NotALoopPort(resolved.id().to_string()));
        }
        Ok(resolved)
    }

    /// Set the iteration count of a loop inport.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::NotALoopPort`] unless `port` is a loop inport.
    pub fn set_num_loop_iterations(&mut self, port: PortRef, iterations: usize) -> NetworkResult<()> {
        let resolved = self.loop_port(port)?;
        if !resolved.is_inport() {
            return Err(NetworkError::NotALoopPort(format!(
                "{} is a loop outport; its iteration count follows its connection",
                resolved.id()
            )));
        }
        if let Some(inp) = self.port_mut(port) {
            inp.num_loop_iterations = iterations;
        }
        Ok(())
    }

    /// Iteration count of a loop port.
    ///
    /// An inport reports its own count; an outport reports the count of the
    /// inport it is connected to, or 1 when unconnected.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::NotALoopPort`] for a non-loop port.
    pub fn num_loop_iterations(&self, port: PortRef) -> NetworkResult<usize> {
        let resolved = self.loop_port(port)?;
        if resolved.is_inport() {
            return Ok(resolved.num_loop_iterations);
        }
        Ok(resolved
            .connections()
            .first()
            .and_then(|&other| self.port(other))
            .map_or(1, |other| other.num_loop_iterations))
    }

    /// Current iteration of a loop port.
    pub fn current_loop_iteration(&self, port: PortRef) -> NetworkResult<usize> {
        self.loop_port(port).map(|p| p.current_loop_iteration)
    }

    /// Set the current iteration of a loop port.
    pub fn set_current_loop_iteration(&mut self, port: PortRef, iteration: usize) -> NetworkResult<()> {
        self.loop_port(port)?;
        if let Some(p) = self.port_mut(port) {
            p.current_loop_iteration = iteration;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle and evaluation
    // ------------------------------------------------------------------

    /// Initialize every processor that is not initialized yet.
    pub fn initialize(&mut self) -> NetworkResult<()> {
        for processor in self.slots.iter_mut().flatten() {
            processor.initialize()?;
        }
        Ok(())
    }

    /// Deinitialize every processor.
    pub fn deinitialize(&mut self) {
        for processor in self.slots.iter_mut().flatten() {
            processor.deinitialize();
        }
    }

    /// Processors ordered so that every non-loop edge points forward.
    ///
    /// Ties are broken by insertion order.
    pub fn topological_order(&self) -> Vec<ProcessorId> {
        let mut in_degree: HashMap<ProcessorId, usize> =
            self.processors().map(|(id, _)| (id, 0)).collect();
        for (_, processor) in self.processors() {
            for port in processor.outports().filter(|p| !p.is_loop_port()) {
                for connected in port.connections() {
                    if let Some(degree) = in_degree.get_mut(&connected.processor) {
                        *degree += 1;
                    }
                }
            }
        }

        let mut ready: BTreeSet<ProcessorId> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut order = Vec::with_capacity(in_degree.len());

        while let Some(id) = ready.pop_first() {
            order.push(id);
            let Some(processor) = self.processor(id) else {
                continue;
            };
            for port in processor.outports().filter(|p| !p.is_loop_port()) {
                for connected in port.connections() {
                    if let Some(degree) = in_degree.get_mut(&connected.processor) {
                        *degree -= 1;
                        if *degree == 0 {
                            ready.insert(connected.processor);
                        }
                    }
                }
            }
        }
        order
    }

    fn context_for(&self, processor: &Processor) -> ProcessContext {
        let mut ctx = ProcessContext::new(processor.name());
        for port in processor.ports() {
            if port.is_inport() {
                let data = port
                    .connections()
                    .iter()
                    .filter_map(|&other| self.port(other)?.data().cloned())
                    .collect();
                ctx.add_input(port.id(), data, port.has_changed());
            } else {
                ctx.add_output(port.id(), port.port_type().clone());
            }
        }
        ctx
    }

    /// Run every invalid, ready processor once, upstream first.
    ///
    /// Each processor reads the data of the outports connected to its
    /// inports and publishes new outport data, which invalidates the
    /// processors downstream so they run later in the same pass. Edges
    /// between loop ports do not order processors; data sent back through
    /// a loop is seen on the next call.
    ///
    /// # Returns
    ///
    /// The number of processors that ran.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::ProcessingFailed`] when a processor fails;
    /// that processor stays invalid and the pass stops.
    pub fn process(&mut self) -> NetworkResult<usize> {
        let mut count = 0;
        for id in self.topological_order() {
            let processor = self.get(id)?;
            if processor.is_valid() || !processor.is_ready() {
                continue;
            }
            let mut ctx = self.context_for(processor);

            let processor = self.get_mut(id)?;
            trace!(target: "volflow-network", processor = processor.name(), "processing");
            let result = processor
                .initialize()
                .and_then(|()| processor.body_mut().process(&mut ctx));
            if let Err(err) = result {
                warn!(
                    target: "volflow-network",
                    processor = processor.name(),
                    error = %err,
                    "processing failed"
                );
                return Err(match err {
                    err @ NetworkError::ProcessingFailed { .. } => err,
                    other => NetworkError::ProcessingFailed {
                        processor: processor.name().to_string(),
                        message: other.to_string(),
                    },
                });
            }

            processor.set_valid();
            for port in processor.ports.iter_mut().filter(|p| p.is_inport()) {
                port.has_changed = false;
            }
            let mut published = Vec::new();
            for (port_id, data) in ctx.into_updates() {
                if let Some(index) = processor.port_index(&port_id) {
                    processor.ports[index].data = data;
                    published.push(PortRef::new(id, index));
                }
            }
            for port in published {
                self.invalidate_port(port);
            }
            count += 1;
        }
        debug!(target: "volflow-network", processed = count, "network processed");
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Register an observer
    pub fn add_observer(&mut self, observer: Box<dyn NetworkObserver>) {
        self.observers.push(Observer::Hooks(observer));
    }

    /// Register a closure called for every change
    pub fn on_change(&mut self, callback: impl FnMut(&NetworkEvent) + 'static) {
        self.observers.push(Observer::Callback(Box::new(callback)));
    }

    fn notify(&mut self, event: NetworkEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }
}
