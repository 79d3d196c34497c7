//! volflow-network - Processor/port dataflow networks for volflow
//!
//! This crate provides the dataflow graph that connects volume processors:
//!
//! - **Ports** - Typed, directional endpoints with dirty bits and loop
//!   iteration counters
//! - **Processors** - Nodes owning ports and a computation body
//! - **Networks** - Connection legality, illegal-loop detection,
//!   invalidation propagation and ordered evaluation
//! - **Observers** - Change notification through hooks or closures
//! - **Descriptions** - Text persistence of the logical graph
//!
//! # Examples
//!
//! ```
//! use std::any::Any;
//! use volflow_network::{
//!     InvalidationLevel, NetworkResult, PortData, PortSpec, PortType, ProcessContext,
//!     ProcessorBody, ProcessorNetwork,
//! };
//!
//! #[derive(Default)]
//! struct Counter(f64);
//!
//! impl ProcessorBody for Counter {
//!     fn class_name(&self) -> &'static str {
//!         "Counter"
//!     }
//!     fn ports(&self) -> Vec<PortSpec> {
//!         vec![PortSpec::outport("count", PortType::Scalar)]
//!     }
//!     fn process(&mut self, ctx: &mut ProcessContext) -> NetworkResult<()> {
//!         self.0 += 1.0;
//!         ctx.set_output("count", PortData::Scalar(self.0))
//!     }
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!     fn as_any_mut(&mut self) -> &mut dyn Any {
//!         self
//!     }
//! }
//!
//! let mut network = ProcessorNetwork::new();
//! let id = network.add_processor(Box::new(Counter::default()), "").unwrap();
//! assert_eq!(network.process().unwrap(), 1);
//! assert_eq!(network.process().unwrap(), 0);
//!
//! network.invalidate_processor(id, InvalidationLevel::InvalidResult).unwrap();
//! network.process().unwrap();
//! let port = network.port_ref(id, "count").unwrap();
//! assert_eq!(network.port(port).unwrap().data(), Some(&PortData::Scalar(2.0)));
//! ```

pub mod error;
pub mod network;
pub mod observer;
pub mod port;
pub mod processor;
pub mod serial;

pub use error::{NetworkError, NetworkResult};
pub use network::{ConnectionRefusal, ProcessorNetwork};
pub use observer::{NetworkEvent, NetworkObserver};
pub use port::{Port, PortData, PortDirection, PortRef, PortSpec, PortType};
pub use processor::{InvalidationLevel, ProcessContext, Processor, ProcessorBody, ProcessorId};
pub use serial::{
    ConnectionDescription, LoopIterationDescription, NetworkDescription, ProcessorDescription,
    ProcessorRegistry,
};
