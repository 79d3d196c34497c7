//! Invalidation and evaluation regression test
//!
//! Dirty-bit propagation from ports to processors, invalidation levels on
//! connect and disconnect, and the evaluation order of `process`.
//!
//! Run with:
//! ```
//! cargo test -p volflow-network --test invalidation_reg
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use volflow_network::{
    InvalidationLevel, NetworkError, NetworkResult, PortData, PortSpec, PortType, ProcessContext,
    ProcessorBody, ProcessorId, ProcessorNetwork,
};
use volflow_test::RegParams;

type RunLog = Rc<RefCell<Vec<String>>>;

/// Sums its scalar inputs plus a constant and records each run
struct Adder {
    label: String,
    constant: f64,
    inport_level: InvalidationLevel,
    fail: bool,
    log: RunLog,
}

impl Adder {
    fn boxed(label: &str, constant: f64, log: &RunLog) -> Box<Self> {
        Box::new(Adder {
            label: label.to_string(),
            constant,
            inport_level: InvalidationLevel::InvalidResult,
            fail: false,
            log: log.clone(),
        })
    }
}

impl ProcessorBody for Adder {
    fn class_name(&self) -> &'static str {
        "Adder"
    }

    fn ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::inport("in", PortType::Scalar)
                .with_multiple_connections()
                .with_invalidation_level(self.inport_level),
            PortSpec::outport("out", PortType::Scalar),
        ]
    }

    fn process(&mut self, ctx: &mut ProcessContext) -> NetworkResult<()> {
        if self.fail {
            return Err(NetworkError::ProcessingFailed {
                processor: ctx.processor_name().to_string(),
                message: "configured to fail".into(),
            });
        }
        self.log.borrow_mut().push(self.label.clone());
        let sum: f64 = ctx
            .inputs("in")
            .iter()
            .filter_map(|data| match data {
                PortData::Scalar(v) => Some(*v),
                _ => None,
            })
            .sum();
        ctx.set_output("out", PortData::Scalar(sum + self.constant))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Emits a constant
struct Source(f64);

impl ProcessorBody for Source {
    fn class_name(&self) -> &'static str {
        "Source"
    }

    fn ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::outport("out", PortType::Scalar)]
    }

    fn process(&mut self, ctx: &mut ProcessContext) -> NetworkResult<()> {
        ctx.set_output("out", PortData::Scalar(self.0))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn link(network: &mut ProcessorNetwork, from: ProcessorId, to: ProcessorId) {
    let out = network.port_ref(from, "out").unwrap();
    let inp = network.port_ref(to, "in").unwrap();
    assert!(network.connect_ports(out, inp));
}

fn output(network: &ProcessorNetwork, id: ProcessorId) -> f64 {
    let port = network.port_ref(id, "out").unwrap();
    match network.port(port).and_then(|p| p.data()) {
        Some(PortData::Scalar(v)) => *v,
        _ => f64::NAN,
    }
}

fn level(network: &ProcessorNetwork, id: ProcessorId) -> InvalidationLevel {
    network.processor(id).unwrap().invalidation_level()
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// source -> a -> b
fn simple_chain(log: &RunLog) -> (ProcessorNetwork, [ProcessorId; 3]) {
    let mut network = ProcessorNetwork::new();
    let b = network.add_processor(Adder::boxed("b", 10.0, log), "b").unwrap();
    let a = network.add_processor(Adder::boxed("a", 1.0, log), "a").unwrap();
    let source = network.add_processor(Box::new(Source(2.0)), "source").unwrap();
    link(&mut network, source, a);
    link(&mut network, a, b);
    (network, [source, a, b])
}

#[test]
fn invalidation_port_propagation() {
    let mut rp = RegParams::new("invalidation_ports");
    let log = RunLog::default();
    let (mut network, [source, a, b]) = simple_chain(&log);

    // Connecting marks the inport dirty
    let a_in = network.port_ref(a, "in").unwrap();
    rp.compare_values(1.0, flag(network.port(a_in).unwrap().has_changed()), 0.0);

    network.process().unwrap();
    rp.compare_values(13.0, output(&network, b), 0.0);
    rp.compare_values(0.0, flag(network.port(a_in).unwrap().has_changed()), 0.0);
    for id in [source, a, b] {
        rp.compare_values(1.0, flag(network.processor(id).unwrap().is_valid()), 0.0);
    }

    // An outport reaches its connected inports, which invalidate their
    // processor; nothing beyond that until the processor publishes again
    let source_out = network.port_ref(source, "out").unwrap();
    network.invalidate_port(source_out);
    rp.compare_values(1.0, flag(network.port(a_in).unwrap().has_changed()), 0.0);
    rp.compare_values(1.0, flag(level(&network, a) == InvalidationLevel::InvalidResult), 0.0);
    rp.compare_values(1.0, flag(network.processor(b).unwrap().is_valid()), 0.0);
    rp.compare_values(1.0, flag(network.processor(source).unwrap().is_valid()), 0.0);

    // Publishing cascades within the same pass
    log.borrow_mut().clear();
    rp.compare_values(2.0, network.process().unwrap() as f64, 0.0);
    rp.compare_values(1.0, flag(*log.borrow() == ["a", "b"]), 0.0);

    assert!(rp.cleanup(), "port propagation test failed");
}

#[test]
fn invalidation_levels() {
    let mut rp = RegParams::new("invalidation_levels");
    let log = RunLog::default();
    let mut network = ProcessorNetwork::new();
    let source = network.add_processor(Box::new(Source(1.0)), "source").unwrap();
    let mut strict = Adder::boxed("strict", 0.0, &log);
    strict.inport_level = InvalidationLevel::InvalidPorts;
    let strict = network.add_processor(strict, "strict").unwrap();
    network.process().unwrap();

    // The inport's configured level reaches the processor
    link(&mut network, source, strict);
    rp.compare_values(1.0, flag(level(&network, strict) == InvalidationLevel::InvalidPorts), 0.0);
    // The outport side is invalidated at the outport's level
    rp.compare_values(1.0, flag(level(&network, source) == InvalidationLevel::InvalidResult), 0.0);

    // Levels only rise
    network
        .invalidate_processor(strict, InvalidationLevel::InvalidResult)
        .unwrap();
    rp.compare_values(1.0, flag(level(&network, strict) == InvalidationLevel::InvalidPorts), 0.0);
    network
        .invalidate_processor(source, InvalidationLevel::InvalidProgram)
        .unwrap();
    rp.compare_values(1.0, flag(level(&network, source) == InvalidationLevel::InvalidProgram), 0.0);

    network.process().unwrap();
    rp.compare_values(1.0, flag(level(&network, strict) == InvalidationLevel::Valid), 0.0);

    // Disconnecting invalidates both sides again
    let out = network.port_ref(source, "out").unwrap();
    let inp = network.port_ref(strict, "in").unwrap();
    assert!(network.disconnect_ports(out, inp));
    rp.compare_values(1.0, flag(level(&network, strict) == InvalidationLevel::InvalidPorts), 0.0);
    rp.compare_values(1.0, flag(level(&network, source) == InvalidationLevel::InvalidResult), 0.0);
    rp.compare_values(1.0, flag(network.port(inp).unwrap().has_changed()), 0.0);

    assert!(rp.cleanup(), "invalidation levels test failed");
}

#[test]
fn invalidation_diamond_order() {
    let mut rp = RegParams::new("invalidation_diamond");
    let log = RunLog::default();
    let mut network = ProcessorNetwork::new();

    // Insertion order deliberately differs from data order
    let join = network.add_processor(Adder::boxed("join", 0.0, &log), "join").unwrap();
    let right = network.add_processor(Adder::boxed("right", 20.0, &log), "right").unwrap();
    let left = network.add_processor(Adder::boxed("left", 10.0, &log), "left").unwrap();
    let source = network.add_processor(Box::new(Source(1.0)), "source").unwrap();
    link(&mut network, source, left);
    link(&mut network, source, right);
    link(&mut network, left, join);
    link(&mut network, right, join);

    rp.compare_values(4.0, network.process().unwrap() as f64, 0.0);
    rp.compare_values(32.0, output(&network, join), 0.0);
    // join runs once, after both branches
    rp.compare_values(1.0, flag(*log.borrow() == ["right", "left", "join"]), 0.0);

    // Changing the source reruns everything downstream exactly once
    log.borrow_mut().clear();
    network.body_mut::<Source>(source).unwrap().0 = 2.0;
    rp.compare_values(4.0, network.process().unwrap() as f64, 0.0);
    rp.compare_values(34.0, output(&network, join), 0.0);
    rp.compare_values(3.0, log.borrow().len() as f64, 0.0);

    assert!(rp.cleanup(), "diamond order test failed");
}

#[test]
fn invalidation_processing_failure() {
    let log = RunLog::default();
    let (mut network, [_, a, b]) = simple_chain(&log);
    network.body_mut::<Adder>(a).unwrap().fail = true;

    let err = network.process().unwrap_err();
    assert!(matches!(err, NetworkError::ProcessingFailed { ref processor, .. } if processor == "a"));
    assert!(!network.processor(a).unwrap().is_valid());
    assert!(!network.processor(b).unwrap().is_valid());

    network.body_mut::<Adder>(a).unwrap().fail = false;
    assert_eq!(network.process().unwrap(), 2);
    assert_eq!(output(&network, b), 13.0);
}

/// Scalar source whose initialization can be made to fail
struct Unprepared {
    ready: bool,
}

impl ProcessorBody for Unprepared {
    fn class_name(&self) -> &'static str {
        "Unprepared"
    }

    fn ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::outport("out", PortType::Scalar)]
    }

    fn initialize(&mut self) -> NetworkResult<()> {
        if self.ready {
            Ok(())
        } else {
            Err(NetworkError::DecodeError("resources missing".into()))
        }
    }

    fn process(&mut self, ctx: &mut ProcessContext) -> NetworkResult<()> {
        ctx.set_output("out", PortData::Scalar(5.0))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn invalidation_initialize_failure() {
    let log = RunLog::default();
    let mut network = ProcessorNetwork::new();
    let source = network
        .add_processor(Box::new(Unprepared { ready: false }), "source")
        .unwrap();
    let a = network.add_processor(Adder::boxed("a", 1.0, &log), "a").unwrap();
    link(&mut network, source, a);

    match network.process() {
        Err(NetworkError::ProcessingFailed { processor, message }) => {
            assert_eq!(processor, "source");
            assert!(message.contains("resources missing"), "{message}");
        }
        other => panic!("expected processing failure, got {other:?}"),
    }
    assert!(!network.processor(source).unwrap().is_initialized());
    assert!(!network.processor(source).unwrap().is_valid());
    assert!(log.borrow().is_empty());

    network.body_mut::<Unprepared>(source).unwrap().ready = true;
    assert_eq!(network.process().unwrap(), 2);
    assert!(network.processor(source).unwrap().is_initialized());
    assert_eq!(output(&network, a), 6.0);
}
