//! Network description regression test
//!
//! Describing a network, writing the description as text, reading it back
//! and rebuilding an equivalent network through a processor registry.
//!
//! Run with:
//! ```
//! cargo test -p volflow-network --test description_reg
//! ```

use std::any::Any;
use volflow_network::{
    NetworkDescription, NetworkError, NetworkResult, PortData, PortSpec, PortType,
    ProcessContext, ProcessorBody, ProcessorNetwork, ProcessorRegistry,
};
use volflow_test::{RegParams, regout_dir};

/// Emits a configurable scalar
#[derive(Default)]
struct Constant {
    value: f64,
}

impl ProcessorBody for Constant {
    fn class_name(&self) -> &'static str {
        "Constant"
    }

    fn ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::outport("value.out", PortType::Scalar)]
    }

    fn process(&mut self, ctx: &mut ProcessContext) -> NetworkResult<()> {
        ctx.set_output("value.out", PortData::Scalar(self.value))
    }

    fn properties(&self) -> Vec<(String, String)> {
        vec![("value".into(), self.value.to_string())]
    }

    fn set_property(&mut self, name: &str, value: &str) -> NetworkResult<()> {
        match name {
            "value" => {
                self.value = value.parse().map_err(|_| NetworkError::InvalidPropertyValue {
                    property: name.to_string(),
                    value: value.to_string(),
                })?;
                Ok(())
            }
            _ => Err(NetworkError::UnknownProperty {
                class: self.class_name().to_string(),
                property: name.to_string(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Multiplies its input; feeds back through a loop port pair
#[derive(Default)]
struct Scale;

impl ProcessorBody for Scale {
    fn class_name(&self) -> &'static str {
        "Scale"
    }

    fn ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::inport("value.in", PortType::Scalar),
            PortSpec::outport("value.out", PortType::Scalar),
            PortSpec::inport("loop.in", PortType::Scalar).as_loop_port(),
            PortSpec::outport("loop.out", PortType::Scalar).as_loop_port(),
        ]
    }

    fn process(&mut self, ctx: &mut ProcessContext) -> NetworkResult<()> {
        if let Some(PortData::Scalar(v)) = ctx.input("value.in").cloned() {
            ctx.set_output("value.out", PortData::Scalar(v * 2.0))?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn registry() -> ProcessorRegistry {
    let mut registry = ProcessorRegistry::new();
    registry.register_default::<Constant>();
    registry.register_default::<Scale>();
    registry
}

fn sample_network() -> ProcessorNetwork {
    let mut network = ProcessorNetwork::new();
    let mut constant = Constant::default();
    constant.value = 1.5;
    let c = network.add_processor(Box::new(constant), "").unwrap();
    let s1 = network.add_processor(Box::new(Scale), "scale one").unwrap();
    let s2 = network.add_processor(Box::new(Scale), "scale\ttwo").unwrap();

    let connect = |network: &mut ProcessorNetwork, a, pa: &str, b, pb: &str| {
        let out = network.port_ref(a, pa).unwrap();
        let inp = network.port_ref(b, pb).unwrap();
        assert!(network.connect_ports(out, inp));
    };
    connect(&mut network, c, "value.out", s1, "value.in");
    connect(&mut network, s1, "value.out", s2, "value.in");
    connect(&mut network, s2, "loop.out", s1, "loop.in");

    let loop_in = network.port_ref(s1, "loop.in").unwrap();
    network.set_num_loop_iterations(loop_in, 4).unwrap();
    network
}

#[test]
fn description_roundtrip() {
    let mut rp = RegParams::new("description_roundtrip");
    let network = sample_network();
    let description = network.describe();

    rp.compare_values(3.0, description.processors.len() as f64, 0.0);
    rp.compare_values(3.0, description.connections.len() as f64, 0.0);
    rp.compare_values(1.0, description.loop_iterations.len() as f64, 0.0);
    rp.compare_strings(
        description.processors[0].name.as_bytes(),
        b"Constant",
    );

    // Text form survives a parse and re-serialization unchanged
    let text = description.to_text();
    let parsed = NetworkDescription::parse(&text).unwrap();
    rp.compare_strings(text.as_bytes(), parsed.to_text().as_bytes());

    // Rebuilt network describes itself identically
    let mut rebuilt = ProcessorNetwork::from_description(&parsed, &registry()).unwrap();
    rp.compare_strings(text.as_bytes(), rebuilt.describe().to_text().as_bytes());

    let s1 = rebuilt.processor_by_name("scale one").unwrap();
    let s2 = rebuilt.processor_by_name("scale\ttwo").unwrap();
    let loop_out = rebuilt.port_ref(s2, "loop.out").unwrap();
    rp.compare_values(4.0, rebuilt.num_loop_iterations(loop_out).unwrap() as f64, 0.0);
    let constant = rebuilt.processor_by_name("Constant").unwrap();
    rp.compare_values(
        1.5,
        rebuilt.body::<Constant>(constant).unwrap().value,
        0.0,
    );

    // And computes the same result
    rp.compare_values(3.0, rebuilt.process().unwrap() as f64, 0.0);
    let out = rebuilt.port_ref(s2, "value.out").unwrap();
    let value = match rebuilt.port(out).and_then(|p| p.data()) {
        Some(PortData::Scalar(v)) => *v,
        _ => f64::NAN,
    };
    rp.compare_values(6.0, value, 0.0);
    rp.compare_values(1.0, if rebuilt.processor(s1).unwrap().is_valid() { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "description roundtrip test failed");
}

#[test]
fn description_file_io() {
    let mut rp = RegParams::new("description_file");
    let description = sample_network().describe();
    let path = format!("{}/description_file.net", regout_dir());

    description.write_to_file(&path).unwrap();
    let read = NetworkDescription::read_from_file(&path).unwrap();
    rp.compare_values(1.0, if read == description { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "description file test failed");
}

#[test]
fn description_rebuild_errors() {
    let registry = registry();
    let text = "VolflowNetwork Version 1\nprocessor\tMissing\tm\n";
    let description = NetworkDescription::parse(text).unwrap();
    assert!(matches!(
        ProcessorNetwork::from_description(&description, &registry),
        Err(NetworkError::UnknownProcessorClass(class)) if class == "Missing"
    ));

    let text = "VolflowNetwork Version 1\n\
                processor\tConstant\tc\n\
                property\tc\tvalue\tnot-a-number\n";
    let description = NetworkDescription::parse(text).unwrap();
    assert!(matches!(
        ProcessorNetwork::from_description(&description, &registry),
        Err(NetworkError::InvalidPropertyValue { .. })
    ));

    let text = "VolflowNetwork Version 1\n\
                processor\tScale\ta\n\
                connection\ta\tvalue.out\tb\tvalue.in\n";
    let description = NetworkDescription::parse(text).unwrap();
    assert!(matches!(
        ProcessorNetwork::from_description(&description, &registry),
        Err(NetworkError::UnknownPort { .. })
    ));

    // A cycle of ordinary ports cannot be restored
    let text = "VolflowNetwork Version 1\n\
                processor\tScale\ta\n\
                processor\tScale\tb\n\
                connection\ta\tvalue.out\tb\tvalue.in\n\
                connection\tb\tvalue.out\ta\tvalue.in\n";
    let description = NetworkDescription::parse(text).unwrap();
    assert!(matches!(
        ProcessorNetwork::from_description(&description, &registry),
        Err(NetworkError::DecodeError(message)) if message.contains("illegal loop")
    ));

    let text = "VolflowNetwork Version 1\n\
                processor\tScale\ta\n\
                processor\tScale\ta\n";
    let description = NetworkDescription::parse(text).unwrap();
    assert!(matches!(
        ProcessorNetwork::from_description(&description, &registry),
        Err(NetworkError::DuplicateName(_))
    ));
}
