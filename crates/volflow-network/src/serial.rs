//! Network descriptions
//!
//! A [`NetworkDescription`] captures the logical structure of a network:
//! processors (class, name, properties), connections between named ports
//! and loop iteration counts. It serializes to a line-oriented text format
//! with tab-separated fields:
//!
//! ```text
//! VolflowNetwork Version 1
//! processor\t<class>\t<name>
//! property\t<processor>\t<name>\t<value>
//! connection\t<processor>\t<outport>\t<processor>\t<inport>
//! loop\t<processor>\t<inport>\t<iterations>
//! ```
//!
//! Backslash, tab and newline inside fields are escaped as `\\`, `\t` and
//! `\n`. A network is rebuilt from a description through a
//! [`ProcessorRegistry`] mapping class names to factories.

use crate::error::{NetworkError, NetworkResult};
use crate::network::ProcessorNetwork;
use crate::port::PortRef;
use crate::processor::ProcessorBody;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Description format version
const DESCRIPTION_VERSION: i32 = 1;

const HEADER_TAG: &str = "VolflowNetwork Version";

/// A processor in a description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorDescription {
    /// Registry class name
    pub class_name: String,
    /// Processor name
    pub name: String,
    /// Persistent parameters
    pub properties: Vec<(String, String)>,
}

/// A connection between two named ports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescription {
    pub out_processor: String,
    pub outport: String,
    pub in_processor: String,
    pub inport: String,
}

/// Iteration count of a loop inport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopIterationDescription {
    pub processor: String,
    pub inport: String,
    pub iterations: usize,
}

/// Logical structure of a processor network
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkDescription {
    pub processors: Vec<ProcessorDescription>,
    pub connections: Vec<ConnectionDescription>,
    pub loop_iterations: Vec<LoopIterationDescription>,
}

impl NetworkDescription {
    /// Serialize to the text format.
    pub fn to_text(&self) -> String {
        let mut text = format!("{HEADER_TAG} {DESCRIPTION_VERSION}\n");
        for p in &self.processors {
            push_line(&mut text, &["processor", &p.class_name, &p.name]);
            for (key, value) in &p.properties {
                push_line(&mut text, &["property", &p.name, key, value]);
            }
        }
        for c in &self.connections {
            push_line(
                &mut text,
                &["connection", &c.out_processor, &c.outport, &c.in_processor, &c.inport],
            );
        }
        for l in &self.loop_iterations {
            push_line(
                &mut text,
                &["loop", &l.processor, &l.inport, &l.iterations.to_string()],
            );
        }
        text
    }

    /// Parse the text format.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DecodeError`] for a missing or unsupported
    /// header, an unknown record kind, a wrong field count, a property for
    /// a processor not declared above it, or an invalid iteration count.
    pub fn parse(text: &str) -> NetworkResult<Self> {
        let mut lines = text.lines().enumerate();
        let (_, header) = lines
            .next()
            .ok_or_else(|| NetworkError::DecodeError("empty network description".into()))?;
        let version = header
            .strip_prefix(HEADER_TAG)
            .map(str::trim)
            .ok_or_else(|| NetworkError::DecodeError(format!("bad header: {header}")))?;
        if version.parse::<i32>().ok() != Some(DESCRIPTION_VERSION) {
            return Err(NetworkError::DecodeError(format!(
                "unsupported description version: {version}"
            )));
        }

        let mut description = NetworkDescription::default();
        for (number, line) in lines {
            if line.is_empty() {
                continue;
            }
            let fields = split_line(line)?;
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            let bad_line =
                || NetworkError::DecodeError(format!("line {}: malformed record: {line}", number + 1));

            match fields.as_slice() {
                ["processor", class_name, name] => {
                    description.processors.push(ProcessorDescription {
                        class_name: class_name.to_string(),
                        name: name.to_string(),
                        properties: Vec::new(),
                    });
                }
                ["property", processor, key, value] => {
                    let owner = description
                        .processors
                        .iter_mut()
                        .rev()
                        .find(|p| p.name == *processor)
                        .ok_or_else(bad_line)?;
                    owner.properties.push((key.to_string(), value.to_string()));
                }
                ["connection", out_processor, outport, in_processor, inport] => {
                    description.connections.push(ConnectionDescription {
                        out_processor: out_processor.to_string(),
                        outport: outport.to_string(),
                        in_processor: in_processor.to_string(),
                        inport: inport.to_string(),
                    });
                }
                ["loop", processor, inport, iterations] => {
                    let iterations = iterations.parse().map_err(|_| bad_line())?;
                    description.loop_iterations.push(LoopIterationDescription {
                        processor: processor.to_string(),
                        inport: inport.to_string(),
                        iterations,
                    });
                }
                _ => return Err(bad_line()),
            }
        }
        Ok(description)
    }

    /// Write the description to a writer.
    pub fn write_to_writer(&self, writer: &mut impl Write) -> NetworkResult<()> {
        writer.write_all(self.to_text().as_bytes())?;
        Ok(())
    }

    /// Write the description to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> NetworkResult<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a description from a reader.
    pub fn read_from_reader(reader: &mut impl Read) -> NetworkResult<Self> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| NetworkError::DecodeError(format!("invalid description text: {e}")))?;
        Self::parse(&text)
    }

    /// Read a description from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> NetworkResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read_from_reader(&mut BufReader::new(file))
    }
}

fn push_line(text: &mut String, fields: &[&str]) {
    let escaped: Vec<String> = fields.iter().map(|f| escape(f)).collect();
    text.push_str(&escaped.join("\t"));
    text.push('\n');
}

fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

fn split_line(line: &str) -> NetworkResult<Vec<String>> {
    line.split('\t').map(unescape).collect()
}

fn unescape(field: &str) -> NetworkResult<String> {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            other => {
                return Err(NetworkError::DecodeError(format!(
                    "invalid escape sequence in field '{field}': \\{}",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(out)
}

type Factory = Box<dyn Fn() -> Box<dyn ProcessorBody>>;

/// Factories for processor bodies, keyed by class name
#[derive(Default)]
pub struct ProcessorRegistry {
    factories: BTreeMap<String, Factory>,
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl ProcessorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `class_name`, replacing any previous one.
    pub fn register(
        &mut self,
        class_name: &str,
        factory: impl Fn() -> Box<dyn ProcessorBody> + 'static,
    ) {
        self.factories
            .insert(class_name.to_string(), Box::new(factory));
    }

    /// Register a body type under its own class name.
    pub fn register_default<T: ProcessorBody + Default>(&mut self) {
        let class_name = T::default().class_name();
        self.register(class_name, || Box::new(T::default()) as Box<dyn ProcessorBody>);
    }

    /// Whether a factory exists for `class_name`
    pub fn contains(&self, class_name: &str) -> bool {
        self.factories.contains_key(class_name)
    }

    /// Registered class names in sorted order
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Create a new body of class `class_name`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownProcessorClass`] if nothing is
    /// registered under that name.
    pub fn create(&self, class_name: &str) -> NetworkResult<Box<dyn ProcessorBody>> {
        self.factories
            .get(class_name)
            .map(|factory| factory())
            .ok_or_else(|| NetworkError::UnknownProcessorClass(class_name.to_string()))
    }
}

impl ProcessorNetwork {
    /// Capture the logical structure of the network.
    pub fn describe(&self) -> NetworkDescription {
        let mut description = NetworkDescription::default();
        for (_, processor) in self.processors() {
            description.processors.push(ProcessorDescription {
                class_name: processor.class_name().to_string(),
                name: processor.name().to_string(),
                properties: processor.body().properties(),
            });

            for port in processor.ports() {
                if port.is_outport() {
                    for &other in port.connections() {
                        let (Some(in_processor), Some(inport)) =
                            (self.processor(other.processor), self.port(other))
                        else {
                            continue;
                        };
                        description.connections.push(ConnectionDescription {
                            out_processor: processor.name().to_string(),
                            outport: port.id().to_string(),
                            in_processor: in_processor.name().to_string(),
                            inport: inport.id().to_string(),
                        });
                    }
                } else if port.is_loop_port() && port.num_loop_iterations != 1 {
                    description.loop_iterations.push(LoopIterationDescription {
                        processor: processor.name().to_string(),
                        inport: port.id().to_string(),
                        iterations: port.num_loop_iterations,
                    });
                }
            }
        }
        description
    }

    /// Rebuild a network from a description.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownProcessorClass`] for an unregistered
    /// class, any error of `set_property` or `add_processor`,
    /// [`NetworkError::UnknownPort`] for unresolvable ports, and
    /// [`NetworkError::DecodeError`] for a refused connection.
    pub fn from_description(
        description: &NetworkDescription,
        registry: &ProcessorRegistry,
    ) -> NetworkResult<Self> {
        let mut network = ProcessorNetwork::new();

        for p in &description.processors {
            let mut body = registry.create(&p.class_name)?;
            for (key, value) in &p.properties {
                body.set_property(key, value)?;
            }
            network.add_processor(body, &p.name)?;
        }

        for c in &description.connections {
            let outport = network.resolve_port(&c.out_processor, &c.outport)?;
            let inport = network.resolve_port(&c.in_processor, &c.inport)?;
            if let Some(reason) = network.connection_refusal(outport, inport) {
                return Err(NetworkError::DecodeError(format!(
                    "connection {}.{} -> {}.{} refused: {reason}",
                    c.out_processor, c.outport, c.in_processor, c.inport
                )));
            }
            network.connect(outport, inport);
        }

        for l in &description.loop_iterations {
            let port = network.resolve_port(&l.processor, &l.inport)?;
            network.set_num_loop_iterations(port, l.iterations)?;
        }

        debug!(
            target: "volflow-network",
            processors = description.processors.len(),
            connections = description.connections.len(),
            "network restored"
        );
        Ok(network)
    }

    fn resolve_port(&self, processor: &str, port: &str) -> NetworkResult<PortRef> {
        self.processor_by_name(processor)
            .and_then(|id| self.port_ref(id, port))
            .ok_or_else(|| NetworkError::UnknownPort {
                processor: processor.to_string(),
                port: port.to_string(),
            })
    }
}
