//! Network change notification
//!
//! Observers implement [`NetworkObserver`]. Every specific hook defaults to
//! [`NetworkObserver::network_changed`], so an observer interested only in
//! "something changed" implements that single method. Closures can be
//! registered directly with `ProcessorNetwork::on_change`.

use crate::port::PortRef;
use crate::processor::ProcessorId;

/// A change to the structure of a network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    /// A processor was added
    ProcessorAdded { id: ProcessorId, name: String },
    /// A processor was removed
    ProcessorRemoved { id: ProcessorId, name: String },
    /// A processor was renamed
    ProcessorRenamed {
        id: ProcessorId,
        old_name: String,
        new_name: String,
    },
    /// An outport was connected to an inport
    PortsConnected { outport: PortRef, inport: PortRef },
    /// An outport was disconnected from an inport
    PortsDisconnected { outport: PortRef, inport: PortRef },
}

/// Receiver of network change notifications
pub trait NetworkObserver {
    /// Generic change hook
    fn network_changed(&mut self);

    /// A processor was added
    fn processor_added(&mut self, _id: ProcessorId, _name: &str) {
        self.network_changed();
    }

    /// A processor is about to be dropped
    fn processor_removed(&mut self, _id: ProcessorId, _name: &str) {
        self.network_changed();
    }

    /// A processor was renamed
    fn processor_renamed(&mut self, _id: ProcessorId, _old_name: &str, _new_name: &str) {
        self.network_changed();
    }

    /// Two ports were connected
    fn ports_connected(&mut self, _outport: PortRef, _inport: PortRef) {
        self.network_changed();
    }

    /// Two ports were disconnected
    fn ports_disconnected(&mut self, _outport: PortRef, _inport: PortRef) {
        self.network_changed();
    }
}

pub(crate) enum Observer {
    Hooks(Box<dyn NetworkObserver>),
    Callback(Box<dyn FnMut(&NetworkEvent)>),
}

impl Observer {
    pub(crate) fn notify(&mut self, event: &NetworkEvent) {
        let hooks = match self {
            Observer::Callback(callback) => return callback(event),
            Observer::Hooks(hooks) => hooks,
        };
        match event {
            NetworkEvent::ProcessorAdded { id, name } => hooks.processor_added(*id, name),
            NetworkEvent::ProcessorRemoved { id, name } => hooks.processor_removed(*id, name),
            NetworkEvent::ProcessorRenamed {
                id,
                old_name,
                new_name,
            } => hooks.processor_renamed(*id, old_name, new_name),
            NetworkEvent::PortsConnected { outport, inport } => {
                hooks.ports_connected(*outport, *inport)
            }
            NetworkEvent::PortsDisconnected { outport, inport } => {
                hooks.ports_disconnected(*outport, *inport)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Counter(Rc<RefCell<Vec<&'static str>>>);

    impl NetworkObserver for Counter {
        fn network_changed(&mut self) {
            self.0.borrow_mut().push("changed");
        }

        fn processor_added(&mut self, _id: ProcessorId, _name: &str) {
            self.0.borrow_mut().push("added");
        }
    }

    #[test]
    fn test_hooks_default_to_network_changed() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observer = Observer::Hooks(Box::new(Counter(log.clone())));
        let id = ProcessorId(0);
        observer.notify(&NetworkEvent::ProcessorAdded {
            id,
            name: "a".into(),
        });
        observer.notify(&NetworkEvent::ProcessorRemoved {
            id,
            name: "a".into(),
        });
        assert_eq!(*log.borrow(), vec!["added", "changed"]);
    }

    #[test]
    fn test_callback_sees_event() {
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        let mut observer = Observer::Callback(Box::new(move |event: &NetworkEvent| {
            *sink.borrow_mut() = Some(event.clone());
        }));
        let event = NetworkEvent::ProcessorRenamed {
            id: ProcessorId(3),
            old_name: "a".into(),
            new_name: "b".into(),
        };
        observer.notify(&event);
        assert_eq!(*seen.borrow(), Some(event));
    }
}
