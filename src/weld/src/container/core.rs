use std::sync::Arc;

use crate::container::registry::AdapterMap;
use crate::container::Container;
use crate::monitor::ComponentMonitor;

pub struct ContainerCore {
    parent: Option<Container>,
    adapters: AdapterMap,
    monitor: Arc<dyn ComponentMonitor>,
}

impl ContainerCore {
    pub fn new(
        adapters: AdapterMap,
        monitor: Arc<dyn ComponentMonitor>,
        parent: Option<Container>,
    ) -> Self {
        Self {
            parent,
            adapters,
            monitor,
        }
    }

    pub fn parent(&self) -> Option<&Container> {
        self.parent.as_ref()
    }

    pub fn adapters(&self) -> &AdapterMap {
        &self.adapters
    }

    pub fn monitor(&self) -> &dyn ComponentMonitor {
        self.monitor.as_ref()
    }
}
