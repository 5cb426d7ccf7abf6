use std::fmt::Error as FmtError;
use std::sync::Arc;

use weld::prelude::*;

pub trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

pub struct Plain {
    pub port: u16,
}

#[component(Arc<dyn Greeter> => Arc::new)]
impl Plain {
    #[inject]
    pub fn new(#[named("port")] port: u16) -> Self {
        Self { port }
    }

    #[inject]
    fn with_defaults(#[nullable] port: Option<u16>, #[provider] _later: Provider<String>) -> Self {
        Self {
            port: port.unwrap_or(80),
        }
    }

    #[inject]
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    #[inject]
    pub fn check(&self) -> Result<u16, FmtError> {
        Ok(self.port)
    }

    #[inject]
    pub fn describe(&mut self, #[named("prefix")] prefix: String) -> String {
        format!("{prefix}:{}", self.port)
    }

    pub fn untouched(&self) -> u16 {
        self.port
    }
}

impl Greeter for Plain {
    fn greet(&self) -> String {
        format!("hello from {}", self.untouched())
    }
}

fn main() {
    let implementation = Plain::implementation();
    assert_eq!(implementation.members().len(), 5);
}
