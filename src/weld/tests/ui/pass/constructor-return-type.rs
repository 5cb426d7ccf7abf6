use std::fmt::Error as FmtError;
use std::num::ParseIntError;

use weld::prelude::*;

pub struct Host(String);

#[component]
impl Host {
    #[inject]
    pub fn localhost() -> Host {
        Host(String::from("localhost"))
    }
}

pub struct Port(u16);

#[component]
impl Port {
    #[inject]
    pub fn parse(#[named("port")] raw: String) -> Result<Self, ParseIntError> {
        raw.parse().map(Port)
    }
}

pub struct Endpoint {
    host: Host,
    port: Port,
}

#[component]
impl Endpoint {
    #[inject]
    pub fn new(host: Host, port: Port) -> std::result::Result<Endpoint, FmtError> {
        Ok(Endpoint { host, port })
    }
}

fn container(raw_port: &str) -> Container {
    let mut builder = RegistryBuilder::new();
    builder
        .register(key::of::<Host>(), Implementation::of::<Host>(), Vec::new(), Strategy::default())
        .unwrap();
    builder
        .register(
            key::of::<Port>(),
            Implementation::of::<Port>(),
            vec![Parameter::value(raw_port.to_string())],
            Strategy::default(),
        )
        .unwrap();
    builder
        .register(key::of::<Endpoint>(), Implementation::of::<Endpoint>(), Vec::new(), Strategy::default())
        .unwrap();
    builder.build()
}

fn main() {
    let endpoint = container("8080").get::<Endpoint>().unwrap();
    assert_eq!(endpoint.host.0, "localhost");
    assert_eq!(endpoint.port.0, 8080);

    assert!(container("http").get::<Endpoint>().is_err());
}
