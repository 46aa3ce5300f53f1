use std::fmt;
use std::sync::Arc;

use objbuilder::prelude::*;

#[derive(Debug)]
pub struct MissingBroker;

impl fmt::Display for MissingBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no broker address was configured")
    }
}

impl std::error::Error for MissingBroker {}

pub struct BrokerAddress(String);

#[component]
impl BrokerAddress {
    #[inject]
    pub fn new() -> Self {
        Self(String::from("localhost:5672"))
    }
}

pub struct Channel {
    _address: Arc<BrokerAddress>,
}

#[component]
impl Channel {
    #[inject]
    pub fn open(address: Arc<BrokerAddress>) -> Channel {
        Channel { _address: address }
    }
}

pub struct Consumer {
    _channel: Arc<Channel>,
}

#[component]
impl Consumer {
    #[inject]
    pub fn new(channel: Arc<Channel>) -> Result<Self, MissingBroker> {
        Ok(Self { _channel: channel })
    }
}

pub struct Publisher;

#[component]
impl Publisher {
    #[inject]
    pub fn connect() -> std::result::Result<Publisher, MissingBroker> {
        Err(MissingBroker)
    }
}

fn main() {
    let container = Container::new();
    container.configure::<BrokerAddress>(Lifecycle::SingleInstance).unwrap();
    container.configure::<Channel>(Lifecycle::InstancePerUnitOfWork).unwrap();
    container.configure::<Consumer>(Lifecycle::InstancePerCall).unwrap();
    container.configure::<Publisher>(Lifecycle::InstancePerCall).unwrap();

    assert!(container.build::<Consumer>().is_ok());
    assert!(container.build::<Publisher>().is_err());
}
