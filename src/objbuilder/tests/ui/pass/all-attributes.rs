use std::sync::Arc;

use objbuilder::prelude::*;

pub trait Sink: Send + Sync {
    fn write(&self, line: &str);
}

pub trait Named: Send + Sync {
    fn name(&self) -> &str;
}

pub struct Console {
    prefix: String,
    fallback: Option<Arc<dyn Sink>>,
    peers: Vec<Arc<dyn Named>>,
}

#[component(expose(dyn Sink, dyn Named), dispose)]
impl Console {
    #[inject]
    pub fn new(#[collect] peers: Vec<Arc<dyn Named>>) -> Result<Self, std::io::Error> {
        Ok(Self {
            prefix: String::new(),
            fallback: None,
            peers,
        })
    }

    #[property]
    pub fn set_prefix(&mut self, prefix: String) {
        self.prefix = prefix;
    }

    #[property(inject)]
    pub fn set_fallback(&mut self, fallback: Arc<dyn Sink>) {
        self.fallback = Some(fallback);
    }
}

impl Sink for Console {
    fn write(&self, line: &str) {
        println!("{}{} ({} peers)", self.prefix, line, self.peers.len());
        if let Some(fallback) = &self.fallback {
            fallback.write(line);
        }
    }
}

impl Named for Console {
    fn name(&self) -> &str {
        "console"
    }
}

impl Dispose for Console {
    fn dispose(&self) {}
}

fn main() {}
