use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use objbuilder::prelude::*;

fn main() {
    let container = Container::init(PipelineModule::new("pipeline")).unwrap();

    for message in ["order placed", "order shipped"] {
        let unit_of_work = container.build_child_container().unwrap();
        let pipeline = unit_of_work.build::<Pipeline>().unwrap();
        pipeline.run(message);
        unit_of_work.dispose();
    }

    container.dispose();
}

struct PipelineModule {
    app_name: &'static str,
}

impl PipelineModule {
    fn new(app_name: &'static str) -> Self {
        Self { app_name }
    }
}

impl Module for PipelineModule {
    fn configure(&self, container: &Container) -> Result<(), Box<dyn Error + Send + Sync>> {
        let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger {
            app_name: self.app_name,
        });
        container.register_instance(logger)?;

        container.configure::<Sequence>(Lifecycle::SingleInstance)?;
        container.configure::<MessageContext>("InstancePerUnitOfWork")?;
        container.configure::<AuditHandler>(Lifecycle::InstancePerCall)?;
        container.configure::<EchoHandler>(Lifecycle::SingleInstance)?;
        container.configure::<Pipeline>(Lifecycle::InstancePerUnitOfWork)?;
        container.configure_property::<EchoHandler, _>("prefix", String::from(">> "))?;

        Ok(())
    }
}

trait Logger: Send + Sync + 'static {
    fn log(&self, message: &str);
}

struct ConsoleLogger {
    app_name: &'static str,
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("[{}] {}", self.app_name, message);
    }
}

struct Sequence {
    next: AtomicU32,
}

#[component]
impl Sequence {
    #[inject]
    fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
        }
    }
}

struct MessageContext {
    id: u32,
    logger: Arc<dyn Logger>,
}

#[component(dispose)]
impl MessageContext {
    #[inject]
    fn new(sequence: Arc<Sequence>, logger: Arc<dyn Logger>) -> Self {
        let id = sequence.next.fetch_add(1, Ordering::SeqCst);
        Self { id, logger }
    }
}

impl Dispose for MessageContext {
    fn dispose(&self) {
        self.logger.log(&format!("message #{} completed", self.id));
    }
}

trait Handler: Send + Sync + 'static {
    fn handle(&self, context: &MessageContext, message: &str);
}

struct AuditHandler {
    logger: Arc<dyn Logger>,
}

#[component(expose(dyn Handler))]
impl AuditHandler {
    #[inject]
    fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Handler for AuditHandler {
    fn handle(&self, context: &MessageContext, message: &str) {
        self.logger
            .log(&format!("audit: message #{} has {} bytes", context.id, message.len()));
    }
}

struct EchoHandler {
    logger: Arc<dyn Logger>,
    prefix: String,
}

#[component(expose(dyn Handler))]
impl EchoHandler {
    #[inject]
    fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            logger,
            prefix: String::new(),
        }
    }

    #[property]
    fn set_prefix(&mut self, prefix: String) {
        self.prefix = prefix;
    }
}

impl Handler for EchoHandler {
    fn handle(&self, context: &MessageContext, message: &str) {
        self.logger
            .log(&format!("{}#{} {}", self.prefix, context.id, message));
    }
}

struct Pipeline {
    context: Arc<MessageContext>,
    handlers: Vec<Arc<dyn Handler>>,
}

#[component]
impl Pipeline {
    #[inject]
    fn new(context: Arc<MessageContext>, #[collect] handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self { context, handlers }
    }

    fn run(&self, message: &str) {
        for handler in &self.handlers {
            handler.handle(&self.context, message);
        }
    }
}
