use std::error::Error;
use std::sync::Arc;

use weld::prelude::*;

fn main() -> Result<(), Box<dyn Error>> {
    let mut builder = RegistryBuilder::new().use_names_by_default(true);

    builder.add(
        Registration::of::<ConsoleLogger>(key::of::<Arc<dyn Logger>>())
            .parameters([Parameter::value("greeter")]),
    )?;
    builder.register_component::<EnglishGreeter>(
        key::named::<Arc<dyn Greeter>>("english"),
        Strategy::default(),
    )?;
    builder.register_component::<ChineseGreeter>(
        key::named::<Arc<dyn Greeter>>("chinese"),
        Strategy::default(),
    )?;
    builder.register_component::<App>(key::of::<App>(), Strategy::default())?;

    let container = builder.build();
    container.verify_all()?;

    let app = container.get::<App>()?;
    app.run();
    Ok(())
}

trait Logger: Send + Sync + 'static {
    fn log(&self, message: &str);
}

struct ConsoleLogger {
    app_name: &'static str,
}

#[component(Arc<dyn Logger> => Arc::new)]
impl ConsoleLogger {
    #[inject]
    pub fn new(app_name: &'static str) -> Self {
        Self { app_name }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("[{}] {}", self.app_name, message);
    }
}

trait Greeter: Send + Sync + 'static {
    fn greet(&self);
}

struct EnglishGreeter {
    logger: Arc<dyn Logger>,
}

#[component(Arc<dyn Greeter> => Arc::new)]
impl EnglishGreeter {
    #[inject]
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Greeter for EnglishGreeter {
    fn greet(&self) {
        self.logger.log("Hello World!");
    }
}

struct ChineseGreeter {
    logger: Arc<dyn Logger>,
}

#[component(Arc<dyn Greeter> => Arc::new)]
impl ChineseGreeter {
    #[inject]
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Greeter for ChineseGreeter {
    fn greet(&self) {
        self.logger.log("你好世界!");
    }
}

struct App {
    logger: Arc<dyn Logger>,
    greeters: Vec<Arc<dyn Greeter>>,
}

#[component]
impl App {
    /// Both greeters share a type, so each argument is matched to a
    /// qualifier by its name.
    #[inject]
    pub fn new(
        logger: Arc<dyn Logger>,
        english: Arc<dyn Greeter>,
        chinese: Arc<dyn Greeter>,
    ) -> Self {
        Self {
            logger,
            greeters: vec![english, chinese],
        }
    }

    fn run(&self) {
        self.logger.log("Greeting from weld managed objects:");
        for greeter in &self.greeters {
            greeter.greet();
        }
    }
}
