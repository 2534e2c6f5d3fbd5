use fibre_registry::{ComponentType, Container};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() {
  // Bind ConsoleLogger under a name and declare that it can be used as a `dyn Logger`.
  // The report service never names the logger; it asks for the first `dyn Logger` it can find.
  let container = Container::builder()
    .lazy_as(
      "console_logger",
      ComponentType::builder::<ConsoleLogger>().is_a::<dyn Logger>(|l| l),
      |_| Ok(ConsoleLogger),
    )
    .lazy("report_service", |c| {
      let logger = c
        .first::<dyn Logger>()?
        .expect("a logger is bound");
      Ok(ReportService { logger })
    })
    .build(None)
    .expect("bindings are valid");

  println!("Resolving the high-level service...");
  let report_service = container.named::<ReportService>("report_service").unwrap();

  println!("Using the service...");
  report_service.generate_report();

  let loggers = container.by_type::<dyn Logger>().unwrap();
  println!("Loggers bound: {:?}", loggers.keys().collect::<Vec<_>>());
}
