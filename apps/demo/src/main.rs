use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use client_core::{CounterController, CounterMode, HttpCounterService};
use shared::domain::Operation;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8090")]
    server_url: String,
    /// Operations to apply in order after the initial fetch.
    #[arg(value_enum)]
    operations: Vec<OperationArg>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OperationArg {
    Increment,
    Decrement,
}

impl From<OperationArg> for Operation {
    fn from(value: OperationArg) -> Self {
        match value {
            OperationArg::Increment => Operation::Increment,
            OperationArg::Decrement => Operation::Decrement,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let service = Arc::new(HttpCounterService::new(args.server_url));
    let mut controller = CounterController::new(service);
    controller.initialize().await;

    for operation in args.operations {
        controller.apply(operation.into()).await;
    }

    if let Some(notice) = controller.error() {
        println!("! {notice}");
    }
    if let Some(counter) = controller.counter() {
        println!("Counter: {}", counter.value);
        println!("Last updated: {}", counter.updated_at);
    }
    if controller.mode() == CounterMode::LocalFallback {
        println!("(Running in local mode)");
    }

    Ok(())
}
