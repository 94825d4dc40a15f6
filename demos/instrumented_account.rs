//! Instrumenting a type and a single instance
//!
//! This example builds a small `Account` type, instruments it both ways and
//! routes the call log through `tracing`.
//!
//! # Running the example
//!
//! ```bash
//! RUST_LOG=invocation_logger=debug cargo run --example instrumented_account
//! ```

use invocation_logger::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn amount(args: &CallArgs) -> i64 {
    args.bind(0, "amount").and_then(Value::as_i64).unwrap_or(0)
}

fn account_class() -> Result<Arc<Class>> {
    Class::builder("Account")
        .method("__init__", |receiver, args| {
            receiver.set_field("balance", amount(args));
            Ok(Value::Null)
        })
        .method("deposit", |receiver, args| {
            let balance = receiver.get_field("balance")?.as_i64().unwrap_or(0) + amount(args);
            receiver.set_field("balance", balance);
            Ok(json!(balance))
        })
        .method("withdraw", |receiver, args| {
            let balance = receiver.get_field("balance")?.as_i64().unwrap_or(0);
            let requested = amount(args);
            if requested > balance {
                return Err(Fault::new("InsufficientFunds", "balance too low")
                    .with_state(json!({"balance": balance, "requested": requested})));
            }
            receiver.set_field("balance", balance - requested);
            Ok(json!(balance - requested))
        })
        .build()
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("invocation_logger=debug")),
        )
        .init();

    let sink: Arc<dyn Sink> = Arc::new(TracingSink::new());
    let account = account_class()?;

    // Every instance of the instrumented type is logged
    let logged = wrap_type(&account, sink.clone())?;
    let first = Instance::create(&logged, &CallArgs::new().arg(100))?;
    first.call("deposit", &CallArgs::new().arg(25))?;
    if let Err(fault) = first.call("withdraw", &CallArgs::new().kwarg("amount", 500)) {
        println!("withdraw failed: {} ({:?})", fault, fault.state);
    }

    // Only this one instance is logged; `other` stays silent
    let second = wrap_instance(&Instance::create(&account, &CallArgs::new().arg(10))?, sink);
    let other = Instance::create(&account, &CallArgs::new().arg(10))?;
    second.call("withdraw", &CallArgs::new().arg(3))?;
    other.call("withdraw", &CallArgs::new().arg(3))?;

    println!("first balance: {}", first.get_field("balance")?);
    println!("second balance: {}", second.get_field("balance")?);

    Ok(())
}
