// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup wiring for a server that reads retry schedules from configuration.
//!
//! Loads built-in defaults, the local override file (`QDB_CONF`, default `qdb`),
//! `QDB_*` environment variables and the command line, then resolves bindings.
//!
//! To run this example:
//! ```bash
//! export QDB_fetchBackoff="100ms,200ms,1s*2,cap30s,jitter"
//! cargo run --example server_startup -- --http.port 8080
//!
//! # A malformed schedule stops startup and names every offending key
//! cargo run --example server_startup -- --fetchBackoff=bogus --syncBackoff=5h
//! ```

use cfgbind::prelude::*;

const FETCH_BACKOFF: TypedKey<BackoffPolicy> = TypedKey::new("fetchBackoff");
const HTTP_PORT: TypedKey<i64> = TypedKey::new("http.port");

const DEFAULTS: &str = r#"
http:
  port: 9554
data:
  dir: /var/lib/qdb
fetchBackoff: 1s,5s,30s
"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let tree = ConfigLoader::new()
        .with_defaults(DefaultsSource::from_yaml(DEFAULTS)?)
        .with_local_override()?
        .with_env_prefix("QDB_")
        .with_cli_args(std::env::args().skip(1))
        .load()?;

    let bindings = match BindingResolver::new()
        .with_rule(KindRule::exact("http.port", BindingKind::Integer))
        .resolve(&tree)
    {
        Ok(bindings) => bindings,
        Err(e) => {
            eprintln!("Refusing to start: {}", e);
            std::process::exit(1);
        }
    };

    println!("Explicitly configured:");
    for binding in bindings.iter() {
        println!(
            "  {} = {:?} ({}, from {})",
            binding.name(),
            binding.value(),
            binding.kind(),
            binding.origin()
        );
    }

    // Unbound names fall back to the built-in default in the tree.
    let port = match bindings.find(HTTP_PORT.name())? {
        Some(port) => port,
        None => tree.require("http.port")?.value().as_i64("http.port")?,
    };
    println!("\nListening on port {}", port);

    let fetch = match bindings.find::<BackoffPolicy>(FETCH_BACKOFF.name())? {
        Some(policy) => policy,
        None => tree
            .require("fetchBackoff")?
            .value()
            .parse::<BackoffPolicy>("fetchBackoff")?,
    };
    println!("Fetch retry schedule: {}", fetch);
    for (attempt, delay) in fetch.attempts().take(6).enumerate() {
        let jittered = fetch.jittered_delay(attempt as u32 + 1, 0.5);
        println!(
            "  attempt {}: {:?}{}",
            attempt + 1,
            delay,
            if fetch.jitter() {
                format!(" (jittered at 0.5: {:?})", jittered)
            } else {
                String::new()
            }
        );
    }
    println!("Delays never exceed {:?}", fetch.cap());

    Ok(())
}
