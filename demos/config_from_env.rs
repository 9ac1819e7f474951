//! Loading service configuration from environment variables.
//!
//! Run with: cargo run --example config_from_env

use serde::{Deserialize, Serialize};
use serde_environ::{from_store, to_vec_with_prefix, EnvOptions, EnvStore, MemoryEnv};
use std::collections::BTreeMap;
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
enum Level {
    Debug,
    Info,
    Warn,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Database {
    url: String,
    pool_size: u32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Upstream {
    host: String,
    port: u16,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Config {
    level: Level,
    listen_port: u16,
    allowed_origins: Vec<String>,
    database: Database,
    upstreams: Vec<Upstream>,
    headers: BTreeMap<String, String>,
    tls_cert: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // A copy of what a deployment would put in the process environment.
    let mut env = MemoryEnv::from_entries([
        "HOME=/home/app",
        "MYAPP_LEVEL=Info",
        "MYAPP_LISTEN_PORT=8443",
        "MYAPP_ALLOWED_ORIGINS=https://example.com,\"https://a.example.com, https://b.example.com\"",
        "MYAPP_DATABASE.URL=postgres://db.internal/app",
        "MYAPP_DATABASE.POOL_SIZE=16",
        "MYAPP_UPSTREAMS.0.HOST=10.0.0.1",
        "MYAPP_UPSTREAMS.0.PORT=9000",
        "MYAPP_UPSTREAMS.1.HOST=10.0.0.2",
        "MYAPP_UPSTREAMS.1.PORT=9001",
        "MYAPP_HEADERS.X-FRAME-OPTIONS=DENY",
    ]);

    // Read the configuration and drop the variables so child processes
    // never see them.
    let options = EnvOptions::new()
        .with_prefix("MYAPP_")
        .with_unset_consumed(true);
    let config: Config = from_store(&mut env, &options)?;
    println!("Config: {:#?}\n", config);
    println!("Left in environment: {:?}\n", env.list());

    // Render it back, e.g. to hand to a child process.
    for entry in to_vec_with_prefix(&config, "MYAPP_")? {
        println!("{}", entry);
    }

    Ok(())
}
