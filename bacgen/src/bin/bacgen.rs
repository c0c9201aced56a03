use std::num::NonZeroU32;

use clap::Parser;
use tokio::{runtime::Builder, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

use bacgen::client::KurrentClient;
use bacgen::generator::{self, BacnetLoad, Config};
use bacgen::signals::Shutdown;

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error("bacgen client returned an error: {0}")]
    Client(#[from] bacgen::client::Error),
    #[error("bacgen generator returned an error: {0}")]
    Generator(#[from] bacgen::generator::Error),
    #[error("shutdown signaling failed: {0}")]
    Shutdown(#[from] bacgen::signals::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to join the publish task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Opts {
    /// Events per second to attempt
    #[clap(default_value_t = generator::DEFAULT_RATE)]
    rate: NonZeroU32,
    /// Stop after this many seconds; absent means run until interrupted
    duration_seconds: Option<u64>,
    /// Connection string naming the target event store
    #[clap(long, default_value_t = generator::DEFAULT_CONNECTION_STRING.to_string())]
    connection_string: String,
    /// Stream events are appended to
    #[clap(long, default_value_t = generator::DEFAULT_STREAM.to_string())]
    stream: String,
    /// Seed for random operations; absent means each run draws its own
    #[clap(long)]
    seed: Option<u64>,
}

async fn inner_main(opts: Opts) -> Result<(), Error> {
    let config = Config {
        connection_string: opts.connection_string,
        stream: opts.stream,
        rate: opts.rate,
        duration_seconds: opts.duration_seconds,
        seed: opts.seed,
    };

    // A connection failure is fatal. There is no retry on purpose: this
    // tool's job is to push load at a healthy store, not to wait one out.
    let client = KurrentClient::connect(&config.connection_string).await?;

    let shutdown = Shutdown::new();
    let load = BacnetLoad::new(&config, client, shutdown.clone());
    let mut handle = tokio::spawn(load.spin());

    tokio::select! {
        res = &mut handle => {
            res??;
        }
        _ = signal::ctrl_c() => {
            info!("received ctrl-c");
            shutdown.signal()?;
            handle.await??;
        }
    }

    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .finish()
        .init();

    let version = env!("CARGO_PKG_VERSION");
    info!("Starting bacgen {version} run.");

    let opts = Opts::parse();

    let runtime = Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()?;
    runtime.block_on(inner_main(opts))
}
