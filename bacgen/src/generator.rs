//! The BACnet load generator.
//!
//! ## Metrics
//!
//! `requests_sent`: Total number of append calls made
//! `request_ok`: Successful appends
//! `request_failure`: Failed appends
//! `bytes_written`: Total bytes appended
//!

use std::num::NonZeroU32;
use std::time::Duration;

use bacgen_payload::BacnetGenerator;
use bacgen_payload::message::MessageKind;
use metrics::counter;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::client::EventSink;
use crate::signals::Shutdown;

/// Connection string assumed when none is given, pointing at a plaintext
/// event store on its conventional port.
pub const DEFAULT_CONNECTION_STRING: &str = "esdb://kurrentdb:2113?tls=false";

/// Stream every event is appended to when none is given.
pub const DEFAULT_STREAM: &str = "energy-meters";

/// Events per second attempted when no rate is given.
pub const DEFAULT_RATE: NonZeroU32 = NonZeroU32::new(100).expect("default rate is non-zero");

/// Errors produced by [`BacnetLoad`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Wrapper around [`crate::client::Error`].
    #[error(transparent)]
    Client(#[from] crate::client::Error),
    /// Wrapper around [`bacgen_payload::Error`].
    #[error(transparent)]
    Payload(#[from] bacgen_payload::Error),
}

/// Configuration of [`BacnetLoad`].
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Connection string naming the target event store.
    #[serde(default = "default_connection_string")]
    pub connection_string: String,
    /// Stream every event is appended to.
    #[serde(default = "default_stream")]
    pub stream: String,
    /// Events per second attempted.
    #[serde(default = "default_rate")]
    pub rate: NonZeroU32,
    /// Stop after this many seconds. Absent means run until interrupted.
    #[serde(default)]
    pub duration_seconds: Option<u64>,
    /// Seed for random operations. Absent means each run draws its own.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_connection_string() -> String {
    DEFAULT_CONNECTION_STRING.to_string()
}

fn default_stream() -> String {
    DEFAULT_STREAM.to_string()
}

fn default_rate() -> NonZeroU32 {
    DEFAULT_RATE
}

/// Totals for one complete run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Events appended successfully.
    pub sent: u64,
    /// Append attempts that failed.
    pub errors: u64,
    /// Definitions among the successful events.
    pub definitions: u64,
    /// Updates among the successful events.
    pub updates: u64,
    /// Deletes among the successful events.
    pub deletes: u64,
    /// Points live in the generator when the run ended.
    pub live_objects: usize,
    /// Wall time the run took.
    pub elapsed: Duration,
}

/// Running totals, reported periodically and folded into the final
/// [`Summary`].
#[derive(Debug)]
struct Counters {
    sent: u64,
    errors: u64,
    definitions: u64,
    updates: u64,
    deletes: u64,
    started: Instant,
}

impl Counters {
    fn new() -> Self {
        Self {
            sent: 0,
            errors: 0,
            definitions: 0,
            updates: 0,
            deletes: 0,
            started: Instant::now(),
        }
    }

    fn record_success(&mut self, kind: MessageKind) {
        self.sent += 1;
        match kind {
            MessageKind::ObjectDefinition => self.definitions += 1,
            MessageKind::ValueUpdate => self.updates += 1,
            MessageKind::ObjectDelete => self.deletes += 1,
        }
    }

    fn record_failure(&mut self) {
        self.errors += 1;
    }

    fn report(&self, live_objects: usize) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            self.sent as f64 / elapsed
        } else {
            0.0
        };
        info!(
            "sent: {sent} | rate: {rate:.1}/s | objects: {live_objects} | errors: {errors} | elapsed: {elapsed:.0}s",
            sent = self.sent,
            errors = self.errors,
        );
        info!(
            "types: ObjDef={definitions}, ValUpd={updates}, ObjDel={deletes}",
            definitions = self.definitions,
            updates = self.updates,
            deletes = self.deletes,
        );
    }

    fn summary(&self, live_objects: usize) -> Summary {
        Summary {
            sent: self.sent,
            errors: self.errors,
            definitions: self.definitions,
            updates: self.updates,
            deletes: self.deletes,
            live_objects,
            elapsed: self.started.elapsed(),
        }
    }
}

/// The BACnet load generator.
///
/// Drives a [`BacnetGenerator`] at a fixed cadence, appending every event
/// to one stream of the configured sink.
pub struct BacnetLoad<S> {
    stream: String,
    rate: NonZeroU32,
    duration: Option<Duration>,
    sink: S,
    rng: StdRng,
    payload: BacnetGenerator,
    counters: Counters,
    shutdown: Shutdown,
    metric_labels: Vec<(String, String)>,
}

impl<S> BacnetLoad<S>
where
    S: EventSink,
{
    /// Create a new [`BacnetLoad`] instance.
    #[must_use]
    pub fn new(config: &Config, sink: S, shutdown: Shutdown) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let labels = vec![
            ("component".to_string(), "generator".to_string()),
            ("component_name".to_string(), "bacnet".to_string()),
        ];

        Self {
            stream: config.stream.clone(),
            rate: config.rate,
            duration: config.duration_seconds.map(Duration::from_secs),
            sink,
            rng,
            payload: BacnetGenerator::new(),
            counters: Counters::new(),
            shutdown,
            metric_labels: labels,
        }
    }

    /// Run [`BacnetLoad`] to completion or until a shutdown signal is
    /// received.
    ///
    /// One event is generated and appended per tick. The tick then sleeps
    /// out the remainder of its interval, so a slow sink lowers the achieved
    /// rate instead of queueing work. An append in flight is never
    /// abandoned: shutdown and the duration bound take effect between
    /// ticks.
    ///
    /// # Errors
    ///
    /// Function returns an error when event generation or encoding fails.
    /// Append failures are counted and logged, not returned.
    pub async fn spin(mut self) -> Result<Summary, Error> {
        let interval = Duration::from_secs_f64(1.0 / f64::from(self.rate.get()));
        let stats_interval = u64::from(self.rate.get()) * 10;
        self.counters.started = Instant::now();

        info!(
            "starting load: {rate} events/s to stream {stream}",
            rate = self.rate,
            stream = self.stream,
        );
        if let Some(duration) = self.duration {
            info!("run bounded to {secs} seconds", secs = duration.as_secs());
        }

        loop {
            if let Some(duration) = self.duration {
                if self.counters.started.elapsed() >= duration {
                    info!("run duration reached");
                    break;
                }
            }

            let tick_started = Instant::now();
            let message = self.payload.generate(&mut self.rng)?;
            let kind = message.kind();
            let body = message.encode()?;
            let body_len = body.len() as u64;

            counter!("requests_sent", &self.metric_labels).increment(1);
            match self.sink.append(&self.stream, kind.as_str(), body).await {
                Ok(()) => {
                    counter!("request_ok", &self.metric_labels).increment(1);
                    counter!("bytes_written", &self.metric_labels).increment(body_len);
                    self.counters.record_success(kind);
                }
                Err(err) => {
                    let mut error_labels = self.metric_labels.clone();
                    error_labels.push(("error".to_string(), err.to_string()));
                    counter!("request_failure", &error_labels).increment(1);
                    warn!("append failed: {err}");
                    self.counters.record_failure();
                }
            }

            if self.counters.sent % stats_interval == 0 {
                self.counters.report(self.payload.live_objects());
            }

            let pause = interval.saturating_sub(tick_started.elapsed());
            tokio::select! {
                () = tokio::time::sleep(pause) => {}
                () = self.shutdown.recv() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        self.counters.report(self.payload.live_objects());
        Ok(self.counters.summary(self.payload.live_objects()))
    }
}

impl<S> std::fmt::Debug for BacnetLoad<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BacnetLoad")
            .field("stream", &self.stream)
            .field("rate", &self.rate)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}
