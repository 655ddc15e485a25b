//! A toy request/response service for measuring promise/future hand-offs
//! under load.
//!
//! One dispatcher thread owns the [`Promise`] side of every request. Each
//! client thread submits a request, tries a bounded [`Future::try_get`] and
//! falls back to a blocking [`Future::get`] when that times out.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::{create_future_pair, Future, Promise};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("service stopped")]
    Stopped,
    #[error("failed to spawn {0} thread")]
    Spawn(String),
    #[error("client {0} panicked")]
    ClientPanicked(usize),
    #[error(transparent)]
    Future(#[from] crate::Error),
}

/// Tuning knobs for a benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Number of concurrent client threads.
    pub clients: usize,
    /// How long the dispatcher holds each request before answering.
    pub service_latency: Duration,
    /// Bound for the first `try_get` before falling back to `get`.
    pub try_get_timeout: Duration,
    /// Requests between two samples logged by client 0.
    pub report_every: u64,
    /// Capacity of the request queue. Submitting blocks when it is full.
    pub queue_depth: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            clients: 10,
            service_latency: Duration::from_micros(1),
            try_get_timeout: Duration::ZERO,
            report_every: 1000,
            queue_depth: 100,
        }
    }
}

impl ServiceConfig {
    /// Sets the client count and scales the queue to ten slots per client.
    pub fn with_clients(mut self, clients: usize) -> Self {
        self.clients = clients;
        self.queue_depth = 10 * clients.max(1);
        self
    }
}

/// Counters kept by each client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub requests: u64,
    /// Requests whose first `try_get` timed out and were recovered by `get`.
    pub timeouts: u64,
    /// Sum of the latencies reported back by the service.
    pub latency: Duration,
    pub elapsed: Duration,
}

impl ClientStats {
    fn record(&mut self, latency: Duration, timed_out: bool) {
        self.requests += 1;
        self.latency += latency;
        if timed_out {
            self.timeouts += 1;
        }
    }

    pub fn mean_latency(&self) -> Duration {
        match u32::try_from(self.requests) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.latency / n,
            Err(_) => Duration::from_secs_f64(self.latency.as_secs_f64() / self.requests as f64),
        }
    }

    pub fn merge(&mut self, other: &ClientStats) {
        self.requests += other.requests;
        self.timeouts += other.timeouts;
        self.latency += other.latency;
        self.elapsed = self.elapsed.max(other.elapsed);
    }
}

struct Request {
    client: usize,
    issued: Instant,
    promise: Promise<Duration, ServiceError>,
}

/// Handle to a running dispatcher. Dropping it shuts the dispatcher down.
pub struct AsyncService {
    queue: Option<Sender<Request>>,
    stopping: Arc<AtomicBool>,
    dispatcher: Option<JoinHandle<u64>>,
}

impl AsyncService {
    pub fn start(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let (queue, requests) = bounded(config.queue_depth.max(1));
        let stopping = Arc::new(AtomicBool::new(false));
        let latency = config.service_latency;
        let dispatcher = thread::Builder::new()
            .name("dispatcher".into())
            .spawn({
                let stopping = stopping.clone();
                move || dispatch(requests, latency, &stopping)
            })
            .map_err(|err| {
                tracing::error!(%err, "could not spawn dispatcher");
                ServiceError::Spawn("dispatcher".into())
            })?;
        tracing::info!(queue_depth = config.queue_depth, ?latency, "service started");
        Ok(Self {
            queue: Some(queue),
            stopping,
            dispatcher: Some(dispatcher),
        })
    }

    /// Queues a request and returns the future its answer arrives on.
    pub fn submit(&self, client: usize) -> Result<Future<Duration, ServiceError>, ServiceError> {
        let queue = self.queue.as_ref().ok_or(ServiceError::Stopped)?;
        let (promise, future) = create_future_pair();
        queue
            .send(Request {
                client,
                issued: Instant::now(),
                promise,
            })
            .map_err(|_| ServiceError::Stopped)?;
        Ok(future)
    }

    /// Stops the dispatcher. Requests still queued are answered with
    /// [`ServiceError::Stopped`]. Returns the number of requests served.
    pub fn shutdown(mut self) -> u64 {
        self.stop()
    }

    fn stop(&mut self) -> u64 {
        self.stopping.store(true, Ordering::Release);
        self.queue.take();
        let Some(dispatcher) = self.dispatcher.take() else {
            return 0;
        };
        dispatcher.join().unwrap_or_else(|_| {
            tracing::error!("dispatcher panicked");
            0
        })
    }
}

impl Drop for AsyncService {
    fn drop(&mut self) {
        self.stop();
    }
}

fn dispatch(requests: Receiver<Request>, latency: Duration, stopping: &AtomicBool) -> u64 {
    let mut served = 0;
    for request in requests.iter() {
        let answered = if stopping.load(Ordering::Acquire) {
            request.promise.set_error(ServiceError::Stopped)
        } else {
            if !latency.is_zero() {
                thread::sleep(latency);
            }
            served += 1;
            request.promise.set_value(request.issued.elapsed())
        };
        if let Err(err) = answered {
            tracing::warn!(client = request.client, %err, "could not answer request");
        }
    }
    tracing::debug!(served, "dispatcher exiting");
    served
}

/// Waits for one answer: bounded first, then blocking. Returns the reported
/// latency and whether the bounded wait timed out.
fn await_answer(
    future: &Future<Duration, ServiceError>,
    timeout: Duration,
) -> Result<(Duration, bool), ServiceError> {
    let (outcome, timed_out) = match future.try_get(timeout) {
        Ok(outcome) => (outcome, false),
        Err(err) if err.is_timeout() => (future.get()?, true),
        Err(err) => return Err(err.into()),
    };
    match outcome.as_result() {
        Ok(latency) => Ok((*latency, timed_out)),
        Err(err) => Err(err.clone()),
    }
}

/// Issues requests until `stop` is raised. Client 0 logs a sample every
/// `config.report_every` requests.
pub fn run_client(
    service: &AsyncService,
    client: usize,
    config: &ServiceConfig,
    stop: &AtomicBool,
) -> Result<ClientStats, ServiceError> {
    tracing::debug!(client, "client started");
    let started = Instant::now();
    let mut total = ClientStats::default();
    let mut window = ClientStats::default();
    let mut window_start = started;
    while !stop.load(Ordering::Acquire) {
        let future = service.submit(client)?;
        let (latency, timed_out) = await_answer(&future, config.try_get_timeout)?;
        total.record(latency, timed_out);
        if client != 0 {
            continue;
        }
        window.record(latency, timed_out);
        if window.requests >= config.report_every {
            tracing::info!(
                clients = config.clients,
                requests = window.requests,
                elapsed = ?window_start.elapsed(),
                timeouts = window.timeouts,
                mean_latency = ?window.mean_latency(),
                "sample (timeouts recovered)"
            );
            window = ClientStats::default();
            window_start = Instant::now();
        }
    }
    total.elapsed = started.elapsed();
    Ok(total)
}

/// Runs `config.clients` clients against one service for `duration`.
pub fn run(config: &ServiceConfig, duration: Duration) -> Result<Vec<ClientStats>, ServiceError> {
    let service = AsyncService::start(config)?;
    let stop = AtomicBool::new(false);
    let results = thread::scope(|s| {
        let (service, stop) = (&service, &stop);
        let mut clients = Vec::with_capacity(config.clients);
        for client in 0..config.clients {
            let spawned = thread::Builder::new()
                .name(format!("client-{client}"))
                .spawn_scoped(s, move || run_client(service, client, config, stop));
            match spawned {
                Ok(handle) => clients.push((client, handle)),
                Err(err) => {
                    tracing::error!(client, %err, "could not spawn client");
                    stop.store(true, Ordering::Release);
                    clients.clear();
                    return vec![Err(ServiceError::Spawn(format!("client-{client}")))];
                }
            }
        }
        thread::sleep(duration);
        stop.store(true, Ordering::Release);
        clients
            .into_iter()
            .map(|(client, handle)| {
                handle
                    .join()
                    .unwrap_or(Err(ServiceError::ClientPanicked(client)))
            })
            .collect::<Vec<_>>()
    });
    let served = service.shutdown();
    tracing::debug!(served, "benchmark finished");
    results.into_iter().collect()
}
