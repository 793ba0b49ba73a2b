//! Fixed-interval polling cycles.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::{AppConfig, HostConfig};
use crate::devices::fetch;
use crate::snmp::{Connector, SnmpConnector};
use crate::storage::{FallbackSink, FlushOutcome, Outbox, Sink};

use super::{AdmissionGate, CollectorError};

/// Summary of one polling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub hosts: usize,
    /// The cycle timeout elapsed before every fetch finished.
    pub timed_out: bool,
    /// Fetches still running after the cancel grace period.
    pub detached: usize,
    pub flushed: FlushOutcome,
}

/// Runs one fetch per host per cycle and hands the results to the sink.
///
/// State that survives between cycles is the gate, whose permits detached
/// stragglers keep holding, and the outbox they push into when they finish.
pub struct Scheduler {
    hosts: Arc<[HostConfig]>,
    connector: Arc<dyn Connector>,
    sink: Arc<dyn Sink>,
    gate: AdmissionGate,
    outbox: Arc<Outbox>,
    interval: Duration,
    timeout: Duration,
    cancel_grace: Duration,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("hosts", &self.hosts.len())
            .field("gate", &self.gate)
            .field("interval", &self.interval)
            .field("timeout", &self.timeout)
            .field("cancel_grace", &self.cancel_grace)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    pub fn new(config: &AppConfig, connector: Arc<dyn Connector>, sink: Arc<dyn Sink>) -> Self {
        Self {
            hosts: config.hosts.clone().into(),
            connector,
            sink,
            gate: AdmissionGate::new(config.general.max_tasks),
            outbox: Arc::new(Outbox::new()),
            interval: config.general.interval,
            timeout: config.general.timeout,
            cancel_grace: config.general.cancel_grace,
        }
    }

    /// Production wiring: SNMP over UDP, InfluxDB with a local spool.
    pub fn from_config(config: &AppConfig) -> Result<Self, CollectorError> {
        let sink = FallbackSink::from_config(&config.sink)?;
        Ok(Self::new(config, Arc::new(SnmpConnector), Arc::new(sink)))
    }

    pub fn hosts(&self) -> &[HostConfig] {
        &self.hosts
    }

    /// Records waiting for the next flush.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Poll every host once, then flush.
    ///
    /// Submission blocks while the gate is saturated. The deadline runs from
    /// the start of the cycle; when it passes, cancellation is raised at once,
    /// even with submission still blocked, and running fetches get
    /// `cancel_grace` to reach their next checkpoint. Hosts admitted after
    /// that run their first collector only. Fetches still running when the
    /// grace period ends are detached and land in a later flush.
    pub async fn run_cycle(&self, cycle: u64) -> CycleReport {
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + self.timeout;
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        tracing::info!(cycle, hosts = self.hosts.len(), "Cycle started");

        for host in self.hosts.iter() {
            let raced = if cancel.is_cancelled() {
                None
            } else {
                tokio::select! {
                    admitted = self.gate.admit() => Some(admitted),
                    _ = tokio::time::sleep_until(deadline) => None,
                }
            };
            let admitted = match raced {
                Some(admitted) => admitted,
                None => {
                    if !cancel.is_cancelled() {
                        tracing::warn!(cycle, "Cycle timeout reached while submitting, cancelling");
                        cancel.cancel();
                    }
                    self.gate.admit().await
                }
            };
            let permit = match admitted {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(cycle, error = %e, "Stopped submitting fetches");
                    break;
                }
            };
            if !cancel.is_cancelled() && tokio::time::Instant::now() >= deadline {
                tracing::warn!(cycle, "Cycle timeout reached while submitting, cancelling");
                cancel.cancel();
            }

            let host = host.clone();
            let connector = Arc::clone(&self.connector);
            let outbox = Arc::clone(&self.outbox);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let data = fetch(&host, connector.as_ref(), &cancel).await;
                outbox.push(data);
            });
        }

        let timed_out = tokio::time::timeout_at(deadline, drain(&mut tasks)).await.is_err();
        let mut detached = 0;
        if timed_out {
            cancel.cancel();
            tracing::warn!(
                cycle,
                running = tasks.len(),
                timeout_ms = self.timeout.as_millis() as u64,
                "Cycle timeout, cancelling remaining fetches"
            );
            if tokio::time::timeout(self.cancel_grace, drain(&mut tasks)).await.is_err() {
                detached = tasks.len();
                tracing::warn!(cycle, detached, "Fetches outlived the cancel grace period, detaching");
                tasks.detach_all();
            }
        }

        let flushed = self.outbox.flush(self.sink.as_ref()).await;

        tracing::info!(
            cycle,
            duration_ms = started.elapsed().as_millis() as u64,
            timed_out,
            detached,
            flushed = ?flushed,
            "Cycle finished"
        );

        CycleReport {
            cycle,
            hosts: self.hosts.len(),
            timed_out,
            detached,
            flushed,
        }
    }

    /// Run cycles on a fixed interval until `shutdown` fires.
    ///
    /// The first cycle starts immediately. A cycle that overruns the interval
    /// delays the next one; cycles never overlap. A cycle in flight when
    /// shutdown fires runs to completion. The gate is then closed and
    /// pending records get one last flush.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            hosts = self.hosts.len(),
            interval = %humantime::format_duration(self.interval),
            max_tasks = self.gate.capacity(),
            "Scheduler started"
        );

        let mut cycle = 0u64;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            cycle += 1;
            self.run_cycle(cycle).await;
        }

        self.gate.close();
        let flushed = self.outbox.flush(self.sink.as_ref()).await;
        tracing::info!(cycles = cycle, flushed = ?flushed, "Scheduler stopped");
    }
}

async fn drain(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            tracing::error!(error = %CollectorError::from(e), "Fetch task did not complete");
        }
    }
}
