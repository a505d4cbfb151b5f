//! The long-poll loop
//!
//! One loop runs per session. Each cycle issues a single poll request, then
//! translates and delivers the returned records in order before the next
//! request goes out. Failed cycles are retried after a pause until too many
//! fail back to back.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use kef_api::Transport;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::channel::{EventChannel, SendOutcome};
use crate::config::StreamConfig;
use crate::error::{StreamError, TransportError};
use crate::record::{parse_poll_response, MalformedRecord, RawRecord};
use crate::subscription::SessionId;
use crate::translator::EventTranslator;

pub(crate) const POLL_QUEUE_ENDPOINT: &str = "/api/event/pollQueue";

type PollBatch = Vec<Result<RawRecord, MalformedRecord>>;

/// Counters describing a poll loop, readable while it runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Poll requests issued
    pub polls: u64,
    /// Events handed to the channel
    pub events_emitted: u64,
    /// Player data changes suppressed as duplicates
    pub events_deduplicated: u64,
    /// Failed cycles since the last success
    pub consecutive_errors: u32,
}

/// Drives polling for one session
pub struct PollLoop {
    transport: Arc<dyn Transport>,
    session: SessionId,
    translator: Arc<EventTranslator>,
    channel: Arc<EventChannel>,
    config: StreamConfig,
    running: AtomicBool,
    polls: AtomicU64,
    events_emitted: AtomicU64,
    consecutive_errors: AtomicU32,
}

impl PollLoop {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: SessionId,
        translator: Arc<EventTranslator>,
        channel: Arc<EventChannel>,
        config: StreamConfig,
    ) -> Self {
        Self {
            transport,
            session,
            translator,
            channel,
            config,
            running: AtomicBool::new(false),
            polls: AtomicU64::new(0),
            events_emitted: AtomicU64::new(0),
            consecutive_errors: AtomicU32::new(0),
        }
    }

    /// Poll until cancelled, the channel closes, or too many cycles fail.
    ///
    /// Returns `Ok(())` when the channel was closed. Only one call may be
    /// active at a time; a concurrent call fails with
    /// [`StreamError::AlreadyRunning`].
    pub async fn run(&self, cancel: &CancellationToken) -> Result<(), StreamError> {
        let _guard = RunGuard::acquire(&self.running).ok_or(StreamError::AlreadyRunning)?;

        info!(session = %self.session, "Starting poll loop");
        let result = self.poll_cycles(cancel).await;

        match &result {
            Ok(()) => info!(session = %self.session, "Poll loop stopped, channel closed"),
            Err(StreamError::Cancelled) => info!(session = %self.session, "Poll loop cancelled"),
            Err(e) => error!(session = %self.session, error = %e, "Poll loop failed"),
        }

        result
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn stats(&self) -> PollStats {
        PollStats {
            polls: self.polls.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            events_deduplicated: self.translator.deduplicated(),
            consecutive_errors: self.consecutive_errors.load(Ordering::Relaxed),
        }
    }

    async fn poll_cycles(&self, cancel: &CancellationToken) -> Result<(), StreamError> {
        let mut consecutive: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(StreamError::Cancelled);
            }
            if self.channel.is_closed() {
                return Ok(());
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(StreamError::Cancelled),
                _ = self.channel.closed() => return Ok(()),
                outcome = self.poll_once() => outcome,
            };

            match outcome {
                Ok(batch) => {
                    consecutive = 0;
                    self.consecutive_errors.store(0, Ordering::Relaxed);

                    if !self.dispatch(batch, cancel).await? {
                        return Ok(());
                    }
                }
                Err(e) => {
                    consecutive += 1;
                    self.consecutive_errors.store(consecutive, Ordering::Relaxed);

                    if consecutive >= self.config.max_consecutive_errors {
                        error!(
                            session = %self.session,
                            attempt = consecutive,
                            error = %e,
                            "Too many consecutive poll failures"
                        );
                        return Err(StreamError::TooManyErrors {
                            count: consecutive,
                            last: e,
                        });
                    }

                    warn!(
                        session = %self.session,
                        attempt = consecutive,
                        max = self.config.max_consecutive_errors,
                        error = %e,
                        "Poll failed, retrying in {:?}",
                        self.config.retry_pause
                    );

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(StreamError::Cancelled),
                        _ = self.channel.closed() => return Ok(()),
                        _ = tokio::time::sleep(self.config.retry_pause) => {}
                    }
                }
            }
        }
    }

    async fn poll_once(&self) -> Result<PollBatch, TransportError> {
        self.polls.fetch_add(1, Ordering::Relaxed);

        let timeout = self.config.poll_timeout_secs().to_string();
        let deadline = self.config.cycle_deadline();
        let query = [
            ("queueId", self.session.as_str()),
            ("timeout", timeout.as_str()),
        ];

        let body = tokio::time::timeout(deadline, self.transport.get(POLL_QUEUE_ENDPOINT, &query))
            .await
            .map_err(|_| TransportError::Timeout(deadline))??;

        let batch = parse_poll_response(&body)?;
        debug!(session = %self.session, records = batch.len(), "Poll returned");
        Ok(batch)
    }

    /// Translate and deliver one batch in order. Returns false once the
    /// channel is closed.
    async fn dispatch(&self, batch: PollBatch, cancel: &CancellationToken) -> Result<bool, StreamError> {
        for record in batch {
            let event = match record {
                Ok(raw) => tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(StreamError::Cancelled),
                    event = self.translator.translate(raw) => event,
                },
                Err(malformed) => self.translator.translate_malformed(malformed),
            };

            let Some(event) = event else {
                continue;
            };

            debug!(
                session = %self.session,
                path = %event.source_path,
                kind = %event.kind(),
                "Emitting event"
            );

            match self.channel.send(event, cancel).await {
                SendOutcome::Sent => {
                    self.events_emitted.fetch_add(1, Ordering::Relaxed);
                }
                SendOutcome::Cancelled => return Err(StreamError::Cancelled),
                SendOutcome::Closed => return Ok(false),
            }
        }

        Ok(true)
    }
}

impl std::fmt::Debug for PollLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollLoop")
            .field("session", &self.session)
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Marks the loop as running for as long as it is held
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
