//! The event stream client
//!
//! [`KefStream`] ties the pieces together: it registers a session at
//! construction, owns the translator and the event channel, and drives the
//! poll loop either in place ([`KefStream::run`]) or on a spawned task
//! ([`KefStream::spawn`]).

use std::sync::Arc;

use kef_api::{HttpClient, KefClient, Transport};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::channel::{EventChannel, EventReceiver};
use crate::config::StreamConfig;
use crate::error::{RegistrationError, Result, StreamError};
use crate::poller::{PollLoop, PollStats};
use crate::registrar::SessionRegistrar;
use crate::subscription::{SessionId, Subscription};
use crate::translator::{EventTranslator, SnapshotSource};

/// A live event feed from one speaker
///
/// # Example
///
/// ```rust,ignore
/// use kef_stream::{KefStream, StreamConfig};
/// use tokio_util::sync::CancellationToken;
///
/// let stream = KefStream::connect_host("192.168.1.40", StreamConfig::default()).await?;
/// let mut events = stream.events().expect("events taken once");
/// let cancel = CancellationToken::new();
/// let task = stream.spawn(cancel.clone());
///
/// while let Some(event) = events.recv().await {
///     println!("{} {:?}", event.source_path, event.data);
/// }
/// ```
#[derive(Debug)]
pub struct KefStream {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    subscriptions: Vec<Subscription>,
    translator: Arc<EventTranslator>,
    channel: Arc<EventChannel>,
    receiver: Mutex<Option<EventReceiver>>,
    poller: PollLoop,
}

impl KefStream {
    /// Register `subscriptions` and build a stream for the resulting session.
    ///
    /// Fails if the configuration is invalid or registration fails. Nothing
    /// is polled until [`run`](Self::run) or [`spawn`](Self::spawn).
    pub async fn connect(
        transport: Arc<dyn Transport>,
        snapshots: Arc<dyn SnapshotSource>,
        subscriptions: Vec<Subscription>,
        config: StreamConfig,
    ) -> Result<Self> {
        config.validate()?;

        let session = SessionRegistrar::new(Arc::clone(&transport))
            .register(&subscriptions)
            .await?;

        let translator = Arc::new(EventTranslator::new(snapshots));
        let (channel, receiver) = EventChannel::new(config.channel_capacity);
        let channel = Arc::new(channel);

        let poller = PollLoop::new(
            transport,
            session,
            Arc::clone(&translator),
            Arc::clone(&channel),
            config,
        );

        Ok(Self {
            inner: Arc::new(Inner {
                subscriptions,
                translator,
                channel,
                receiver: Mutex::new(Some(receiver)),
                poller,
            }),
        })
    }

    /// Connect to the speaker at `host` with the default subscription set
    pub async fn connect_host(host: &str, config: StreamConfig) -> Result<Self> {
        let http = HttpClient::new(host).map_err(RegistrationError::Transport)?;
        let transport: Arc<dyn Transport> = Arc::new(http);
        let snapshots = Arc::new(KefClient::with_transport(Arc::clone(&transport)));

        Self::connect(transport, snapshots, Subscription::defaults(), config).await
    }

    pub fn session_id(&self) -> &SessionId {
        self.inner.poller.session()
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.inner.subscriptions
    }

    /// Take the receiving half of the event channel. `None` after the first call.
    pub fn events(&self) -> Option<EventReceiver> {
        self.inner.receiver.lock().take()
    }

    /// Run the poll loop on the current task until it stops.
    ///
    /// See [`PollLoop::run`] for the exit conditions.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        self.inner.poller.run(cancel).await
    }

    /// Run the poll loop on a new tokio task.
    ///
    /// The channel is closed when the task ends, so the consumer sees the
    /// end of the stream whatever the reason.
    pub fn spawn(&self, cancel: CancellationToken) -> JoinHandle<Result<()>> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = inner.poller.run(&cancel).await;
            // A rejected second run must not close the channel under the first
            if !matches!(result, Err(StreamError::AlreadyRunning)) {
                inner.channel.close();
            }
            result
        })
    }

    pub fn is_running(&self) -> bool {
        self.inner.poller.is_running()
    }

    pub fn stats(&self) -> PollStats {
        self.inner.poller.stats()
    }

    pub fn translator(&self) -> &EventTranslator {
        &self.inner.translator
    }

    /// Close the event channel. Safe to call any number of times from any task.
    ///
    /// A running poll loop stops at its next send or poll boundary.
    pub fn close(&self) {
        if self.inner.channel.close() {
            info!(session = %self.session_id(), "Event stream closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.channel.is_closed()
    }
}
