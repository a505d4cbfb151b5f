//! Bounded event channel between the poll loop and the consumer
//!
//! The sending half is owned by the client and may be closed from any task.
//! The receiving half is handed to the consumer once and offers async,
//! non-blocking and timed receives as well as a [`Stream`] implementation.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::event::KefEvent;

/// Result of handing an event to the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// The cancellation token fired while waiting for capacity
    Cancelled,
    /// The channel was closed, or the receiver dropped
    Closed,
}

/// Sending half of the event channel
#[derive(Debug)]
pub struct EventChannel {
    sender: Mutex<Option<mpsc::Sender<KefEvent>>>,
    closed: CancellationToken,
}

impl EventChannel {
    /// Create a channel holding at most `capacity` undelivered events
    pub fn new(capacity: usize) -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let channel = Self {
            sender: Mutex::new(Some(tx)),
            closed: CancellationToken::new(),
        };
        (channel, EventReceiver::new(rx))
    }

    /// Send an event, waiting for capacity.
    ///
    /// The wait ends early if `cancel` fires or the channel is closed.
    pub async fn send(&self, event: KefEvent, cancel: &CancellationToken) -> SendOutcome {
        let sender = match self.sender.lock().as_ref() {
            Some(sender) => sender.clone(),
            None => return SendOutcome::Closed,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => SendOutcome::Cancelled,
            _ = self.closed.cancelled() => SendOutcome::Closed,
            result = sender.send(event) => match result {
                Ok(()) => SendOutcome::Sent,
                Err(_) => SendOutcome::Closed,
            },
        }
    }

    /// Close the channel. Returns true for the call that actually closed it.
    ///
    /// Events already queued stay receivable; the receiver yields `None`
    /// once they are drained.
    pub fn close(&self) -> bool {
        let sender = self.sender.lock().take();
        match sender {
            Some(sender) => {
                self.closed.cancel();
                drop(sender);
                true
            }
            None => false,
        }
    }

    /// Whether [`close`](Self::close) was called or the receiver dropped
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
            || self
                .sender
                .lock()
                .as_ref()
                .map_or(true, |sender| sender.is_closed())
    }

    /// Completes once [`close`](Self::close) has been called or the
    /// receiver has been dropped
    pub async fn closed(&self) {
        let sender = self.sender.lock().clone();
        let Some(sender) = sender else {
            return;
        };

        tokio::select! {
            _ = self.closed.cancelled() => {}
            _ = sender.closed() => {}
        }
    }
}

/// Receiving half of the event channel
#[derive(Debug)]
pub struct EventReceiver {
    receiver: mpsc::Receiver<KefEvent>,
    received: u64,
}

impl EventReceiver {
    fn new(receiver: mpsc::Receiver<KefEvent>) -> Self {
        Self {
            receiver,
            received: 0,
        }
    }

    /// Wait for the next event. `None` once the channel is closed and drained.
    pub async fn recv(&mut self) -> Option<KefEvent> {
        let event = self.receiver.recv().await;
        if event.is_some() {
            self.received += 1;
        }
        event
    }

    /// Take the next event if one is queued
    pub fn try_recv(&mut self) -> Option<KefEvent> {
        match self.receiver.try_recv() {
            Ok(event) => {
                self.received += 1;
                Some(event)
            }
            Err(mpsc::error::TryRecvError::Empty) | Err(mpsc::error::TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// `Err(Elapsed)` when the time ran out, `Ok(None)` when the channel is
    /// closed and drained.
    pub async fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<KefEvent>, tokio::time::error::Elapsed> {
        tokio::time::timeout(timeout, self.recv()).await
    }

    /// Number of events received so far
    pub fn received(&self) -> u64 {
        self.received
    }
}

impl Stream for EventReceiver {
    type Item = KefEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = self.receiver.poll_recv(cx);
        if let Poll::Ready(Some(_)) = &polled {
            self.received += 1;
        }
        polled
    }
}
