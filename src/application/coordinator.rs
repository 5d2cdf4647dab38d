//! Background series loading with last-writer-wins delivery.

use crate::domain::errors::{AppError, IngestResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::BarSeries;
use futures::StreamExt;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag handed to a loader
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(DataLoadError)` once cancelled, for use with `?` inside loaders.
    pub fn check(&self) -> IngestResult<()> {
        if self.is_cancelled() { Err(AppError::DataLoadError("load superseded".to_string())) } else { Ok(()) }
    }
}

/// Identifies one load request; later requests get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

type LoadMessage = (LoadTicket, IngestResult<BarSeries>);

/// Runs loaders on worker threads and hands finished series back to the
/// UI thread. Only the newest request's result is ever delivered.
pub struct LoadCoordinator {
    sender: UnboundedSender<LoadMessage>,
    receiver: UnboundedReceiver<LoadMessage>,
    latest: Option<(LoadTicket, CancelToken)>,
    next_ticket: u64,
}

impl Default for LoadCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadCoordinator {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver, latest: None, next_ticket: 1 }
    }

    /// Starts `loader` on a worker thread and cancels the previous request.
    pub fn request<F>(&mut self, loader: F) -> LoadTicket
    where
        F: FnOnce(&CancelToken) -> IngestResult<BarSeries> + Send + 'static,
    {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        let token = CancelToken::new();

        if let Some((previous, previous_token)) = self.latest.replace((ticket, token.clone())) {
            previous_token.cancel();
            get_logger().debug(
                LogComponent::Application("LoadCoordinator"),
                &format!("Load #{} superseded by #{}", previous.value(), ticket.value()),
            );
        }

        let sender = self.sender.clone();
        std::thread::spawn(move || {
            let result = loader(&token);
            let _ = sender.unbounded_send((ticket, result));
        });
        get_logger().info(
            LogComponent::Application("LoadCoordinator"),
            &format!("📥 Load #{} started", ticket.value()),
        );
        ticket
    }

    pub fn pending(&self) -> Option<LoadTicket> {
        self.latest.as_ref().map(|(ticket, _)| *ticket)
    }

    /// Non-blocking. Drains finished loads and returns the newest request's
    /// result if it has arrived; stale results are discarded.
    pub fn poll(&mut self) -> Option<IngestResult<BarSeries>> {
        let mut delivered = None;
        while let Ok(message) = self.receiver.try_recv() {
            if let Some(result) = self.accept(message) {
                delivered = Some(result);
            }
        }
        delivered
    }

    /// Waits for the newest request to finish. `None` when nothing is pending.
    pub async fn next_result(&mut self) -> Option<IngestResult<BarSeries>> {
        while self.latest.is_some() {
            let message = self.receiver.next().await?;
            if let Some(result) = self.accept(message) {
                return Some(result);
            }
        }
        None
    }

    fn accept(&mut self, (ticket, result): LoadMessage) -> Option<IngestResult<BarSeries>> {
        match self.latest {
            Some((latest, _)) if latest == ticket => {
                self.latest = None;
                match &result {
                    Ok(series) => get_logger().info(
                        LogComponent::Application("LoadCoordinator"),
                        &format!("✅ Load #{} delivered {} bars", ticket.value(), series.len()),
                    ),
                    Err(e) => get_logger().error(
                        LogComponent::Application("LoadCoordinator"),
                        &format!("❌ Load #{} failed: {}", ticket.value(), e),
                    ),
                }
                Some(result)
            }
            _ => {
                get_logger().debug(
                    LogComponent::Application("LoadCoordinator"),
                    &format!("Discarding stale load #{}", ticket.value()),
                );
                None
            }
        }
    }
}
