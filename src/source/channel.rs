//! Channel-based data source.
//!
//! Receives dashboards via a tokio watch channel. The sampling loop sends
//! each finished tick and the UI picks up the latest one when it polls.

use tokio::sync::watch;

use super::DataSource;
use crate::data::Dashboard;

/// A data source that receives dashboards via a channel.
///
/// Only the latest dashboard is kept; if the UI falls behind, ticks it
/// missed are skipped rather than queued.
///
/// # Example
///
/// ```
/// use perfwatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("test");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Option<Dashboard>>,
    description: String,
    closed: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - A description of where dashboards come from
    pub fn new(receiver: watch::Receiver<Option<Dashboard>>, source_description: &str) -> Self {
        Self {
            receiver,
            description: source_description.to_string(),
            closed: false,
        }
    }

    /// Create a channel pair for sending dashboards to a ChannelSource.
    ///
    /// Returns (sender, source). The channel starts empty; the first poll
    /// returns `None` until something has been sent.
    pub fn create(source_description: &str) -> (watch::Sender<Option<Dashboard>>, Self) {
        let (tx, rx) = watch::channel(None);
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Dashboard> {
        match self.receiver.has_changed() {
            Ok(true) => self.receiver.borrow_and_update().clone(),
            Ok(false) => None,
            Err(_) => {
                // Sender dropped: the sampling loop has stopped.
                self.closed = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        if self.closed {
            Some("Sampling stopped")
        } else {
            None
        }
    }
}
