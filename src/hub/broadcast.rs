//! Fan-out of event text to every registered client.

use super::Hub;

/// Outcome of one broadcast call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
}

impl Hub {
    /// Deliver `message` to every connection registered at call time.
    ///
    /// Writes run concurrently, one per connection, each bounded by the write
    /// deadline. A connection whose write fails is unregistered and closed.
    /// Failures never reach the caller.
    pub async fn broadcast(&self, message: &str) -> BroadcastReport {
        let recipients = self.registry.snapshot();
        if recipients.is_empty() {
            tracing::debug!("Broadcast with no connected clients");
            return BroadcastReport::default();
        }

        let deadline = self.config.write_timeout;
        let outcomes = futures::future::join_all(recipients.iter().map(|conn| async move {
            match conn.send_text(message, deadline).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(conn_id = conn.id(), error = %e, "Dropping client after failed write");
                    self.disconnect(conn.id()).await;
                    false
                }
            }
        }))
        .await;

        let delivered = outcomes.iter().filter(|ok| **ok).count();
        let report = BroadcastReport {
            delivered,
            dropped: outcomes.len() - delivered,
        };

        tracing::debug!(
            delivered = report.delivered,
            dropped = report.dropped,
            "Broadcast event"
        );
        report
    }
}
