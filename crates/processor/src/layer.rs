//! Tracing layer that mirrors log events into the audit database.
//!
//! Failures inside the layer are swallowed: logging must never break the
//! primary request path, and a broken audit database must not take down
//! the subscriber.

use crate::audit::SqliteAuditLog;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Mirrors INFO-and-above events to the audit log's `logs` table.
pub struct AuditLogLayer {
    sink: Arc<SqliteAuditLog>,
}

impl AuditLogLayer {
    /// Create a layer writing to the given audit log.
    pub fn new(sink: Arc<SqliteAuditLog>) -> Self {
        Self { sink }
    }
}

impl<S: Subscriber> Layer<S> for AuditLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        // Debug/trace stay on stderr only.
        if *metadata.level() > Level::INFO {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let _ = self.sink.log_event(
            metadata.level().as_str(),
            metadata.target(),
            &visitor.message,
        );
    }
}

/// Collects the event's `message` field, falling back to `key=value` pairs.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            if !self.message.is_empty() {
                self.message.push(' ');
            }
            let _ = write!(self.message, "{}={:?}", field.name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_events_reach_the_logs_table() {
        let sink = Arc::new(SqliteAuditLog::open_in_memory().unwrap());
        let subscriber =
            tracing_subscriber::registry().with(AuditLogLayer::new(Arc::clone(&sink)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("request processed");
            tracing::warn!("provider slow");
            tracing::debug!("not mirrored");
        });

        let logs = sink.recent_logs(10, None).unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().any(|l| l.message.contains("request processed")));
        assert!(logs.iter().all(|l| !l.message.contains("not mirrored")));
    }
}
