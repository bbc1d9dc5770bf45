//! History and logs command handlers.

use clap::Args;
use promptdoc_core::AppResult;
use promptdoc_processor::{AuditSink, SqliteAuditLog};

/// Show processed-request history
#[derive(Args, Debug)]
pub struct HistoryCommand {
    /// Maximum number of entries
    #[arg(long, default_value = "10")]
    pub limit: usize,

    /// Filter by caller identity
    #[arg(long)]
    pub user: Option<String>,

    /// Filter by purpose
    #[arg(long)]
    pub purpose: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HistoryCommand {
    /// Execute the history command.
    pub fn execute(&self, audit: &SqliteAuditLog) -> AppResult<()> {
        let entries = audit.recent(self.limit, self.user.as_deref(), self.purpose.as_deref())?;

        if self.json {
            let values: Vec<_> = entries
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "seq": e.seq,
                        "timestamp": e.timestamp,
                        "user": e.record.user,
                        "purpose": e.record.purpose,
                        "provider": e.record.provider,
                        "prompt_id": e.record.prompt_id,
                        "latency_ms": e.record.latency_ms,
                        "prompt": e.record.prompt_text,
                        "response": e.record.response_text,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&values)?);
            return Ok(());
        }

        if entries.is_empty() {
            println!("No history");
            return Ok(());
        }

        for entry in entries {
            println!(
                "#{}  {}  user={} purpose={} provider={} prompt={} {}ms",
                entry.seq,
                entry.timestamp,
                entry.record.user,
                entry.record.purpose,
                entry.record.provider,
                entry.record.prompt_id,
                entry.record.latency_ms
            );
        }
        Ok(())
    }
}

/// Show mirrored application logs
#[derive(Args, Debug)]
pub struct LogsCommand {
    /// Maximum number of entries
    #[arg(long, default_value = "100")]
    pub limit: usize,

    /// Filter by level (ERROR, WARN, INFO)
    #[arg(long)]
    pub level: Option<String>,
}

impl LogsCommand {
    /// Execute the logs command.
    pub fn execute(&self, audit: &SqliteAuditLog) -> AppResult<()> {
        let level = self.level.as_ref().map(|l| l.to_uppercase());
        let logs = audit.recent_logs(self.limit, level.as_deref())?;

        if logs.is_empty() {
            println!("No logs");
            return Ok(());
        }

        for log in logs {
            println!(
                "#{}  {}  {:5}  {}  {}",
                log.seq, log.timestamp, log.level, log.target, log.message
            );
        }
        Ok(())
    }
}
