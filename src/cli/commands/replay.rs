use std::path::Path;
use std::sync::Arc;

use chrono::FixedOffset;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{info, warn};

use crate::adapters::directory::site_snapshot::{SiteChange, SiteSnapshot};
use crate::cli::commands::storage::Storage;
use crate::cli::{context, output};
use crate::core::errors::{LogManagerError, Result};
use crate::core::models::notification::Notification;
use crate::core::services::event_bus::EventBus;
use crate::core::services::request::RequestContext;

/// One recorded host request: who made it and what happened, in order.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordedRequest {
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub user_id: u64,
    /// Raw steps, decoded one at a time so a bad step does not sink the file.
    pub steps: Vec<serde_json::Value>,
}

/// A notification to dispatch, or a site mutation to apply before the next
/// notification sees the site.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStep {
    Notify(Notification),
    Site(SiteChange),
}

/// Totals for one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub requests: usize,
    pub notifications: usize,
    pub entries: usize,
    pub skipped: usize,
}

/// Parse a requests file.
pub fn parse_requests(content: &str) -> Result<Vec<RecordedRequest>> {
    serde_json::from_str(content).map_err(|e| LogManagerError::ReplayError {
        detail: e.to_string(),
    })
}

/// Run every request through `bus`, each with its own request context.
pub fn run(
    bus: &EventBus,
    site: &SiteSnapshot,
    requests: Vec<RecordedRequest>,
    offset: FixedOffset,
    mut on_request: impl FnMut(),
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();

    for request in requests {
        let mut ctx = RequestContext::new(request.ip_address, request.user_id, offset);
        for (index, raw) in request.steps.into_iter().enumerate() {
            let step = match serde_json::from_value::<ReplayStep>(raw) {
                Ok(step) => step,
                Err(e) => {
                    warn!(request = summary.requests, step = index, error = %e, "skipping undecodable replay step");
                    summary.skipped += 1;
                    continue;
                }
            };
            match step {
                ReplayStep::Notify(notification) => {
                    summary.notifications += 1;
                    summary.entries += bus.dispatch(&notification, &mut ctx);
                }
                ReplayStep::Site(change) => site.apply(change),
            }
        }
        if !ctx.pending.is_empty() {
            tracing::debug!(left = ctx.pending.len(), "request ended with unconsumed snapshots");
        }
        summary.requests += 1;
        on_request();
    }

    summary
}

fn progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template("  {bar:40} {pos}/{len} requests") {
        bar.set_style(style);
    }
    bar
}

/// Execute the `log-manager replay` command.
pub fn execute(requests_path: &str, site_path: &str, quiet: bool) -> Result<()> {
    let dir = context::require_initialized()?;
    let storage = Storage::open(dir)?;
    let offset = storage.config.utc_offset()?;

    let content = std::fs::read_to_string(Path::new(requests_path))?;
    let requests = parse_requests(&content)?;
    let site = Arc::new(SiteSnapshot::load(Path::new(site_path))?);
    let bus = EventBus::with_standard_engines(storage.router(), site.clone());

    info!(requests = requests.len(), backend = storage.config.backend().as_str(), "replay started");
    let bar = progress_bar(requests.len() as u64, quiet);
    let summary = run(&bus, &site, requests, offset, || bar.inc(1));
    bar.finish_and_clear();

    output::header("log-manager replay");
    output::success(&format!(
        "{} requests, {} notifications, {} entries recorded via {}",
        summary.requests,
        summary.notifications,
        summary.entries,
        storage.config.backend().as_str()
    ));
    if summary.skipped > 0 {
        output::warning(&format!("{} undecodable steps skipped", summary.skipped));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::directory::site_snapshot::SiteData;
    use crate::adapters::settings::memory_settings::MemorySettings;
    use crate::core::models::audit_entry::{AuditEntry, EventType};
    use crate::core::models::entities::Term;
    use crate::core::services::router::StorageRouter;
    use crate::core::traits::sink::AuditSink;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<AuditEntry>>);

    impl AuditSink for Collect {
        fn write(&self, entry: &AuditEntry) -> Result<()> {
            self.0.lock().push(entry.clone());
            Ok(())
        }
    }

    const REQUESTS: &str = r#"[
      {
        "ip_address": "198.51.100.4",
        "user_id": 1,
        "steps": [
          {"notify": {"hook": "term_before_edit", "term_id": 3, "taxonomy": "category"}},
          {"site": {"change": "upsert_term", "term": {"id": 3, "taxonomy_id": 13, "taxonomy": "category", "name": "Technology", "slug": "tech"}}},
          {"notify": {"hook": "term_edited", "term_id": 3, "taxonomy": "category"}}
        ]
      },
      {
        "steps": [
          {"notify": {"hook": "authentication_attempt", "username": "ghost_user", "outcome": "failure"}}
        ]
      }
    ]"#;

    fn site() -> SiteSnapshot {
        SiteSnapshot::new(SiteData {
            terms: vec![Term {
                id: 3,
                taxonomy_id: 13,
                taxonomy: "category".into(),
                name: "Tech".into(),
                slug: "tech".into(),
                ..Term::default()
            }],
            ..SiteData::default()
        })
    }

    #[test]
    fn replays_requests_in_order() {
        let sink = Arc::new(Collect::default());
        let router = StorageRouter::new(Arc::new(MemorySettings::default()), sink.clone(), sink.clone());
        let site = Arc::new(site());
        let bus = EventBus::with_standard_engines(router, site.clone());

        let requests = parse_requests(REQUESTS).unwrap();
        let mut ticks = 0;
        let summary = run(&bus, &site, requests, FixedOffset::east_opt(0).unwrap(), || ticks += 1);

        assert_eq!(
            summary,
            ReplaySummary {
                requests: 2,
                notifications: 3,
                entries: 2,
                skipped: 0
            }
        );
        assert_eq!(ticks, 2);

        let entries = sink.0.lock();
        assert_eq!(entries[0].event_type, EventType::Modified);
        assert_eq!(entries[0].ip_address, "198.51.100.4");
        assert!(entries[0].message.contains("Technology"));
        assert_eq!(entries[1].event_type, EventType::LoginFailed);
        assert_eq!(entries[1].userid, 0);
    }

    #[test]
    fn malformed_file_is_a_replay_error() {
        let err = parse_requests("{\"steps\": 1}").unwrap_err();
        assert!(matches!(err, LogManagerError::ReplayError { .. }));
    }

    #[test]
    fn undecodable_steps_are_skipped() {
        let sink = Arc::new(Collect::default());
        let router = StorageRouter::new(Arc::new(MemorySettings::default()), sink.clone(), sink.clone());
        let site = Arc::new(site());
        let bus = EventBus::with_standard_engines(router, site.clone());

        let requests = parse_requests(
            r#"[{"steps": [
                {"notify": {"hook": "post_status_transition", "new_status": "publish"}},
                {"notify": {"hook": "no_such_hook"}},
                {"notify": {"hook": "authentication_attempt", "username": "ghost_user", "outcome": "failure"}}
            ]}]"#,
        )
        .unwrap();
        let summary = run(&bus, &site, requests, FixedOffset::east_opt(0).unwrap(), || {});

        assert_eq!(
            summary,
            ReplaySummary {
                requests: 1,
                notifications: 2,
                entries: 1,
                skipped: 1
            }
        );
        let entries = sink.0.lock();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event_type, EventType::LoginFailed);
    }
}
