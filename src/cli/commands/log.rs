use std::sync::LazyLock;

use colored::Colorize;
use regex::Regex;

use crate::cli::commands::storage::Storage;
use crate::cli::{OrderBy, context, output};
use crate::core::errors::{LogManagerError, Result};
use crate::core::models::audit_entry::Severity;
use crate::core::traits::reader::{AuditQuery, AuditReader, SortColumn, SortDirection, StoredEntry};
use crate::core::traits::settings::StorageBackend;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Options of `log-manager log`, as parsed by clap.
#[derive(Debug, Clone)]
pub struct LogArgs {
    pub search: Option<String>,
    pub page: usize,
    pub per_page: usize,
    pub order_by: OrderBy,
    pub asc: bool,
}

impl LogArgs {
    fn query(&self) -> Result<AuditQuery> {
        if self.page == 0 || self.per_page == 0 {
            return Err(LogManagerError::InvalidQuery {
                detail: "--page and --per-page start at 1".into(),
            });
        }
        Ok(AuditQuery {
            search: self.search.clone(),
            order_by: sort_column(self.order_by),
            direction: if self.asc {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            },
            page: self.page,
            per_page: self.per_page,
        })
    }
}

fn sort_column(order_by: OrderBy) -> SortColumn {
    match order_by {
        OrderBy::Id => SortColumn::Id,
        OrderBy::IpAddress => SortColumn::IpAddress,
        OrderBy::Userid => SortColumn::UserId,
        OrderBy::EventTime => SortColumn::EventTime,
        OrderBy::ObjectType => SortColumn::ObjectType,
        OrderBy::Severity => SortColumn::Severity,
        OrderBy::EventType => SortColumn::EventType,
    }
}

/// Execute the `log-manager log` command.
///
/// Reads one page from the database backend. Entries written while the
/// text backend was active live in the text file and are not listed.
pub fn execute(args: &LogArgs) -> Result<()> {
    let dir = context::require_initialized()?;
    let storage = Storage::open(dir)?;
    let query = args.query()?;

    if storage.config.backend() == StorageBackend::File {
        output::warning("Active backend is the text file; listing database entries only");
    }

    let total = storage.database.count(query.search.as_deref())?;
    let entries = storage.database.fetch(&query)?;

    if entries.is_empty() {
        output::header("log-manager log");
        output::warning("No audit entries found");
        if query.search.is_some() || query.page > 1 {
            println!("  Try another page or drop --search.");
        }
        return Ok(());
    }

    let pages = total.div_ceil(query.per_page as u64).max(1);
    output::header(&format!(
        "log-manager log (page {} of {pages}, {total} entries)",
        query.page
    ));
    println!();

    for stored in &entries {
        print_entry(stored);
    }

    Ok(())
}

/// Render stored markup as a single terminal line.
pub fn plain_text(message: &str) -> String {
    let spaced = message.replace("<br/>", " · ").replace("<br>", " · ");
    TAG_RE
        .replace_all(&spaced, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

fn print_entry(stored: &StoredEntry) {
    let entry = &stored.entry;
    println!(
        "  {:>5} {} {} {} {:<8} {:<10} {:<8} {:>4} {}",
        stored.id.to_string().dimmed(),
        entry.formatted_time().dimmed(),
        "│".dimmed(),
        format_severity(entry.severity),
        entry.object_type.as_str(),
        entry.event_type.as_str(),
        entry.ip_address,
        entry.userid,
        plain_text(&entry.message),
    );
}

fn format_severity(severity: Severity) -> String {
    let label = format!("{:<7}", severity.as_str());
    match severity {
        Severity::Info => label.cyan().to_string(),
        Severity::Notice => label.green().to_string(),
        Severity::Warning => label.yellow().to_string(),
        Severity::Alert => label.red().bold().to_string(),
    }
}
