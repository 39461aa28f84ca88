use std::sync::Arc;

use chrono::FixedOffset;
use log_manager::adapters::audit::sqlite_sink::SqliteSink;
use log_manager::adapters::audit::text_file_sink::{LOG_FILE_NAME, TextFileSink};
use log_manager::adapters::directory::site_snapshot::{SiteChange, SiteData, SiteSnapshot};
use log_manager::adapters::settings::memory_settings::MemorySettings;
use log_manager::core::models::audit_entry::{EventType, ObjectType, Severity};
use log_manager::core::models::entities::{Post, Term, User};
use log_manager::core::models::notification::{AuthOutcome, Notification};
use log_manager::core::services::event_bus::EventBus;
use log_manager::core::services::request::RequestContext;
use log_manager::core::services::router::StorageRouter;
use log_manager::core::traits::reader::{AuditQuery, AuditReader};
use log_manager::core::traits::settings::StorageBackend;

struct Harness {
    settings: Arc<MemorySettings>,
    database: Arc<SqliteSink>,
    site: Arc<SiteSnapshot>,
    bus: EventBus,
    _dir: tempfile::TempDir,
}

fn term(id: u64, name: &str) -> Term {
    Term {
        id,
        taxonomy_id: id + 100,
        taxonomy: "category".into(),
        name: name.into(),
        slug: name.to_lowercase(),
        ..Term::default()
    }
}

fn harness(backend: StorageBackend) -> Harness {
    let dir = tempfile::TempDir::new().unwrap();
    let settings = Arc::new(MemorySettings::new(backend, Some(dir.path().to_path_buf())));
    let database = Arc::new(SqliteSink::in_memory("wp_").unwrap());
    let file = Arc::new(TextFileSink::new(settings.clone()));
    let router = StorageRouter::new(settings.clone(), database.clone(), file);

    let site = Arc::new(SiteSnapshot::new(SiteData {
        site_url: "https://cms.test".into(),
        posts: vec![Post {
            id: 50,
            post_type: "post".into(),
            status: "publish".into(),
            title: "Launch".into(),
            ..Post::default()
        }],
        terms: vec![term(1, "News"), term(2, "Sport"), term(3, "Tech"), term(4, "Art")],
        users: vec![User {
            id: 1,
            login: "admin".into(),
            email: "admin@cms.test".into(),
            roles: vec!["administrator".into()],
            ..User::default()
        }],
        ..SiteData::default()
    }));
    let bus = EventBus::with_standard_engines(router, site.clone());

    Harness {
        settings,
        database,
        site,
        bus,
        _dir: dir,
    }
}

fn request() -> RequestContext {
    RequestContext::new("203.0.113.5", 1, FixedOffset::east_opt(19800).unwrap())
}

fn failed_login(username: &str) -> Notification {
    Notification::AuthenticationAttempt {
        username: username.into(),
        outcome: AuthOutcome::Failure,
    }
}

fn stored(h: &Harness) -> Vec<log_manager::core::traits::reader::StoredEntry> {
    let mut rows = h.database.fetch(&AuditQuery::default()).unwrap();
    rows.reverse();
    rows
}

#[test]
fn three_writes_to_fresh_directory() {
    let h = harness(StorageBackend::File);
    let mut req = request();
    for name in ["a", "b", "c"] {
        assert_eq!(h.bus.dispatch(&failed_login(name), &mut req), 1);
    }

    let dir = h.settings_dir();
    let content = std::fs::read_to_string(dir.join(LOG_FILE_NAME)).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines.len(), 6);
    assert!(lines[0].chars().all(|c| c == '-'));
    assert!(lines[1].starts_with("Date & Time"));
    assert!(lines[2].chars().all(|c| c == '-'));
    for (line, name) in lines[3..].iter().zip(["a", "b", "c"]) {
        assert!(line.contains("login-failed"));
        assert!(line.ends_with(&format!("<b>{name}</b>")));
    }
    assert_eq!(h.database.count(None).unwrap(), 0);
}

#[test]
fn backend_switch_between_two_writes() {
    let h = harness(StorageBackend::Database);
    let mut req = request();

    h.bus.dispatch(&failed_login("first"), &mut req);
    h.settings.set_backend(StorageBackend::File);
    h.bus.dispatch(&failed_login("second"), &mut req);

    let rows = stored(&h);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].entry.message.contains("first"));

    let content = std::fs::read_to_string(h.settings_dir().join(LOG_FILE_NAME)).unwrap();
    assert!(content.contains("second"));
    assert!(!content.contains("first"));
}

#[test]
fn unwritable_file_backend_is_swallowed() {
    let h = harness(StorageBackend::File);
    let blocker = h.settings_dir().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();
    h.settings.set_file_directory(Some(blocker.join("nested")));

    let mut req = request();
    assert_eq!(h.bus.dispatch(&failed_login("ghost"), &mut req), 1);
    assert!(!blocker.join("nested").exists());
}

#[test]
fn term_edit_of_one_field_emits_one_entry() {
    let h = harness(StorageBackend::Database);
    let mut req = request();

    let before = Notification::TermBeforeEdit {
        term_id: 3,
        taxonomy_id: 103,
        taxonomy: "category".into(),
    };
    let after = Notification::TermEdited {
        term_id: 3,
        taxonomy_id: 103,
        taxonomy: "category".into(),
    };

    h.bus.dispatch(&before, &mut req);
    let mut renamed = term(3, "Tech");
    renamed.slug = "technology".into();
    h.site.apply(SiteChange::UpsertTerm { term: renamed });
    assert_eq!(h.bus.dispatch(&after, &mut req), 1);
    assert!(req.pending.is_empty());

    // unchanged edit
    h.bus.dispatch(&before, &mut req);
    assert_eq!(h.bus.dispatch(&after, &mut req), 0);

    let rows = stored(&h);
    assert_eq!(rows.len(), 1);
    let message = &rows[0].entry.message;
    assert!(message.starts_with("Slug changed"));
    assert!(!message.contains("name changed"));
    assert!(!message.contains("Description"));
}

#[test]
fn term_assignment_diff() {
    let h = harness(StorageBackend::Database);
    let mut req = request();

    let set = |old: Vec<u64>, new: Vec<u64>| Notification::ObjectTermsSet {
        object_id: 50,
        taxonomy: "category".into(),
        taxonomy_ids: new,
        old_taxonomy_ids: old,
    };

    assert_eq!(h.bus.dispatch(&set(vec![101, 102, 103], vec![102, 103, 104]), &mut req), 1);
    assert_eq!(h.bus.dispatch(&set(vec![101, 102], vec![102, 101]), &mut req), 0);

    let rows = stored(&h);
    let message = &rows[0].entry.message;
    assert!(message.contains("<b>Art</b> added to the post."));
    assert!(message.contains("<b>News</b> removed from the post."));
    assert!(!message.contains("Sport"));
}

#[test]
fn failed_logins_by_account_existence() {
    let h = harness(StorageBackend::Database);
    let mut req = RequestContext::new("198.51.100.7", 0, FixedOffset::east_opt(0).unwrap());

    h.bus.dispatch(&failed_login("admin"), &mut req);
    h.bus.dispatch(&failed_login("ghost_user"), &mut req);

    let rows = stored(&h);
    assert_eq!(rows.len(), 2);

    let known = &rows[0].entry;
    assert_eq!(known.severity, Severity::Warning);
    assert_eq!(known.event_type, EventType::LoginFailed);
    assert_eq!(known.userid, 1);
    assert_eq!(known.object_type, ObjectType::User);

    let unknown = &rows[1].entry;
    assert_eq!(unknown.severity, Severity::Alert);
    assert_eq!(unknown.event_type, EventType::LoginFailed);
    assert_eq!(unknown.userid, 0);
    assert_eq!(unknown.ip_address, "198.51.100.7");
}

#[test]
fn snapshots_do_not_cross_requests() {
    let h = harness(StorageBackend::Database);

    let mut first = request();
    h.bus.dispatch(
        &Notification::TermBeforeEdit {
            term_id: 3,
            taxonomy_id: 103,
            taxonomy: "category".into(),
        },
        &mut first,
    );
    drop(first);

    h.site.apply(SiteChange::UpsertTerm { term: term(3, "Renamed") });
    let mut second = request();
    let recorded = h.bus.dispatch(
        &Notification::TermEdited {
            term_id: 3,
            taxonomy_id: 103,
            taxonomy: "category".into(),
        },
        &mut second,
    );
    assert_eq!(recorded, 0);
}

impl Harness {
    fn settings_dir(&self) -> std::path::PathBuf {
        use log_manager::core::traits::settings::SettingsSource;
        self.settings.file_directory().unwrap()
    }
}
