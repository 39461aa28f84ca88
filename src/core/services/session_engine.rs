use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use crate::core::models::audit_entry::{AuditEntry, EventType, ObjectType, Severity};
use crate::core::models::entities::User;
use crate::core::models::notification::{AuthOutcome, Notification, NotificationKind};
use crate::core::services::markup::{self, BR};
use crate::core::services::request::RequestContext;
use crate::core::traits::directory::ContentDirectory;
use crate::core::traits::subscriber::Subscriber;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Whether a submitted identifier should also be tried as an email address.
pub fn looks_like_email(identifier: &str) -> bool {
    EMAIL_RE.is_match(identifier)
}

/// `<br/>Full Name: <b>…</b>`, or nothing when both name parts are blank.
fn full_name_line(user: &User) -> String {
    user.full_name()
        .map(|name| format!("{BR}{}", markup::labelled("Full Name", &name)))
        .unwrap_or_default()
}

fn account_summary(headline: &str, user: &User) -> String {
    format!(
        "{headline}{BR}{}{BR}{}{BR}{}{}",
        markup::labelled("User ID", &user.id.to_string()),
        markup::labelled("Role", &user.roles.join(", ")),
        markup::labelled("Email", &user.email),
        full_name_line(user)
    )
}

/// Audits logins, logouts and failed authentication attempts.
pub struct UserSessionEngine {
    directory: Arc<dyn ContentDirectory>,
}

impl UserSessionEngine {
    pub fn new(directory: Arc<dyn ContentDirectory>) -> Self {
        Self { directory }
    }

    /// Find the account behind a submitted identifier: login name first,
    /// then email when the identifier looks like one.
    pub fn resolve_account(&self, identifier: &str) -> Option<User> {
        self.directory.user_by_login(identifier).or_else(|| {
            looks_like_email(identifier)
                .then(|| self.directory.user_by_email(identifier))
                .flatten()
        })
    }

    fn logged_in(&self, user_id: u64, request: &RequestContext) -> Option<AuditEntry> {
        let user = self.directory.user(user_id)?;
        Some(request.entry_for(
            user_id,
            ObjectType::User,
            Severity::Info,
            EventType::LoggedIn,
            account_summary("Login successful.", &user),
        ))
    }

    fn logged_out(&self, user_id: u64, request: &mut RequestContext) -> Option<AuditEntry> {
        request.mark_logout();
        if user_id == 0 {
            return None;
        }
        let user = self.directory.user(user_id)?;
        Some(request.entry_for(
            user_id,
            ObjectType::User,
            Severity::Info,
            EventType::Logout,
            account_summary("User logged out.", &user),
        ))
    }

    fn attempt(
        &self,
        username: &str,
        outcome: AuthOutcome,
        request: &RequestContext,
    ) -> Option<AuditEntry> {
        if request.logout_seen() {
            debug!("ignoring authentication during logout");
            return None;
        }
        // Blank input is skipped, but lookups use the identifier exactly as typed.
        if username.trim().is_empty() || outcome == AuthOutcome::Success {
            return None;
        }

        let entry = match self.resolve_account(username) {
            Some(user) => {
                let message = format!(
                    "Wrong password attempt.{BR}{}{BR}{}{BR}{}{}",
                    markup::labelled("User ID", &user.id.to_string()),
                    markup::labelled("Username", &user.login),
                    markup::labelled("Email", &user.email),
                    full_name_line(&user)
                );
                request.entry_for(
                    user.id,
                    ObjectType::User,
                    Severity::Warning,
                    EventType::LoginFailed,
                    message,
                )
            }
            None => request.entry_for(
                0,
                ObjectType::User,
                Severity::Alert,
                EventType::LoginFailed,
                format!(
                    "Login attempt with non-existent username: {}",
                    markup::bold(username)
                ),
            ),
        };
        Some(entry)
    }
}

impl Subscriber for UserSessionEngine {
    fn name(&self) -> &'static str {
        "session"
    }

    fn subscriptions(&self) -> &'static [NotificationKind] {
        &[
            NotificationKind::LoginCookieIssued,
            NotificationKind::Logout,
            NotificationKind::AuthenticationAttempt,
        ]
    }

    fn handle(
        &self,
        notification: &Notification,
        request: &mut RequestContext,
    ) -> Vec<AuditEntry> {
        let entry = match notification {
            Notification::LoginCookieIssued { user_id } => self.logged_in(*user_id, request),
            Notification::Logout { user_id } => self.logged_out(*user_id, request),
            Notification::AuthenticationAttempt { username, outcome } => {
                self.attempt(username, *outcome, request)
            }
            _ => None,
        };
        entry.into_iter().collect()
    }
}
