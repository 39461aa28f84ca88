use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::errors::LogManagerError;

/// Wall-clock format used for `event_time` in both sinks.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Kind of entity an entry is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Post,
    Taxonomy,
    Media,
    User,
    Settings,
}

/// Ordinal importance of an entry: `Info < Notice < Warning < Alert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Notice,
    Warning,
    Alert,
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    Created,
    Modified,
    Deleted,
    Trashed,
    Restored,
    Assigned,
    LoggedIn,
    Logout,
    LoginFailed,
}

/// A single audit record, ready to be handed to a sink.
///
/// Built by the engines through `RequestContext::entry` immediately before
/// persistence and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub ip_address: String,
    /// 0 when no authenticated actor is known.
    pub userid: u64,
    pub event_time: NaiveDateTime,
    pub object_type: ObjectType,
    pub severity: Severity,
    pub event_type: EventType,
    pub message: String,
}

impl AuditEntry {
    /// `event_time` rendered the way both sinks store it.
    pub fn formatted_time(&self) -> String {
        self.event_time.format(EVENT_TIME_FORMAT).to_string()
    }
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "Post",
            Self::Taxonomy => "Taxonomy",
            Self::Media => "Media",
            Self::User => "User",
            Self::Settings => "Settings",
        }
    }
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Alert => "alert",
        }
    }
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Trashed => "trashed",
            Self::Restored => "restored",
            Self::Assigned => "assigned",
            Self::LoggedIn => "logged-in",
            Self::Logout => "logout",
            Self::LoginFailed => "login-failed",
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ty, $label:literal, [$($variant:ident),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = LogManagerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s == <$ty>::$variant.as_str() {
                        return Ok(<$ty>::$variant);
                    }
                )+
                Err(LogManagerError::MalformedRow {
                    detail: format!("unknown {} '{s}'", $label),
                })
            }
        }
    };
}

display_and_parse!(ObjectType, "object type", [Post, Taxonomy, Media, User, Settings]);
display_and_parse!(Severity, "severity", [Info, Notice, Warning, Alert]);
display_and_parse!(
    EventType,
    "event type",
    [Created, Modified, Deleted, Trashed, Restored, Assigned, LoggedIn, Logout, LoginFailed]
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::Info < Severity::Notice);
        assert!(Severity::Notice < Severity::Warning);
        assert!(Severity::Warning < Severity::Alert);
        assert_eq!(Severity::default(), Severity::Notice);
    }

    #[test]
    fn event_type_uses_hyphenated_labels() {
        assert_eq!(EventType::LoggedIn.to_string(), "logged-in");
        assert_eq!(EventType::LoginFailed.to_string(), "login-failed");
        assert_eq!("login-failed".parse::<EventType>().unwrap(), EventType::LoginFailed);
    }

    #[test]
    fn serde_matches_display() {
        let json = serde_json::to_string(&EventType::LoggedIn).unwrap();
        assert_eq!(json, "\"logged-in\"");
        let json = serde_json::to_string(&Severity::Alert).unwrap();
        assert_eq!(json, "\"alert\"");
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!("Comment".parse::<ObjectType>().is_err());
        assert!("low".parse::<Severity>().is_err());
    }
}
