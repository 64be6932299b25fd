//! Event kinds, payload schemas, and the notification envelope.
//!
//! Every broadcast serializes to the same versioned envelope:
//!
//! ```json
//! {
//!   "timestamp": "2025-12-11T10:30:00Z",
//!   "event_type": "book_borrowed",
//!   "service": "book_management_api",
//!   "version": "v14",
//!   "data": { ...fixed per-kind fields... }
//! }
//! ```
//!
//! `data` is a closed set of variant record shapes keyed by event kind, so
//! field presence is checked when the envelope is built rather than at the
//! subscriber.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Constant service identifier included in every envelope.
pub const SERVICE_NAME: &str = "book_management_api";

/// Constant payload schema version included in every envelope.
pub const SCHEMA_VERSION: &str = "v14";

/// Domain event kinds that produce webhook notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A user borrowed a book copy
    BookBorrowed,
    /// A borrowed book copy was returned
    BookReturned,
    /// A new user account was created
    UserRegistered,
    /// Operator-triggered test notification
    SystemHealth,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BookBorrowed => write!(f, "book_borrowed"),
            Self::BookReturned => write!(f, "book_returned"),
            Self::UserRegistered => write!(f, "user_registered"),
            Self::SystemHealth => write!(f, "system_health"),
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "book_borrowed" => Ok(Self::BookBorrowed),
            "book_returned" => Ok(Self::BookReturned),
            "user_registered" => Ok(Self::UserRegistered),
            "system_health" => Ok(Self::SystemHealth),
            _ => Err(format!("Unknown event type: {}", s)),
        }
    }
}

/// Event-kind-specific payload.
///
/// Serialized untagged: the wire `data` object is the plain field map of the
/// active variant, with the kind carried separately in the envelope's
/// `event_type` field. Entity fields (names, titles, dates) must already be
/// resolved by the caller — building a payload performs no lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventData {
    // Borrow/return dates come from the catalogue's persistence layer as
    // offset-free local timestamps, and are forwarded unchanged.
    BookReturned {
        borrowing_id: i64,
        user_id: i64,
        user_name: String,
        user_email: String,
        book_copy_id: i64,
        book_title: String,
        book_author: String,
        borrow_date: NaiveDateTime,
        due_date: Option<NaiveDateTime>,
        return_date: NaiveDateTime,
        fine: i64,
        overdue_days: i64,
    },
    BookBorrowed {
        borrowing_id: i64,
        user_id: i64,
        user_name: String,
        user_email: String,
        book_copy_id: i64,
        book_title: String,
        book_author: String,
        borrow_date: NaiveDateTime,
        due_date: Option<NaiveDateTime>,
    },
    UserRegistered {
        user_id: i64,
        user_name: String,
        user_email: String,
    },
    SystemHealth {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl EventData {
    /// Deserialize raw source data into the fixed schema for `event_type`.
    ///
    /// A missing or mistyped required field fails with
    /// [`Error::MalformedEventData`] — partial payloads are never produced.
    pub fn from_source(event_type: EventType, source: serde_json::Value) -> Result<Self> {
        let malformed = |e: serde_json::Error| Error::MalformedEventData {
            event_type,
            reason: e.to_string(),
        };

        match event_type {
            EventType::BookBorrowed => {
                #[derive(Deserialize)]
                struct Fields {
                    borrowing_id: i64,
                    user_id: i64,
                    user_name: String,
                    user_email: String,
                    book_copy_id: i64,
                    book_title: String,
                    book_author: String,
                    borrow_date: NaiveDateTime,
                    #[serde(default)]
                    due_date: Option<NaiveDateTime>,
                }
                let f: Fields = serde_json::from_value(source).map_err(malformed)?;
                Ok(Self::BookBorrowed {
                    borrowing_id: f.borrowing_id,
                    user_id: f.user_id,
                    user_name: f.user_name,
                    user_email: f.user_email,
                    book_copy_id: f.book_copy_id,
                    book_title: f.book_title,
                    book_author: f.book_author,
                    borrow_date: f.borrow_date,
                    due_date: f.due_date,
                })
            }
            EventType::BookReturned => {
                #[derive(Deserialize)]
                struct Fields {
                    borrowing_id: i64,
                    user_id: i64,
                    user_name: String,
                    user_email: String,
                    book_copy_id: i64,
                    book_title: String,
                    book_author: String,
                    borrow_date: NaiveDateTime,
                    #[serde(default)]
                    due_date: Option<NaiveDateTime>,
                    return_date: NaiveDateTime,
                    fine: i64,
                    overdue_days: i64,
                }
                let f: Fields = serde_json::from_value(source).map_err(malformed)?;
                Ok(Self::BookReturned {
                    borrowing_id: f.borrowing_id,
                    user_id: f.user_id,
                    user_name: f.user_name,
                    user_email: f.user_email,
                    book_copy_id: f.book_copy_id,
                    book_title: f.book_title,
                    book_author: f.book_author,
                    borrow_date: f.borrow_date,
                    due_date: f.due_date,
                    return_date: f.return_date,
                    fine: f.fine,
                    overdue_days: f.overdue_days,
                })
            }
            EventType::UserRegistered => {
                #[derive(Deserialize)]
                struct Fields {
                    user_id: i64,
                    user_name: String,
                    user_email: String,
                }
                let f: Fields = serde_json::from_value(source).map_err(malformed)?;
                Ok(Self::UserRegistered {
                    user_id: f.user_id,
                    user_name: f.user_name,
                    user_email: f.user_email,
                })
            }
            EventType::SystemHealth => {
                #[derive(Deserialize)]
                struct Fields {
                    message: String,
                    timestamp: DateTime<Utc>,
                }
                let f: Fields = serde_json::from_value(source).map_err(malformed)?;
                Ok(Self::SystemHealth {
                    message: f.message,
                    timestamp: f.timestamp,
                })
            }
        }
    }
}

/// Immutable, versioned notification envelope.
///
/// Built fresh for every broadcast and only ever serialized afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// When the event occurred (UTC)
    pub timestamp: DateTime<Utc>,
    /// Event kind (e.g. "book_borrowed")
    pub event_type: EventType,
    /// Originating service identifier
    pub service: String,
    /// Payload schema version
    pub version: String,
    /// Event-kind-specific data
    pub data: EventData,
}

impl Envelope {
    /// Build an envelope from an event kind and its raw source data.
    ///
    /// Pure apart from reading the wall clock for `timestamp`; performs no
    /// I/O. Fails with [`Error::MalformedEventData`] when `source` does not
    /// satisfy the kind's fixed field set.
    pub fn build(event_type: EventType, source: serde_json::Value) -> Result<Self> {
        let data = EventData::from_source(event_type, source)?;
        Ok(Self {
            timestamp: Utc::now(),
            event_type,
            service: SERVICE_NAME.to_string(),
            version: SCHEMA_VERSION.to_string(),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn borrowed_source() -> serde_json::Value {
        json!({
            "borrowing_id": 123,
            "user_id": 45,
            "user_name": "Ada Lovelace",
            "user_email": "ada@example.com",
            "book_copy_id": 7,
            "book_title": "Clean Code",
            "book_author": "Robert C. Martin",
            "borrow_date": "2025-11-27T10:30:00",
            "due_date": "2025-12-11T10:30:00"
        })
    }

    #[test]
    fn test_event_type_round_trip() {
        assert_eq!(
            "book_borrowed".parse::<EventType>().unwrap(),
            EventType::BookBorrowed
        );
        assert_eq!(EventType::SystemHealth.to_string(), "system_health");
        assert!("invalid".parse::<EventType>().is_err());
    }

    #[test]
    fn test_build_book_borrowed() {
        let envelope = Envelope::build(EventType::BookBorrowed, borrowed_source()).unwrap();

        assert_eq!(envelope.event_type, EventType::BookBorrowed);
        assert_eq!(envelope.service, SERVICE_NAME);
        assert_eq!(envelope.version, SCHEMA_VERSION);

        match &envelope.data {
            EventData::BookBorrowed {
                borrowing_id,
                book_title,
                due_date,
                ..
            } => {
                assert_eq!(*borrowing_id, 123);
                assert_eq!(book_title, "Clean Code");
                assert!(due_date.is_some());
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_build_missing_field_fails() {
        let mut source = borrowed_source();
        source.as_object_mut().unwrap().remove("book_title");

        let err = Envelope::build(EventType::BookBorrowed, source).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedEventData {
                event_type: EventType::BookBorrowed,
                ..
            }
        ));
    }

    #[test]
    fn test_build_mistyped_field_fails() {
        let mut source = borrowed_source();
        source["borrowing_id"] = json!("not-a-number");

        let err = Envelope::build(EventType::BookBorrowed, source).unwrap_err();
        assert!(matches!(err, Error::MalformedEventData { .. }));
    }

    #[test]
    fn test_due_date_is_optional() {
        let mut source = borrowed_source();
        source.as_object_mut().unwrap().remove("due_date");

        let envelope = Envelope::build(EventType::BookBorrowed, source).unwrap();
        match &envelope.data {
            EventData::BookBorrowed { due_date, .. } => assert!(due_date.is_none()),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_wire_format() {
        let envelope = Envelope::build(EventType::BookBorrowed, borrowed_source()).unwrap();
        let wire: serde_json::Value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(wire["event_type"], "book_borrowed");
        assert_eq!(wire["service"], "book_management_api");
        assert_eq!(wire["version"], "v14");
        // data is the plain field map, not a tagged enum
        assert_eq!(wire["data"]["borrowing_id"], 123);
        assert_eq!(wire["data"]["due_date"], "2025-12-11T10:30:00");
        // envelope timestamp is UTC ISO-8601
        assert!(wire["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_build_system_health() {
        let envelope = Envelope::build(
            EventType::SystemHealth,
            json!({
                "message": "Test webhook notification",
                "timestamp": Utc::now(),
            }),
        )
        .unwrap();

        match &envelope.data {
            EventData::SystemHealth { message, .. } => {
                assert_eq!(message, "Test webhook notification");
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_build_user_registered() {
        let envelope = Envelope::build(
            EventType::UserRegistered,
            json!({
                "user_id": 45,
                "user_name": "Ada Lovelace",
                "user_email": "ada@example.com",
            }),
        )
        .unwrap();

        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(wire["data"]["user_id"], 45);
        assert_eq!(wire["data"]["user_email"], "ada@example.com");
    }

    #[test]
    fn test_returned_requires_fine_fields() {
        // Borrow-shaped data is not enough for a return event
        let err = Envelope::build(EventType::BookReturned, borrowed_source()).unwrap_err();
        assert!(matches!(err, Error::MalformedEventData { .. }));
    }
}
