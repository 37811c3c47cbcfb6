//! RSVP data model
//!
//! `RsvpSubmission` is what the outside world sends; `RsvpRecord` is what the
//! ledger keeps. Records are created once by admission and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether the respondent will attend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Yes,
    No,
}

impl Attendance {
    /// `"yes"` in any case is `Yes`; any other value is `No`.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("yes") {
            Self::Yes
        } else {
            Self::No
        }
    }

    pub fn is_attending(self) -> bool {
        self == Self::Yes
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

/// One accepted RSVP as stored in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRecord {
    pub id: String,
    pub names: String,
    pub phone: String,
    pub attending: Attendance,
    /// Party size, only for attending records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
}

impl RsvpRecord {
    /// Whether this record and a submission name the same party.
    ///
    /// Names compare case-folded, phones compare exactly.
    pub fn same_party(&self, names: &str, phone: &str) -> bool {
        self.phone == phone && self.names.to_lowercase() == names.to_lowercase()
    }

    /// Headcount this record contributes
    pub fn headcount(&self) -> u32 {
        if self.attending.is_attending() {
            u32::from(self.guests.unwrap_or(1))
        } else {
            0
        }
    }
}

/// Party size as sent by clients: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuestCountInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl GuestCountInput {
    /// Integer value, if the input is one
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<i64> for GuestCountInput {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// An RSVP as submitted, before validation
///
/// Every field is optional here so that missing fields surface as a
/// domain rejection rather than a decode error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RsvpSubmission {
    #[serde(default)]
    pub names: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub attending: Option<String>,
    #[serde(default)]
    pub guests: Option<GuestCountInput>,
    #[serde(default)]
    pub dietary: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RsvpSubmission {
    /// Convenience constructor for the required fields
    pub fn new(names: &str, phone: &str, attending: &str) -> Self {
        Self {
            names: Some(names.to_string()),
            phone: Some(phone.to_string()),
            attending: Some(attending.to_string()),
            ..Self::default()
        }
    }

    pub fn with_guests(mut self, guests: impl Into<GuestCountInput>) -> Self {
        self.guests = Some(guests.into());
        self
    }

    pub fn with_dietary(mut self, dietary: &str) -> Self {
        self.dietary = Some(dietary.to_string());
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

/// Server-assigned facts stamped onto a new record
#[derive(Debug, Clone)]
pub struct Stamp {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
}

impl Stamp {
    /// Fresh id and current time for a request from `ip_address`
    pub fn now(ip_address: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            ip_address: ip_address.into(),
        }
    }
}

/// Counts over the ledger for the admin view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpSummary {
    pub total: usize,
    pub attending: usize,
    pub not_attending: usize,
    pub total_guests: u32,
}

impl RsvpSummary {
    pub fn from_records(records: &[RsvpRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            acc.total += 1;
            if r.attending.is_attending() {
                acc.attending += 1;
            } else {
                acc.not_attending += 1;
            }
            acc.total_guests += r.headcount();
            acc
        })
    }
}

/// Admin view: summary plus every record in ledger order
#[derive(Debug, Clone, Serialize)]
pub struct RsvpOverview {
    #[serde(flatten)]
    pub summary: RsvpSummary,
    pub rsvps: Vec<RsvpRecord>,
}

impl RsvpOverview {
    pub fn new(rsvps: Vec<RsvpRecord>) -> Self {
        Self {
            summary: RsvpSummary::from_records(&rsvps),
            rsvps,
        }
    }
}
