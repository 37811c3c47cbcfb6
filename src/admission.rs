//! RSVP admission
//!
//! Decides whether a submission becomes a ledger record. Checks run in a
//! fixed order and the first failure wins:
//!
//! 1. required fields (`names`, `phone`, `attending`)
//! 2. party size, when attending
//! 3. sanitization of all free text
//! 4. phone digit count
//! 5. guest-list match
//! 6. duplicate (names, phone) pair
//!
//! [`admit`] is pure: it reads the current ledger and guest list and returns
//! the record to append. Persisting it is the caller's job.

use serde::{Deserialize, Serialize};

use crate::error::RsvpError;
use crate::guest_list::GuestList;
use crate::ledger::Ledger;
use crate::matcher;
use crate::model::{Attendance, RsvpRecord, RsvpSubmission, Stamp};
use crate::sanitize::{self, is_valid_phone, sanitize_input, sanitize_optional};

/// Tunable limits for admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionPolicy {
    /// Largest party a single RSVP may bring
    #[serde(default = "default_max_party_size")]
    pub max_party_size: u8,

    /// Character limit for every free-text field
    #[serde(default = "default_max_field_len")]
    pub max_field_len: usize,

    #[serde(default = "default_phone_digits_min")]
    pub phone_digits_min: usize,

    #[serde(default = "default_phone_digits_max")]
    pub phone_digits_max: usize,

    /// Edit distance tolerated by the name matcher, percent of the longer name
    #[serde(default = "default_match_threshold_percent")]
    pub match_threshold_percent: u32,
}

fn default_max_party_size() -> u8 {
    8
}

fn default_max_field_len() -> usize {
    sanitize::DEFAULT_MAX_FIELD_LEN
}

fn default_phone_digits_min() -> usize {
    10
}

fn default_phone_digits_max() -> usize {
    11
}

fn default_match_threshold_percent() -> u32 {
    matcher::DEFAULT_THRESHOLD_PERCENT
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            max_party_size: default_max_party_size(),
            max_field_len: default_max_field_len(),
            phone_digits_min: default_phone_digits_min(),
            phone_digits_max: default_phone_digits_max(),
            match_threshold_percent: default_match_threshold_percent(),
        }
    }
}

impl AdmissionPolicy {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_party_size == 0 {
            return Err("max_party_size must be at least 1".to_string());
        }
        if self.phone_digits_min > self.phone_digits_max {
            return Err("phone_digits_min must be less than or equal to phone_digits_max".to_string());
        }
        if !(1..=100).contains(&self.match_threshold_percent) {
            return Err("match_threshold_percent must be between 1 and 100".to_string());
        }
        Ok(())
    }

    /// Whether `name` is admitted by `guests`
    pub fn is_allowed(&self, name: &str, guests: &GuestList) -> bool {
        matcher::is_allowed_with(name, guests.names(), self.match_threshold_percent)
    }
}

fn required(field: &Option<String>) -> Result<&str, RsvpError> {
    field
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(RsvpError::MissingFields)
}

/// Validate a submission against the current state and build its record.
pub fn admit(
    ledger: &Ledger,
    guests: &GuestList,
    submission: &RsvpSubmission,
    stamp: Stamp,
    policy: &AdmissionPolicy,
) -> Result<RsvpRecord, RsvpError> {
    let names = required(&submission.names)?;
    let phone = required(&submission.phone)?;
    let attending = Attendance::parse(required(&submission.attending)?);

    let party_size = if attending.is_attending() {
        let count = submission
            .guests
            .as_ref()
            .and_then(|g| g.as_integer())
            .filter(|n| (1..=i64::from(policy.max_party_size)).contains(n))
            .ok_or(RsvpError::InvalidGuestCount {
                max: policy.max_party_size,
            })?;
        // bounded by max_party_size above
        Some(count as u8)
    } else {
        None
    };

    let max_len = policy.max_field_len;
    let names = sanitize_input(names, max_len);
    let phone = sanitize_input(phone, max_len);
    if names.is_empty() || phone.is_empty() {
        return Err(RsvpError::MissingFields);
    }
    // free-text extras are only kept for guests who are coming
    let (dietary, message) = if attending.is_attending() {
        (
            sanitize_optional(submission.dietary.as_deref(), max_len),
            sanitize_optional(submission.message.as_deref(), max_len),
        )
    } else {
        (None, None)
    };

    if !is_valid_phone(&phone, policy.phone_digits_min, policy.phone_digits_max) {
        return Err(RsvpError::InvalidPhone);
    }

    if !policy.is_allowed(&names, guests) {
        return Err(RsvpError::NotOnGuestList);
    }

    if ledger.find_duplicate(&names, &phone).is_some() {
        return Err(RsvpError::DuplicateSubmission);
    }

    Ok(RsvpRecord {
        id: stamp.id,
        names,
        phone,
        attending,
        guests: party_size,
        dietary,
        message,
        timestamp: stamp.timestamp,
        ip_address: stamp.ip_address,
    })
}
