//! Wedding RSVP - guest-list gated RSVP service
//!
//! Accepts RSVPs over HTTP, checks each one against an optional guest list
//! with fuzzy name matching, rejects duplicate parties and keeps everything
//! in two plain files.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── rsvps.json     # Ledger: pretty-printed JSON array of RSVPs
//! └── guests.txt     # Guest list: one name per line, '#' comments
//! ```
//!
//! No `guests.txt` (or an empty one) means anyone may RSVP.

pub mod admission;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod guest_list;
pub mod http;
pub mod ledger;
pub mod matcher;
pub mod model;
pub mod sanitize;
pub mod service;
pub mod store;

// Re-exports
pub use admission::AdmissionPolicy;
pub use config::{Args, Config};
pub use error::{RsvpError, StorageError};
pub use guest_list::GuestList;
pub use http::HttpServer;
pub use ledger::Ledger;
pub use model::{Attendance, RsvpOverview, RsvpRecord, RsvpSubmission, RsvpSummary};
pub use service::{GuestListChange, RsvpService, ServiceConfig};
pub use store::{DocumentStore, FileStore, MemoryStore};
