//! Offline admin commands
//!
//! The same maintenance operations the HTTP admin routes expose, run
//! directly against the data directory and printed to stdout.

use clap::Subcommand;

use crate::error::RsvpError;
use crate::model::{RsvpOverview, RsvpRecord};
use crate::service::RsvpService;

/// Admin commands
#[derive(Debug, Clone, Subcommand)]
pub enum AdminCommand {
    /// Manage the guest list
    #[command(subcommand)]
    Guests(GuestCommand),

    /// Inspect or prune RSVPs
    #[command(subcommand)]
    Rsvps(RsvpCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum GuestCommand {
    /// Show every guest-list entry
    List,

    /// Add a name to the guest list
    Add {
        /// Name as it should appear in the list
        name: String,
    },

    /// Remove a name (case-insensitive)
    Remove {
        name: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum RsvpCommand {
    /// Show all RSVPs with summary counts
    List,

    /// Delete an RSVP by id
    Delete {
        /// RSVP id
        id: String,
    },
}

/// Execute an admin command
pub async fn execute(
    service: &RsvpService,
    password: &str,
    command: AdminCommand,
) -> Result<String, RsvpError> {
    let credential = Some(password);
    match command {
        AdminCommand::Guests(GuestCommand::List) => {
            let guests = service.list_guests(credential).await?;
            Ok(format_guests(&guests))
        }

        AdminCommand::Guests(GuestCommand::Add { name }) => {
            let change = service.add_guest(credential, &name).await?;
            Ok(format!("Added {} ({} on list)", change.guest, change.total))
        }

        AdminCommand::Guests(GuestCommand::Remove { name }) => {
            let change = service.delete_guest(credential, &name).await?;
            Ok(format!("Removed {} ({} on list)", change.guest, change.total))
        }

        AdminCommand::Rsvps(RsvpCommand::List) => {
            let overview = service.list_rsvps(credential).await?;
            Ok(format_overview(&overview))
        }

        AdminCommand::Rsvps(RsvpCommand::Delete { id }) => {
            let removed = service.delete_rsvp(credential, &id).await?;
            Ok(format!("Deleted RSVP {} ({})", removed.id, removed.names))
        }
    }
}

fn format_guests(guests: &[String]) -> String {
    if guests.is_empty() {
        return "Guest list is empty; anyone may RSVP".to_string();
    }
    let mut out = format!("Guest list ({}):\n", guests.len());
    for name in guests {
        out.push_str(&format!("  {}\n", name));
    }
    out
}

fn format_overview(overview: &RsvpOverview) -> String {
    let s = &overview.summary;
    let mut out = format!(
        "RSVPs: {} total, {} attending, {} not attending, {} guests\n",
        s.total, s.attending, s.not_attending, s.total_guests
    );
    for record in &overview.rsvps {
        out.push_str(&format_record(record));
        out.push('\n');
    }
    out
}

fn format_record(record: &RsvpRecord) -> String {
    let party = record
        .guests
        .map(|g| format!(" x{}", g))
        .unwrap_or_default();
    format!(
        "  {} {} [{}{}] {} {}",
        record.timestamp.format("%Y-%m-%d %H:%M"),
        record.id,
        record.attending.as_str(),
        party,
        record.names,
        record.phone,
    )
}
