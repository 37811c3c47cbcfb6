//! RSVP service
//!
//! Owns the injected [`DocumentStore`] and is the only writer of the ledger
//! and guest list. Every mutation is a full read-modify-write of one
//! document, so all mutations run under a single async mutex: two
//! concurrent submissions can never interleave their load and save.
//!
//! Reads for the admin views take the same lock, which keeps them from
//! observing a half-finished cycle on stores without atomic replace.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::admission::{self, AdmissionPolicy};
use crate::auth::AdminCredential;
use crate::error::{Result, RsvpError, StorageError};
use crate::guest_list::{clean_entry, GuestList};
use crate::ledger::Ledger;
use crate::model::{RsvpOverview, RsvpRecord, RsvpSubmission, Stamp};
use crate::sanitize::sanitize_input;
use crate::store::DocumentStore;

/// Outcome of a guest-list edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestListChange {
    /// The name as stored in the list
    pub guest: String,
    /// List size after the edit
    pub total: usize,
}

/// Construction-time settings for [`RsvpService`]
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub admin: AdminCredential,
    pub policy: AdmissionPolicy,
    pub ledger_document: String,
    pub guest_list_document: String,
}

impl ServiceConfig {
    pub fn new(admin_password: &str) -> Self {
        Self {
            admin: AdminCredential::new(admin_password),
            policy: AdmissionPolicy::default(),
            ledger_document: "rsvps.json".to_string(),
            guest_list_document: "guests.txt".to_string(),
        }
    }

    pub fn with_policy(mut self, policy: AdmissionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_documents(mut self, ledger: &str, guest_list: &str) -> Self {
        self.ledger_document = ledger.to_string();
        self.guest_list_document = guest_list.to_string();
        self
    }
}

pub struct RsvpService {
    config: ServiceConfig,
    store: Arc<dyn DocumentStore>,
    write_lock: Mutex<()>,
}

impl RsvpService {
    pub fn new(config: ServiceConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.config.policy
    }

    async fn load_ledger(&self) -> Result<Ledger> {
        match self.store.read(&self.config.ledger_document).await? {
            Some(bytes) => Ok(Ledger::from_json(&bytes)?),
            None => Ok(Ledger::new()),
        }
    }

    async fn save_ledger(&self, ledger: &Ledger) -> Result<()> {
        let bytes = ledger.to_json()?;
        self.store.write(&self.config.ledger_document, &bytes).await?;
        Ok(())
    }

    async fn load_guest_list(&self) -> Result<GuestList> {
        match self.store.read(&self.config.guest_list_document).await? {
            Some(bytes) => {
                let text = String::from_utf8(bytes)
                    .map_err(|e| StorageError::Encoding(format!("guest list is not UTF-8: {e}")))?;
                Ok(GuestList::parse(&text))
            }
            None => Ok(GuestList::new()),
        }
    }

    async fn save_guest_list(&self, guests: &GuestList) -> Result<()> {
        self.store
            .write(&self.config.guest_list_document, guests.render().as_bytes())
            .await?;
        Ok(())
    }

    fn authorize(&self, credential: Option<&str>, operation: &str) -> Result<()> {
        self.config.admin.authorize(credential).inspect_err(|_| {
            warn!(operation, "Rejected admin credential");
        })
    }

    /// Admit a submission and append it to the ledger.
    ///
    /// `origin` is the best-effort client address recorded on the record.
    pub async fn submit_rsvp(&self, submission: &RsvpSubmission, origin: &str) -> Result<RsvpRecord> {
        let _guard = self.write_lock.lock().await;

        let guests = self.load_guest_list().await?;
        let mut ledger = self.load_ledger().await?;

        let record = admission::admit(
            &ledger,
            &guests,
            submission,
            Stamp::now(origin),
            &self.config.policy,
        )?;

        ledger.push(record.clone())?;
        self.save_ledger(&ledger).await?;

        info!(
            id = %record.id,
            attending = record.attending.as_str(),
            guests = ?record.guests,
            total = ledger.len(),
            "New RSVP received"
        );

        Ok(record)
    }

    /// Remove an RSVP by id.
    pub async fn delete_rsvp(&self, credential: Option<&str>, id: &str) -> Result<RsvpRecord> {
        self.authorize(credential, "delete_rsvp")?;
        let _guard = self.write_lock.lock().await;

        let mut ledger = self.load_ledger().await?;
        let removed = ledger.remove(id)?;
        self.save_ledger(&ledger).await?;

        info!(id = %removed.id, names = %removed.names, "Admin deleted RSVP");
        Ok(removed)
    }

    /// Add a guest-list entry.
    pub async fn add_guest(&self, credential: Option<&str>, name: &str) -> Result<GuestListChange> {
        self.authorize(credential, "add_guest")?;

        let name = clean_entry(&sanitize_input(name, self.config.policy.max_field_len));
        if name.is_empty() {
            return Err(RsvpError::MissingFields);
        }

        let _guard = self.write_lock.lock().await;
        let mut guests = self.load_guest_list().await?;
        let name = guests.add(&name)?;
        self.save_guest_list(&guests).await?;

        info!(guest = %name, total = guests.len(), "Admin added guest");
        Ok(GuestListChange {
            guest: name,
            total: guests.len(),
        })
    }

    /// Remove a guest-list entry, matched case-insensitively.
    pub async fn delete_guest(&self, credential: Option<&str>, name: &str) -> Result<GuestListChange> {
        self.authorize(credential, "delete_guest")?;
        if name.trim().is_empty() {
            return Err(RsvpError::MissingFields);
        }

        let _guard = self.write_lock.lock().await;
        let mut guests = self.load_guest_list().await?;
        let removed = guests.remove(name.trim())?;
        self.save_guest_list(&guests).await?;

        info!(guest = %removed, total = guests.len(), "Admin deleted guest");
        Ok(GuestListChange {
            guest: removed,
            total: guests.len(),
        })
    }

    /// Every RSVP with summary counts.
    pub async fn list_rsvps(&self, credential: Option<&str>) -> Result<RsvpOverview> {
        self.authorize(credential, "list_rsvps")?;
        let _guard = self.write_lock.lock().await;

        let ledger = self.load_ledger().await?;
        Ok(RsvpOverview::new(ledger.into_records()))
    }

    /// The current guest list.
    pub async fn list_guests(&self, credential: Option<&str>) -> Result<Vec<String>> {
        self.authorize(credential, "list_guests")?;
        let _guard = self.write_lock.lock().await;

        Ok(self.load_guest_list().await?.into_names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const PASSWORD: &str = "letmein";

    fn service() -> (RsvpService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = RsvpService::new(ServiceConfig::new(PASSWORD), store.clone());
        (service, store)
    }

    fn yes(names: &str, phone: &str) -> RsvpSubmission {
        RsvpSubmission::new(names, phone, "yes").with_guests(2)
    }

    #[tokio::test]
    async fn test_submit_persists_record() {
        let (service, store) = service();
        let record = service.submit_rsvp(&yes("John Smith", "5551234567"), "10.1.2.3").await.unwrap();

        let bytes = store.read("rsvps.json").await.unwrap().unwrap();
        let ledger = Ledger::from_json(&bytes).unwrap();
        assert_eq!(ledger.records(), &[record.clone()]);
        assert_eq!(record.ip_address, "10.1.2.3");
    }

    #[tokio::test]
    async fn test_duplicate_leaves_ledger_unchanged() {
        let (service, _) = service();
        service.submit_rsvp(&yes("John Smith", "5551234567"), "a").await.unwrap();
        let err = service
            .submit_rsvp(&yes("john smith", "5551234567"), "b")
            .await
            .unwrap_err();
        assert!(matches!(err, RsvpError::DuplicateSubmission));

        let overview = service.list_rsvps(Some(PASSWORD)).await.unwrap();
        assert_eq!(overview.summary.total, 1);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let (service, _) = service();
        let a = service.submit_rsvp(&yes("A A", "5551234567"), "x").await.unwrap();
        let b = service.submit_rsvp(&yes("B B", "5551234567"), "x").await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_admin_operations_require_password() {
        let (service, store) = service();
        assert!(matches!(service.add_guest(None, "X").await, Err(RsvpError::Unauthorized)));
        assert!(matches!(
            service.add_guest(Some("wrong"), "X").await,
            Err(RsvpError::Unauthorized)
        ));
        assert!(matches!(
            service.delete_guest(Some("wrong"), "X").await,
            Err(RsvpError::Unauthorized)
        ));
        assert!(matches!(
            service.delete_rsvp(Some("wrong"), "X").await,
            Err(RsvpError::Unauthorized)
        ));
        assert!(matches!(service.list_rsvps(None).await, Err(RsvpError::Unauthorized)));
        assert!(matches!(service.list_guests(None).await, Err(RsvpError::Unauthorized)));

        // nothing was written
        assert!(store.read("guests.txt").await.unwrap().is_none());
        assert!(store.read("rsvps.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_guest_list_gates_submissions() {
        let (service, _) = service();
        service.add_guest(Some(PASSWORD), "Jane Doe").await.unwrap();

        let err = service.submit_rsvp(&yes("Bob", "5551234567"), "x").await.unwrap_err();
        assert!(matches!(err, RsvpError::NotOnGuestList));
        assert!(service.submit_rsvp(&yes("jane doe", "5551234567"), "x").await.is_ok());
    }

    #[tokio::test]
    async fn test_add_guest_sanitizes_and_rejects_blank() {
        let (service, _) = service();
        let change = service.add_guest(Some(PASSWORD), "  <Jane> Doe  ").await.unwrap();
        assert_eq!(change.guest, "Jane Doe");
        assert_eq!(change.total, 1);
        assert!(matches!(
            service.add_guest(Some(PASSWORD), "   ").await,
            Err(RsvpError::MissingFields)
        ));
    }

    #[tokio::test]
    async fn test_delete_guest() {
        let (service, _) = service();
        service.add_guest(Some(PASSWORD), "Jane Doe").await.unwrap();
        let change = service.delete_guest(Some(PASSWORD), "JANE DOE").await.unwrap();
        assert_eq!(change.guest, "Jane Doe");
        assert_eq!(change.total, 0);
        assert!(matches!(
            service.delete_guest(Some(PASSWORD), "Jane Doe").await,
            Err(RsvpError::NotFound(_))
        ));
        assert!(service.list_guests(Some(PASSWORD)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_submissions_are_not_lost() {
        let (service, _) = service();
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for i in 0..20 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                let sub = yes(&format!("Guest {i}"), "5551234567");
                service.submit_rsvp(&sub, "x").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let overview = service.list_rsvps(Some(PASSWORD)).await.unwrap();
        assert_eq!(overview.summary.total, 20);
    }
}
