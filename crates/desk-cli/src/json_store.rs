//! JSON file ticket store.
//!
//! Keeps everything in an [`InMemoryTicketStore`] and rewrites the whole
//! file after every successful mutation. If the file cannot be written the
//! mutation is undone in memory too, so memory never runs ahead of disk.
//! Good for one operator at a time; two processes writing the same file
//! will overwrite each other.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};
use triage::{
    ExperienceFeedback, FeedbackRecord, InMemoryTicketStore, NewTicket, Priority, StoreError, StoreResult,
    StoreSnapshot, Ticket, TicketComment, TicketId, TicketStatus, TicketStore,
};

/// Error type for reading and writing the store file
#[derive(Debug, thiserror::Error)]
pub enum JsonStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid store file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<JsonStoreError> for StoreError {
    fn from(err: JsonStoreError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryTicketStore,
    /// Serializes file writes
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JsonStoreError> {
        let path = path.into();
        let snapshot = load_snapshot(&path)?.unwrap_or_default();
        debug!(path = %path.display(), tickets = snapshot.tickets.len(), "Store opened");
        Ok(Self {
            path,
            inner: InMemoryTicketStore::from_snapshot(snapshot),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `mutate` and write the result. A failed write restores the
    /// pre-mutation state before the error is returned.
    fn persisted<T>(
        &self,
        mutate: impl FnOnce(&InMemoryTicketStore) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let before = self.inner.snapshot()?;
        let value = mutate(&self.inner)?;
        if let Err(e) = save_snapshot(&self.inner.snapshot()?, &self.path) {
            warn!(path = %self.path.display(), error = %e, "Store write failed, mutation rolled back");
            self.inner.restore(before)?;
            return Err(e.into());
        }
        Ok(value)
    }
}

/// Read a snapshot; `None` if the file does not exist.
pub fn load_snapshot(path: &Path) -> Result<Option<StoreSnapshot>, JsonStoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path).map_err(|source| JsonStoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = serde_json::from_str(&json).map_err(|source| JsonStoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(snapshot))
}

/// Write a snapshot via a temp file and rename.
pub fn save_snapshot(snapshot: &StoreSnapshot, path: &Path) -> Result<(), JsonStoreError> {
    let json = serde_json::to_string_pretty(snapshot).map_err(|source| JsonStoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    let io_err = |source| JsonStoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(&tmp, json).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

impl TicketStore for JsonFileStore {
    fn create_ticket(&self, ticket: NewTicket) -> StoreResult<Ticket> {
        self.persisted(|inner| inner.create_ticket(ticket))
    }

    fn get_ticket(&self, id: TicketId) -> StoreResult<Ticket> {
        self.inner.get_ticket(id)
    }

    fn get_tickets(&self, owner: Option<&str>) -> StoreResult<Vec<Ticket>> {
        self.inner.get_tickets(owner)
    }

    fn update_status(&self, id: TicketId, status: TicketStatus) -> StoreResult<TicketStatus> {
        self.persisted(|inner| inner.update_status(id, status))
    }

    fn update_priority(&self, id: TicketId, priority: Priority) -> StoreResult<Priority> {
        self.persisted(|inner| inner.update_priority(id, priority))
    }

    fn delete_ticket(&self, id: TicketId) -> StoreResult<Ticket> {
        self.persisted(|inner| inner.delete_ticket(id))
    }

    fn record_feedback(&self, record: FeedbackRecord) -> StoreResult<()> {
        self.persisted(|inner| inner.record_feedback(record))
    }

    fn list_feedback(&self) -> StoreResult<Vec<FeedbackRecord>> {
        self.inner.list_feedback()
    }

    fn record_experience(&self, feedback: ExperienceFeedback) -> StoreResult<()> {
        self.persisted(|inner| inner.record_experience(feedback))
    }

    fn list_experience(&self) -> StoreResult<Vec<ExperienceFeedback>> {
        self.inner.list_experience()
    }

    fn add_comment(&self, comment: TicketComment) -> StoreResult<()> {
        self.persisted(|inner| inner.add_comment(comment))
    }

    fn list_comments(&self, ticket_id: TicketId) -> StoreResult<Vec<TicketComment>> {
        self.inner.list_comments(ticket_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use triage::Category;

    fn new_ticket(title: &str) -> NewTicket {
        NewTicket {
            user_id: "emp-3".to_string(),
            user_name: "Casey".to_string(),
            title: title.to_string(),
            description: format!("{title} is not working"),
            category: Category::Access,
            priority: Priority::Standard,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("desk.json")).unwrap();
        assert!(store.get_tickets(None).unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.json");

        let store = JsonFileStore::open(&path).unwrap();
        let a = store.create_ticket(new_ticket("VPN")).unwrap();
        let b = store.create_ticket(new_ticket("Email")).unwrap();
        store.update_status(a.id, TicketStatus::Resolved).unwrap();
        store.delete_ticket(b.id).unwrap();
        drop(store);

        let store = JsonFileStore::open(&path).unwrap();
        let tickets = store.get_tickets(None).unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].status, TicketStatus::Resolved);

        // Ids keep counting past deleted ones.
        let c = store.create_ticket(new_ticket("Wifi")).unwrap();
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_failed_mutation_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.json");
        let store = JsonFileStore::open(&path).unwrap();
        assert!(matches!(
            store.update_status(1, TicketStatus::Closed),
            Err(StoreError::NotFound(1))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::open(&path).err().unwrap();
        assert!(matches!(err, JsonStoreError::Json { .. }));
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.json");
        let store = JsonFileStore::open(&path).unwrap();
        let a = store.create_ticket(new_ticket("VPN")).unwrap();
        let b = store.create_ticket(new_ticket("Email")).unwrap();

        // A directory where the temp file goes makes every write fail.
        let blocker = dir.path().join("desk.json.tmp");
        std::fs::create_dir(&blocker).unwrap();
        assert!(matches!(
            store.update_status(a.id, TicketStatus::Closed),
            Err(StoreError::Backend(_))
        ));
        assert!(store.create_ticket(new_ticket("Wifi")).is_err());
        assert_eq!(store.get_ticket(a.id).unwrap().status, TicketStatus::Open);
        assert_eq!(store.get_tickets(None).unwrap().len(), 2);

        std::fs::remove_dir(&blocker).unwrap();
        store.update_priority(b.id, Priority::High).unwrap();
        drop(store);

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_ticket(a.id).unwrap().status, TicketStatus::Open);
        assert_eq!(store.get_ticket(b.id).unwrap().priority, Priority::High);
        // The rolled-back create did not burn an id.
        assert_eq!(store.create_ticket(new_ticket("Wifi")).unwrap().id, 3);
    }
}
