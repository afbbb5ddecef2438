//! Revocable references to generated documents.
//!
//! A [`DocumentHandle`] is what callers hold on to for displaying or
//! downloading a document. The bytes live in a [`HandleStore`] until the
//! caller revokes the handle; nothing else ever releases them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// A revocable reference to one generated document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentHandle {
    id: Uuid,
    title: String,
}

impl DocumentHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Download name: the title with whitespace runs collapsed to `_` and
    /// anything outside `[A-Za-z0-9_.-]` dropped, plus `.pdf`.
    pub fn file_name(&self) -> String {
        let collapsed = self.title.split_whitespace().collect::<Vec<_>>().join("_");
        let mut name: String = collapsed
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            .collect();
        if name.is_empty() {
            name.push_str("document");
        }
        name.push_str(".pdf");
        name
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "folio:{}", self.id)
    }
}

/// Shared storage behind document handles.
#[derive(Debug, Clone, Default)]
pub struct HandleStore {
    documents: Arc<Mutex<HashMap<Uuid, Arc<Vec<u8>>>>>,
}

impl HandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` under a fresh handle.
    pub fn insert(&self, title: impl Into<String>, bytes: Vec<u8>) -> DocumentHandle {
        let handle = DocumentHandle {
            id: Uuid::new_v4(),
            title: title.into(),
        };
        self.lock().insert(handle.id, Arc::new(bytes));
        handle
    }

    /// The document bytes, or `None` once the handle has been revoked.
    pub fn get(&self, handle: &DocumentHandle) -> Option<Arc<Vec<u8>>> {
        self.lock().get(&handle.id).cloned()
    }

    /// Release the document. Returns false if it was already released.
    pub fn revoke(&self, handle: &DocumentHandle) -> bool {
        self.lock().remove(&handle.id).is_some()
    }

    pub fn is_live(&self, handle: &DocumentHandle) -> bool {
        self.lock().contains_key(&handle.id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Arc<Vec<u8>>>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_collapses_whitespace() {
        let store = HandleStore::new();
        let handle = store.insert("Daily  Attendance\tReport", vec![]);
        assert_eq!(handle.file_name(), "Daily_Attendance_Report.pdf");
        let handle = store.insert("13th Month Pay (2026)", vec![]);
        assert_eq!(handle.file_name(), "13th_Month_Pay_2026.pdf");
        let handle = store.insert("  ", vec![]);
        assert_eq!(handle.file_name(), "document.pdf");
    }

    #[test]
    fn revoking_one_handle_keeps_others() {
        let store = HandleStore::new();
        let a = store.insert("A", b"first".to_vec());
        let b = store.insert("A", b"second".to_vec());
        assert_ne!(a, b);

        assert!(store.revoke(&a));
        assert!(!store.revoke(&a));
        assert!(store.get(&a).is_none());
        assert_eq!(store.get(&b).unwrap().as_slice(), b"second");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clones_share_storage() {
        let store = HandleStore::new();
        let handle = store.clone().insert("Shared", vec![1, 2, 3]);
        assert!(store.is_live(&handle));
    }
}
