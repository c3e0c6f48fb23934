//! Metadata publication
//!
//! Proposal descriptions are published out of band; proposals keep only the
//! returned [`ContentRef`].

use multisig_types::ContentRef;
use std::collections::HashMap;
use std::sync::RwLock;

pub trait MetadataStore: Send + Sync {
    /// Store `content` and return its content-addressed reference
    fn publish(&self, content: &[u8]) -> ContentRef;

    fn fetch(&self, reference: &ContentRef) -> Option<Vec<u8>>;
}

/// Content-addressed store held in memory
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    blobs: RwLock<HashMap<ContentRef, Vec<u8>>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn publish(&self, content: &[u8]) -> ContentRef {
        let reference = ContentRef::for_content(content);
        let mut blobs = self
            .blobs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        blobs
            .entry(reference.clone())
            .or_insert_with(|| content.to_vec());
        reference
    }

    fn fetch(&self, reference: &ContentRef) -> Option<Vec<u8>> {
        self.blobs
            .read()
            .ok()
            .and_then(|blobs| blobs.get(reference).cloned())
    }
}
