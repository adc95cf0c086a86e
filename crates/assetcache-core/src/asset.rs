//! The cached document: immutable bytes plus content type.

use std::fmt;
use std::sync::Arc;

/// Immutable binary asset. Clones share the same buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Asset {
    content: Arc<[u8]>,
    content_type: Arc<str>,
}

impl Asset {
    pub fn new(content: impl Into<Arc<[u8]>>, content_type: impl Into<Arc<str>>) -> Self {
        Self {
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Lowercase hex SHA-256 of the content.
    pub fn sha256(&self) -> String {
        crate::checksum::sha256_bytes(&self.content)
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("len", &self.content.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_buffer() {
        let a = Asset::new(b"%PDF-1.7".to_vec(), "application/pdf");
        let b = a.clone();
        assert!(std::ptr::eq(a.content().as_ptr(), b.content().as_ptr()));
        assert_eq!(b.content_type(), "application/pdf");
        assert_eq!(b.len(), 8);
    }

    #[test]
    fn debug_omits_bytes() {
        let a = Asset::new(vec![0u8; 4096], "application/pdf");
        let s = format!("{:?}", a);
        assert!(s.contains("len: 4096"));
        assert!(s.len() < 100);
    }
}
