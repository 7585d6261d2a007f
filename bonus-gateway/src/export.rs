//! Export gating
//!
//! A serialized document reaches the packaging sink only when it parses.

use crate::error::{Error, Result};
use async_trait::async_trait;
use bonus_engine::validate;
use parking_lot::Mutex;
use tracing::{info, warn};

/// Destination for finished documents (download, archive)
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Take ownership of a validated document
    async fn accept(&self, serialized: &str) -> Result<()>;
}

/// Sink collecting exports in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    exports: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Create empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents received so far
    pub fn exports(&self) -> Vec<String> {
        self.exports.lock().clone()
    }
}

#[async_trait]
impl ExportSink for MemorySink {
    async fn accept(&self, serialized: &str) -> Result<()> {
        self.exports.lock().push(serialized.to_string());
        Ok(())
    }
}

/// Validate and hand the text to `sink`; refused while errors remain
pub async fn export_document(serialized: &str, sink: &dyn ExportSink) -> Result<()> {
    let errors = validate(serialized);
    if !errors.is_empty() {
        warn!("Export blocked: {}", errors[0]);
        return Err(Error::ExportBlocked(errors));
    }

    sink.accept(serialized).await?;
    info!("Exported document ({} bytes)", serialized.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_export_blocked_on_syntax_error() {
        let sink = MemorySink::new();
        let err = export_document("{\"id\": }", &sink).await.unwrap_err();

        match err {
            Error::ExportBlocked(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].line(), Some(1));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(sink.exports().is_empty());
    }

    #[tokio::test]
    async fn test_export_valid_document() {
        let sink = MemorySink::new();
        export_document("{\"id\": \"FS_1\"}", &sink).await.unwrap();
        assert_eq!(sink.exports(), vec!["{\"id\": \"FS_1\"}".to_string()]);
    }
}
