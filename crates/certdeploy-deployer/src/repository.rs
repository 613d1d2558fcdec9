//! Access records read from KDL files.

use async_trait::async_trait;
use std::path::PathBuf;

use certdeploy_config::{ConfigDocument, VariableContext, parse_document_with};
use certdeploy_core::{AccessRecord, AccessRepository, Error, Result};

/// Reads its files on every lookup, so edits apply to the next deployment.
#[derive(Debug, Clone)]
pub struct FileAccessRepository {
    paths: Vec<PathBuf>,
    vars: VariableContext,
}

impl FileAccessRepository {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>, vars: VariableContext) -> Self {
        Self {
            paths: paths.into_iter().collect(),
            vars,
        }
    }

    async fn load(&self) -> Result<ConfigDocument> {
        let mut document = ConfigDocument::default();
        for path in &self.paths {
            let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                Error::Internal(format!("failed to read {}: {}", path.display(), e))
            })?;
            let parsed = parse_document_with(&text, &self.vars)
                .map_err(|e| Error::from(e).context(path.display().to_string()))?;
            document.extend(parsed)?;
        }
        Ok(document)
    }
}

#[async_trait]
impl AccessRepository for FileAccessRepository {
    async fn get_by_id(&self, id: &str) -> Result<AccessRecord> {
        if id.is_empty() {
            return Err(Error::missing("providerAccessId"));
        }

        self.load()
            .await?
            .access
            .into_iter()
            .find(|record| record.id == id)
            .ok_or_else(|| Error::NotFound(format!("access #{}", id)))
    }
}
