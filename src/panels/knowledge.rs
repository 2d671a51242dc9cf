use crate::error::{ConsoleError, Result, ValidationError};
use crate::services::{DigitizationService, FileBlob, UploadService};
use crate::store::models::{
    seed_documents, seed_knowledge_bases, Document, DocumentDraft, DocumentStatus, KnowledgeBase,
    KnowledgeBaseDraft,
};
use crate::store::{RecordId, RecordStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Sub-tab of the knowledge panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeView {
    #[default]
    Bases,
    Documents,
}

/// A document joined with the name of its knowledge base. The name is empty
/// when the base no longer resolves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRow<'a> {
    pub document: &'a Document,
    pub knowledge_base_name: &'a str,
}

/// Renders a byte count the way document sizes are displayed ("2.4 MB").
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

pub struct KnowledgePanel {
    bases: RecordStore<KnowledgeBase>,
    documents: RecordStore<Document>,
    view: KnowledgeView,
    document_filter: Option<RecordId>,
    new_base_open: bool,
    new_base_draft: KnowledgeBaseDraft,
    upload: Arc<dyn UploadService>,
    digitizer: Arc<dyn DigitizationService>,
}

impl KnowledgePanel {
    pub fn new(upload: Arc<dyn UploadService>, digitizer: Arc<dyn DigitizationService>) -> Self {
        Self {
            bases: RecordStore::seeded(seed_knowledge_bases()),
            documents: RecordStore::seeded(seed_documents()),
            view: KnowledgeView::default(),
            document_filter: None,
            new_base_open: false,
            new_base_draft: KnowledgeBaseDraft::default(),
            upload,
            digitizer,
        }
    }

    pub fn view(&self) -> KnowledgeView {
        self.view
    }

    pub fn select_view(&mut self, view: KnowledgeView) {
        self.view = view;
    }

    pub fn knowledge_bases(&self) -> &[KnowledgeBase] {
        self.bases.list()
    }

    pub fn documents(&self) -> &[Document] {
        self.documents.list()
    }

    pub fn knowledge_base_name(&self, id: RecordId) -> Option<&str> {
        self.bases.get(id).map(|kb| kb.name.as_str())
    }

    pub fn create_knowledge_base(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<RecordId> {
        let kb = self.bases.add(KnowledgeBaseDraft {
            name: name.into(),
            description: description.into(),
        })?;
        info!(knowledge_base_id = %kb.id, name = %kb.name, "Knowledge base created");
        Ok(kb.id)
    }

    // ── New knowledge base modal ──

    pub fn open_new_base_form(&mut self) {
        self.new_base_open = true;
    }

    pub fn is_new_base_form_open(&self) -> bool {
        self.new_base_open
    }

    pub fn new_base_draft(&self) -> &KnowledgeBaseDraft {
        &self.new_base_draft
    }

    pub fn new_base_draft_mut(&mut self) -> &mut KnowledgeBaseDraft {
        &mut self.new_base_draft
    }

    pub fn submit_new_base(&mut self) -> Result<RecordId> {
        let draft = self.new_base_draft.clone();
        let id = self.create_knowledge_base(draft.name, draft.description)?;
        self.new_base_draft = KnowledgeBaseDraft::default();
        self.new_base_open = false;
        Ok(id)
    }

    pub fn cancel_new_base(&mut self) {
        self.new_base_open = false;
    }

    // ── Documents ──

    /// Jumps to the documents tab showing only this base's documents.
    pub fn manage_documents(&mut self, knowledge_base_id: RecordId) -> Result<()> {
        if !self.bases.contains(knowledge_base_id) {
            return Err(ConsoleError::NotFound(knowledge_base_id));
        }
        self.document_filter = Some(knowledge_base_id);
        self.view = KnowledgeView::Documents;
        Ok(())
    }

    pub fn document_filter(&self) -> Option<RecordId> {
        self.document_filter
    }

    pub fn clear_document_filter(&mut self) {
        self.document_filter = None;
    }

    pub fn document_rows(&self) -> Vec<DocumentRow<'_>> {
        self.documents
            .filter(|doc| {
                self.document_filter
                    .map_or(true, |kb_id| doc.knowledge_base_id == kb_id)
            })
            .into_iter()
            .map(|document| DocumentRow {
                document,
                knowledge_base_name: self
                    .knowledge_base_name(document.knowledge_base_id)
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Hands the file to the upload service and records the result under
    /// the given knowledge base.
    pub async fn upload_document(
        &mut self,
        knowledge_base_id: RecordId,
        blob: FileBlob,
    ) -> Result<RecordId> {
        if !self.bases.contains(knowledge_base_id) {
            return Err(ConsoleError::NotFound(knowledge_base_id));
        }

        let descriptor = self.upload.upload(&blob).await?;
        if descriptor.status != DocumentStatus::Uploaded {
            return Err(ValidationError::InvalidTransition {
                field: "status",
                from: DocumentStatus::Uploaded.to_string(),
                to: descriptor.status.to_string(),
            }
            .into());
        }
        let id = self
            .documents
            .add(DocumentDraft {
                name: descriptor.name,
                knowledge_base_id,
                size: format_size(descriptor.size_bytes),
            })?
            .id;
        self.bases.update(knowledge_base_id, |kb| kb.documents_count += 1)?;

        info!(document_id = %id, knowledge_base_id = %knowledge_base_id, "Document uploaded");
        Ok(id)
    }

    pub async fn digitize_document(&mut self, id: RecordId) -> Result<()> {
        let document = self
            .documents
            .get(id)
            .cloned()
            .ok_or(ConsoleError::NotFound(id))?;
        let next = document.status.digitized()?;

        self.digitizer.digitize(&document).await?;
        self.documents.update(id, |doc| doc.status = next)?;
        debug!(document_id = %id, "Document digitized");
        Ok(())
    }
}
