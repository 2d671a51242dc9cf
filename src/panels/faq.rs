use crate::error::{ConsoleError, Result};
use crate::store::models::{seed_faqs, FaqDraft, FaqItem, FaqStatus, Quality};
use crate::store::{RecordId, RecordStore};
use tracing::debug;

/// Working copy of an FAQ being edited. The store is only touched on commit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub id: RecordId,
    pub question: String,
    pub answer: String,
}

#[derive(Debug)]
pub struct FaqPanel {
    faqs: RecordStore<FaqItem>,
    search_query: String,
    add_open: bool,
    add_draft: FaqDraft,
    edit_draft: Option<EditDraft>,
}

impl FaqPanel {
    pub fn new() -> Self {
        Self::with_store(RecordStore::seeded(seed_faqs()))
    }

    pub fn with_store(faqs: RecordStore<FaqItem>) -> Self {
        Self {
            faqs,
            search_query: String::new(),
            add_open: false,
            add_draft: FaqDraft::default(),
            edit_draft: None,
        }
    }

    pub fn faqs(&self) -> &[FaqItem] {
        self.faqs.list()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Rows matching the current search, in store order.
    pub fn visible_faqs(&self) -> Vec<&FaqItem> {
        self.faqs.search(&self.search_query)
    }

    // ── Add modal ──

    pub fn open_add_form(&mut self) {
        self.add_open = true;
    }

    pub fn is_add_form_open(&self) -> bool {
        self.add_open
    }

    pub fn add_draft(&self) -> &FaqDraft {
        &self.add_draft
    }

    pub fn add_draft_mut(&mut self) -> &mut FaqDraft {
        &mut self.add_draft
    }

    /// On failure the form stays open with the draft intact.
    pub fn submit_add(&mut self) -> Result<RecordId> {
        let id = self.faqs.add(self.add_draft.clone())?.id;
        self.add_draft = FaqDraft::default();
        self.add_open = false;
        debug!(faq_id = %id, "FAQ added");
        Ok(id)
    }

    /// Hides the form; whatever was typed is still there next time.
    pub fn cancel_add(&mut self) {
        self.add_open = false;
    }

    // ── Edit modal ──

    pub fn begin_edit(&mut self, id: RecordId) -> Result<()> {
        let faq = self.faqs.get(id).ok_or(ConsoleError::NotFound(id))?;
        self.edit_draft = Some(EditDraft {
            id,
            question: faq.question.clone(),
            answer: faq.answer.clone(),
        });
        Ok(())
    }

    pub fn edit_draft(&self) -> Option<&EditDraft> {
        self.edit_draft.as_ref()
    }

    pub fn edit_draft_mut(&mut self) -> Option<&mut EditDraft> {
        self.edit_draft.as_mut()
    }

    /// Writes the draft's question and answer back. Quality and status are
    /// left as they are in the store.
    ///
    /// An invalid draft keeps the form open. A record deleted while the form
    /// was open closes it with `NotFound`.
    pub fn commit_edit(&mut self) -> Result<Option<RecordId>> {
        let Some(draft) = self.edit_draft.clone() else {
            return Ok(None);
        };
        let outcome = self.faqs.update(draft.id, |faq| {
            faq.question = draft.question.clone();
            faq.answer = draft.answer.clone();
        });
        match outcome {
            Ok(_) => {
                self.edit_draft = None;
                debug!(faq_id = %draft.id, "FAQ updated");
                Ok(Some(draft.id))
            }
            Err(err @ ConsoleError::NotFound(_)) => {
                self.edit_draft = None;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit_draft = None;
    }

    // ── Row actions ──

    pub fn remove(&mut self, id: RecordId) -> Result<FaqItem> {
        let removed = self.faqs.remove(id)?;
        debug!(faq_id = %id, "FAQ deleted");
        Ok(removed)
    }

    pub fn toggle_quality(&mut self, id: RecordId) -> Result<Quality> {
        let quality = self.faqs.toggle(id, |faq| &mut faq.quality)?;
        debug!(faq_id = %id, %quality, "FAQ quality toggled");
        Ok(quality)
    }

    pub fn toggle_status(&mut self, id: RecordId) -> Result<FaqStatus> {
        let status = self.faqs.toggle(id, |faq| &mut faq.status)?;
        debug!(faq_id = %id, %status, "FAQ status toggled");
        Ok(status)
    }
}

impl Default for FaqPanel {
    fn default() -> Self {
        Self::new()
    }
}
