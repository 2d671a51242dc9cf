//! External collaborators the console talks to. Only the in-scope stubs
//! live here; real backends implement the same traits elsewhere.

use crate::error::ServiceError;
use crate::panels::settings::ValidatedSettings;
use crate::store::models::{ChatMessage, Document, DocumentStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CANNED_REPLY: &str = "I'm your AI assistant. I'm here to help with your questions.";
pub const SAVE_ACK_MESSAGE: &str = "Settings saved successfully!";

/// Produces the bot's answer to a conversation.
#[async_trait]
pub trait InferenceService: Send + Sync {
    async fn get_reply(&self, conversation: &[ChatMessage]) -> Result<String, ServiceError>;
}

/// Answers every conversation with [`CANNED_REPLY`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedReply;

#[async_trait]
impl InferenceService for CannedReply {
    async fn get_reply(&self, _conversation: &[ChatMessage]) -> Result<String, ServiceError> {
        Ok(CANNED_REPLY.to_string())
    }
}

/// A file picked by the user for upload.
#[derive(Debug, Clone)]
pub struct FileBlob {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DocumentDescriptor {
    pub name: String,
    pub size_bytes: u64,
    pub status: DocumentStatus,
}

#[async_trait]
pub trait UploadService: Send + Sync {
    async fn upload(&self, blob: &FileBlob) -> Result<DocumentDescriptor, ServiceError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UploadUnavailable;

#[async_trait]
impl UploadService for UploadUnavailable {
    async fn upload(&self, _blob: &FileBlob) -> Result<DocumentDescriptor, ServiceError> {
        Err(ServiceError::Unavailable("upload"))
    }
}

#[async_trait]
pub trait DigitizationService: Send + Sync {
    async fn digitize(&self, document: &Document) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DigitizationUnavailable;

#[async_trait]
impl DigitizationService for DigitizationUnavailable {
    async fn digitize(&self, _document: &Document) -> Result<(), ServiceError> {
        Err(ServiceError::Unavailable("digitization"))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SaveAck {
    pub message: String,
}

pub trait SettingsPersistence: Send + Sync {
    fn save(&self, settings: &ValidatedSettings) -> Result<SaveAck, ServiceError>;
}

/// Accepts any validated form without storing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcknowledgeOnly;

impl SettingsPersistence for AcknowledgeOnly {
    fn save(&self, _settings: &ValidatedSettings) -> Result<SaveAck, ServiceError> {
        Ok(SaveAck {
            message: SAVE_ACK_MESSAGE.to_string(),
        })
    }
}

/// Collaborators injected into the shell and handed to each mounted panel.
#[derive(Clone)]
pub struct Services {
    pub inference: Arc<dyn InferenceService>,
    pub upload: Arc<dyn UploadService>,
    pub digitizer: Arc<dyn DigitizationService>,
    pub settings: Arc<dyn SettingsPersistence>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            inference: Arc::new(CannedReply),
            upload: Arc::new(UploadUnavailable),
            digitizer: Arc::new(DigitizationUnavailable),
            settings: Arc::new(AcknowledgeOnly),
        }
    }
}
