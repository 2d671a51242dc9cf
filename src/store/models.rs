use super::{require_text, Record, RecordId, Searchable, TwoValued};
use crate::error::ValidationError;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const GREETING: &str = "Hello! How can I help you today?";

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

// ── Chat ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: RecordId,
    pub text: String,
    pub sender: Sender,
}

#[derive(Debug, Clone)]
pub struct ChatDraft {
    pub text: String,
    pub sender: Sender,
}

impl Record for ChatMessage {
    type Draft = ChatDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate_draft(draft: &ChatDraft) -> Result<(), ValidationError> {
        match draft.sender {
            Sender::User => require_text("text", &draft.text),
            Sender::Bot => Ok(()),
        }
    }

    fn from_draft(id: RecordId, draft: ChatDraft) -> Self {
        Self {
            id,
            text: draft.text,
            sender: draft.sender,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self.sender {
            Sender::User => require_text("text", &self.text),
            Sender::Bot => Ok(()),
        }
    }
}

pub fn seed_messages() -> Vec<ChatMessage> {
    vec![ChatMessage {
        id: RecordId(1),
        text: GREETING.into(),
        sender: Sender::Bot,
    }]
}

// ── Knowledge bases ──

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KnowledgeBase {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDate,
    pub documents_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBaseDraft {
    pub name: String,
    pub description: String,
}

impl Record for KnowledgeBase {
    type Draft = KnowledgeBaseDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate_draft(draft: &KnowledgeBaseDraft) -> Result<(), ValidationError> {
        require_text("name", &draft.name)
    }

    fn from_draft(id: RecordId, draft: KnowledgeBaseDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            created_at: today(),
            documents_count: 0,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}

pub fn seed_knowledge_bases() -> Vec<KnowledgeBase> {
    vec![
        KnowledgeBase {
            id: RecordId(1),
            name: "Banking Products".into(),
            description: "Information about our banking products and services".into(),
            created_at: date(2023, 10, 15),
            documents_count: 12,
        },
        KnowledgeBase {
            id: RecordId(2),
            name: "Customer Support".into(),
            description: "Common customer support information and procedures".into(),
            created_at: date(2023, 11, 2),
            documents_count: 8,
        },
    ]
}

// ── Documents ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DocumentStatus {
    Uploaded,
    Digitized,
}

impl DocumentStatus {
    /// The only legal move is uploaded -> digitized.
    pub fn digitized(self) -> Result<Self, ValidationError> {
        match self {
            DocumentStatus::Uploaded => Ok(DocumentStatus::Digitized),
            DocumentStatus::Digitized => Err(ValidationError::InvalidTransition {
                field: "status",
                from: self.to_string(),
                to: DocumentStatus::Digitized.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Document {
    pub id: RecordId,
    pub name: String,
    pub knowledge_base_id: RecordId,
    pub upload_date: NaiveDate,
    pub status: DocumentStatus,
    pub size: String,
}

#[derive(Debug, Clone)]
pub struct DocumentDraft {
    pub name: String,
    pub knowledge_base_id: RecordId,
    pub size: String,
}

impl Record for Document {
    type Draft = DocumentDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate_draft(draft: &DocumentDraft) -> Result<(), ValidationError> {
        require_text("name", &draft.name)
    }

    fn from_draft(id: RecordId, draft: DocumentDraft) -> Self {
        Self {
            id,
            name: draft.name,
            knowledge_base_id: draft.knowledge_base_id,
            upload_date: today(),
            status: DocumentStatus::Uploaded,
            size: draft.size,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}

pub fn seed_documents() -> Vec<Document> {
    vec![
        Document {
            id: RecordId(1),
            name: "Savings Account Terms.pdf".into(),
            knowledge_base_id: RecordId(1),
            upload_date: date(2023, 10, 15),
            status: DocumentStatus::Digitized,
            size: "2.4 MB".into(),
        },
        Document {
            id: RecordId(2),
            name: "Credit Card Policy.docx".into(),
            knowledge_base_id: RecordId(1),
            upload_date: date(2023, 10, 16),
            status: DocumentStatus::Uploaded,
            size: "1.8 MB".into(),
        },
        Document {
            id: RecordId(3),
            name: "Customer FAQ.pdf".into(),
            knowledge_base_id: RecordId(2),
            upload_date: date(2023, 11, 2),
            status: DocumentStatus::Digitized,
            size: "3.2 MB".into(),
        },
    ]
}

// ── FAQ ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Quality {
    Good,
    Poor,
}

impl TwoValued for Quality {
    fn flipped(self) -> Self {
        match self {
            Quality::Good => Quality::Poor,
            Quality::Poor => Quality::Good,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FaqStatus {
    Verified,
    Unverified,
}

impl TwoValued for FaqStatus {
    fn flipped(self) -> Self {
        match self {
            FaqStatus::Verified => FaqStatus::Unverified,
            FaqStatus::Unverified => FaqStatus::Verified,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FaqItem {
    pub id: RecordId,
    pub question: String,
    pub answer: String,
    pub quality: Quality,
    pub status: FaqStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaqDraft {
    pub question: String,
    pub answer: String,
}

fn require_faq_text(question: &str, answer: &str) -> Result<(), ValidationError> {
    require_text("question", question)?;
    require_text("answer", answer)
}

impl Record for FaqItem {
    type Draft = FaqDraft;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate_draft(draft: &FaqDraft) -> Result<(), ValidationError> {
        require_faq_text(&draft.question, &draft.answer)
    }

    fn from_draft(id: RecordId, draft: FaqDraft) -> Self {
        Self {
            id,
            question: draft.question,
            answer: draft.answer,
            quality: Quality::Poor,
            status: FaqStatus::Unverified,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_faq_text(&self.question, &self.answer)
    }
}

impl Searchable for FaqItem {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.question.as_str(), self.answer.as_str()]
    }
}

pub fn seed_faqs() -> Vec<FaqItem> {
    vec![
        FaqItem {
            id: RecordId(1),
            question: "How do I open a new savings account?".into(),
            answer: "To open a new savings account, you can visit any of our branches with your ID and proof of address. Alternatively, you can apply online through our website or mobile app.".into(),
            quality: Quality::Good,
            status: FaqStatus::Verified,
        },
        FaqItem {
            id: RecordId(2),
            question: "What are the current interest rates for fixed deposits?".into(),
            answer: "Our current interest rates for fixed deposits range from 3.5% to 6.5% depending on the term length. For the most up-to-date rates, please check our website or contact customer service.".into(),
            quality: Quality::Good,
            status: FaqStatus::Verified,
        },
        FaqItem {
            id: RecordId(3),
            question: "How do I reset my online banking password?".into(),
            answer: "You can reset your online banking password by clicking on the \"Forgot Password\" link on the login page. You will receive a verification code via SMS or email to complete the reset process.".into(),
            quality: Quality::Poor,
            status: FaqStatus::Unverified,
        },
    ]
}
