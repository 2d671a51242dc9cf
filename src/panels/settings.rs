use crate::error::{Result, ValidationError};
use crate::services::{SaveAck, SettingsPersistence};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tracing::info;

pub const TEMPERATURE_MIN: f32 = 0.0;
pub const TEMPERATURE_MAX: f32 = 1.0;
pub const MAX_TOKENS_MIN: u32 = 256;
pub const MAX_TOKENS_MAX: u32 = 4096;
pub const MAX_TOKENS_STEP: u32 = 256;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// One entry of a model picker.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ModelOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
    EnumIter, IntoStaticStr,
)]
pub enum LlmModel {
    #[default]
    #[serde(rename = "gpt-4")]
    #[strum(serialize = "gpt-4")]
    Gpt4,
    #[serde(rename = "gpt-3.5-turbo")]
    #[strum(serialize = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "claude-2")]
    #[strum(serialize = "claude-2")]
    Claude2,
    #[serde(rename = "llama-2")]
    #[strum(serialize = "llama-2")]
    Llama2,
}

impl LlmModel {
    pub fn option(self) -> ModelOption {
        let (name, description) = match self {
            LlmModel::Gpt4 => ("GPT-4", "Most powerful model for complex tasks"),
            LlmModel::Gpt35Turbo => ("GPT-3.5 Turbo", "Fast and efficient for most tasks"),
            LlmModel::Claude2 => ("Claude 2", "Anthropic's advanced reasoning model"),
            LlmModel::Llama2 => ("Llama 2", "Meta's open source large language model"),
        };
        ModelOption {
            id: self.into(),
            name,
            description,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
    EnumIter, IntoStaticStr,
)]
pub enum EmbeddingModel {
    #[default]
    #[serde(rename = "text-embedding-ada-002")]
    #[strum(serialize = "text-embedding-ada-002")]
    Ada002,
    #[serde(rename = "e5-large-v2")]
    #[strum(serialize = "e5-large-v2")]
    E5LargeV2,
    #[serde(rename = "sentence-transformers")]
    #[strum(serialize = "sentence-transformers")]
    SentenceTransformers,
}

impl EmbeddingModel {
    pub fn option(self) -> ModelOption {
        let (name, description) = match self {
            EmbeddingModel::Ada002 => ("OpenAI Ada 002", "Efficient text embeddings from OpenAI"),
            EmbeddingModel::E5LargeV2 => ("E5 Large v2", "Microsoft's embedding model"),
            EmbeddingModel::SentenceTransformers => {
                ("Sentence Transformers", "Open source embedding model")
            }
        };
        ModelOption {
            id: self.into(),
            name,
            description,
        }
    }
}

pub fn llm_options() -> Vec<ModelOption> {
    LlmModel::iter().map(LlmModel::option).collect()
}

pub fn embedding_options() -> Vec<ModelOption> {
    EmbeddingModel::iter().map(EmbeddingModel::option).collect()
}

/// Secret that is accepted from the form but never shown again.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SettingsForm {
    pub llm_model: LlmModel,
    pub embedding_model: EmbeddingModel,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip)]
    api_key: Option<ApiKey>,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self {
            llm_model: LlmModel::default(),
            embedding_model: EmbeddingModel::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            api_key: None,
        }
    }
}

impl SettingsForm {
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn validate(&self) -> Result<ValidatedSettings, ValidationError> {
        check_temperature(self.temperature)?;
        check_max_tokens(self.max_tokens)?;
        Ok(ValidatedSettings { form: self.clone() })
    }
}

fn check_temperature(value: f32) -> Result<(), ValidationError> {
    // NaN fails the range check too.
    if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: "temperature",
            value: value.to_string(),
            min: TEMPERATURE_MIN.to_string(),
            max: TEMPERATURE_MAX.to_string(),
        });
    }
    Ok(())
}

fn check_max_tokens(value: u32) -> Result<(), ValidationError> {
    if !(MAX_TOKENS_MIN..=MAX_TOKENS_MAX).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: "max_tokens",
            value: value.to_string(),
            min: MAX_TOKENS_MIN.to_string(),
            max: MAX_TOKENS_MAX.to_string(),
        });
    }
    if value % MAX_TOKENS_STEP != 0 {
        return Err(ValidationError::OffStep {
            field: "max_tokens",
            value: value.to_string(),
            step: MAX_TOKENS_STEP.to_string(),
        });
    }
    Ok(())
}

/// A form that passed validation; the only thing persistence accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSettings {
    form: SettingsForm,
}

impl ValidatedSettings {
    pub fn form(&self) -> &SettingsForm {
        &self.form
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.form.api_key.as_ref()
    }
}

pub struct SettingsPanel {
    form: SettingsForm,
    persistence: Arc<dyn SettingsPersistence>,
}

impl SettingsPanel {
    pub fn new(persistence: Arc<dyn SettingsPersistence>) -> Self {
        Self {
            form: SettingsForm::default(),
            persistence,
        }
    }

    pub fn form(&self) -> &SettingsForm {
        &self.form
    }

    pub fn select_llm(&mut self, id: &str) -> Result<()> {
        self.form.llm_model = LlmModel::from_str(id).map_err(|_| ValidationError::UnknownOption {
            field: "llm_model",
            value: id.to_string(),
        })?;
        Ok(())
    }

    pub fn select_embedding(&mut self, id: &str) -> Result<()> {
        self.form.embedding_model =
            EmbeddingModel::from_str(id).map_err(|_| ValidationError::UnknownOption {
                field: "embedding_model",
                value: id.to_string(),
            })?;
        Ok(())
    }

    /// Out-of-range values are refused and the previous value is kept.
    pub fn set_temperature(&mut self, value: f32) -> Result<()> {
        check_temperature(value)?;
        self.form.temperature = value;
        Ok(())
    }

    pub fn set_max_tokens(&mut self, value: u32) -> Result<()> {
        check_max_tokens(value)?;
        self.form.max_tokens = value;
        Ok(())
    }

    /// An empty key clears the stored one.
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.form.api_key = (!key.trim().is_empty()).then_some(ApiKey(key));
    }

    pub fn has_api_key(&self) -> bool {
        self.form.has_api_key()
    }

    /// Replaces the whole form, e.g. with values loaded from a backend.
    pub fn apply_form(&mut self, form: SettingsForm) -> Result<()> {
        form.validate()?;
        let api_key = self.form.api_key.take();
        self.form = SettingsForm {
            api_key: form.api_key.or(api_key),
            ..form
        };
        Ok(())
    }

    pub fn reset_to_defaults(&mut self) {
        self.form = SettingsForm::default();
        info!("Settings reset to defaults");
    }

    pub fn save(&self) -> Result<SaveAck> {
        let validated = self.form.validate()?;
        let ack = self.persistence.save(&validated)?;
        info!(
            llm_model = %validated.form().llm_model,
            embedding_model = %validated.form().embedding_model,
            temperature = validated.form().temperature,
            max_tokens = validated.form().max_tokens,
            "Settings saved"
        );
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConsoleError, ServiceError};
    use crate::services::{AcknowledgeOnly, SAVE_ACK_MESSAGE};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<ValidatedSettings>>);

    impl SettingsPersistence for Recording {
        fn save(&self, settings: &ValidatedSettings) -> Result<SaveAck, ServiceError> {
            self.0.lock().unwrap().push(settings.clone());
            Ok(SaveAck {
                message: "stored".into(),
            })
        }
    }

    fn panel() -> SettingsPanel {
        SettingsPanel::new(Arc::new(AcknowledgeOnly))
    }

    #[test]
    fn test_defaults() {
        let form = panel().form().clone();
        assert_eq!(form.llm_model, LlmModel::Gpt4);
        assert_eq!(form.embedding_model, EmbeddingModel::Ada002);
        assert_eq!(form.temperature, 0.7);
        assert_eq!(form.max_tokens, 2048);
        assert!(!form.has_api_key());
    }

    #[test]
    fn test_option_catalogs() {
        let ids: Vec<&str> = llm_options().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["gpt-4", "gpt-3.5-turbo", "claude-2", "llama-2"]);

        let embeddings = embedding_options();
        assert_eq!(embeddings.len(), 3);
        assert_eq!(embeddings[1].id, "e5-large-v2");
        assert_eq!(embeddings[1].name, "E5 Large v2");
    }

    #[test]
    fn test_select_rejects_unknown_ids() {
        let mut settings = panel();
        settings.select_llm("claude-2").unwrap();
        assert_eq!(settings.form().llm_model, LlmModel::Claude2);

        assert!(matches!(
            settings.select_llm("gpt-5"),
            Err(ConsoleError::Validation(ValidationError::UnknownOption { .. }))
        ));
        assert_eq!(settings.form().llm_model, LlmModel::Claude2);

        settings.select_embedding("sentence-transformers").unwrap();
        assert!(settings.select_embedding("bert").is_err());
        assert_eq!(
            settings.form().embedding_model,
            EmbeddingModel::SentenceTransformers
        );
    }

    #[test]
    fn test_temperature_bounds() {
        let mut settings = panel();
        assert!(settings.set_temperature(1.5).is_err());
        assert!(settings.set_temperature(-0.1).is_err());
        assert!(settings.set_temperature(f32::NAN).is_err());
        assert_eq!(settings.form().temperature, DEFAULT_TEMPERATURE);

        settings.set_temperature(0.0).unwrap();
        settings.set_temperature(1.0).unwrap();
        assert_eq!(settings.form().temperature, 1.0);
    }

    #[test]
    fn test_max_tokens_bounds_and_step() {
        let mut settings = panel();
        assert!(matches!(
            settings.set_max_tokens(5000),
            Err(ConsoleError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(matches!(
            settings.set_max_tokens(300),
            Err(ConsoleError::Validation(ValidationError::OffStep { .. }))
        ));
        assert!(settings.set_max_tokens(0).is_err());
        assert_eq!(settings.form().max_tokens, DEFAULT_MAX_TOKENS);

        settings.set_max_tokens(256).unwrap();
        settings.set_max_tokens(4096).unwrap();
        assert_eq!(settings.form().max_tokens, 4096);
    }

    #[test]
    fn test_save_acknowledges() {
        let ack = panel().save().unwrap();
        assert_eq!(ack.message, SAVE_ACK_MESSAGE);
    }

    #[test]
    fn test_save_refuses_out_of_range_form() {
        let recording = Arc::new(Recording::default());
        let mut settings = SettingsPanel::new(recording.clone());
        settings.form.temperature = 3.0;

        assert!(settings.save().is_err());
        assert!(recording.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_api_key_is_write_only() {
        let recording = Arc::new(Recording::default());
        let mut settings = SettingsPanel::new(recording.clone());
        settings.set_api_key("sk-test-1234567890");
        assert!(settings.has_api_key());

        let debug = format!("{:?}", settings.form());
        assert!(!debug.contains("sk-test"));
        let json = serde_json::to_string(settings.form()).unwrap();
        assert!(!json.contains("sk-test"));
        assert!(!json.contains("api_key"));

        settings.save().unwrap();
        let saved = recording.0.lock().unwrap();
        assert_eq!(
            saved[0].api_key().map(ApiKey::expose_secret),
            Some("sk-test-1234567890")
        );
    }

    #[test]
    fn test_blank_api_key_clears() {
        let mut settings = panel();
        settings.set_api_key("secret");
        settings.set_api_key("   ");
        assert!(!settings.has_api_key());
    }

    #[test]
    fn test_apply_form_validates_and_keeps_key() {
        let mut settings = panel();
        settings.set_api_key("secret");

        let bad: SettingsForm = serde_json::from_str(
            r#"{"llm_model":"llama-2","embedding_model":"e5-large-v2","temperature":2.0,"max_tokens":1024}"#,
        )
        .unwrap();
        assert!(settings.apply_form(bad).is_err());
        assert_eq!(settings.form().llm_model, LlmModel::Gpt4);

        let good: SettingsForm = serde_json::from_str(
            r#"{"llm_model":"llama-2","embedding_model":"e5-large-v2","temperature":0.2,"max_tokens":1024}"#,
        )
        .unwrap();
        settings.apply_form(good).unwrap();
        assert_eq!(settings.form().llm_model, LlmModel::Llama2);
        assert_eq!(settings.form().max_tokens, 1024);
        assert!(settings.has_api_key());
    }

    #[test]
    fn test_unknown_model_id_fails_to_deserialize() {
        let parsed: std::result::Result<SettingsForm, _> = serde_json::from_str(
            r#"{"llm_model":"gpt-5","embedding_model":"e5-large-v2","temperature":0.2,"max_tokens":1024}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_reset_to_defaults() {
        let mut settings = panel();
        settings.select_llm("llama-2").unwrap();
        settings.set_max_tokens(512).unwrap();
        settings.set_api_key("secret");

        settings.reset_to_defaults();
        assert_eq!(settings.form(), &SettingsForm::default());
    }
}
