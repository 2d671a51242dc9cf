pub mod chat;
pub mod faq;
pub mod knowledge;
pub mod settings;

use crate::services::Services;
use crate::shell::Tab;
use chat::ChatPanel;
use faq::FaqPanel;
use knowledge::KnowledgePanel;
use settings::SettingsPanel;

/// The panel currently mounted in the shell. Each variant owns its state;
/// dropping it tears the panel down.
pub enum Panel {
    Chat(ChatPanel),
    Knowledge(KnowledgePanel),
    Settings(SettingsPanel),
    Faq(FaqPanel),
}

impl Panel {
    /// Builds a fresh panel for `tab` with seed data.
    pub fn mount(tab: Tab, services: &Services) -> Self {
        match tab {
            Tab::Chatbot => Panel::Chat(ChatPanel::new(services.inference.clone())),
            Tab::Knowledge => Panel::Knowledge(KnowledgePanel::new(
                services.upload.clone(),
                services.digitizer.clone(),
            )),
            Tab::Settings => Panel::Settings(SettingsPanel::new(services.settings.clone())),
            Tab::Faq => Panel::Faq(FaqPanel::new()),
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            Panel::Chat(_) => Tab::Chatbot,
            Panel::Knowledge(_) => Tab::Knowledge,
            Panel::Settings(_) => Tab::Settings,
            Panel::Faq(_) => Tab::Faq,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Chat(_) => "Chat Interface",
            Panel::Knowledge(_) => "Knowledge Management",
            Panel::Settings(_) => "Settings",
            Panel::Faq(_) => "FAQ Management",
        }
    }
}
