use crate::error::{Result, ValidationError};
use crate::panels::chat::ChatPanel;
use crate::panels::faq::FaqPanel;
use crate::panels::knowledge::KnowledgePanel;
use crate::panels::settings::SettingsPanel;
use crate::panels::Panel;
use crate::services::Services;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use tracing::{info, info_span, Span};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tab {
    #[default]
    Chatbot,
    Knowledge,
    Settings,
    Faq,
}

impl Tab {
    /// Sidebar order.
    pub const ALL: [Tab; 4] = [Tab::Chatbot, Tab::Knowledge, Tab::Settings, Tab::Faq];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Chatbot => "Chatbot",
            Tab::Knowledge => "Knowledge Base",
            Tab::Settings => "Settings",
            Tab::Faq => "FAQ Management",
        }
    }
}

/// Holds the one active tab.
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    active: Tab,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    /// Returns whether the active tab changed.
    pub fn set_active(&mut self, tab: Tab) -> bool {
        let changed = self.active != tab;
        self.active = tab;
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub tab: Tab,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub brand: &'static str,
    pub user_name: &'static str,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            brand: "VietinBank",
            user_name: "Admin User",
        }
    }
}

/// Root of the console: navigation, header and the mounted panel.
///
/// Switching to another tab tears the current panel down and mounts a fresh
/// one, so panel state does not survive navigation.
pub struct Shell {
    session_id: Uuid,
    navigation: Navigation,
    header: Header,
    services: Services,
    panel: Panel,
    span: Span,
}

impl Shell {
    pub fn new(services: Services) -> Self {
        let session_id = Uuid::new_v4();
        let span = info_span!("console", session = %session_id);
        let navigation = Navigation::new();
        let panel = Panel::mount(navigation.active(), &services);
        span.in_scope(|| info!(tab = %navigation.active(), "Console session started"));
        Self {
            session_id,
            navigation,
            header: Header::default(),
            services,
            panel,
            span,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn active_tab(&self) -> Tab {
        self.navigation.active()
    }

    pub fn menu(&self) -> Vec<MenuItem> {
        Tab::ALL
            .iter()
            .map(|&tab| MenuItem {
                tab,
                label: tab.label(),
                active: tab == self.active_tab(),
            })
            .collect()
    }

    /// Re-selecting the active tab keeps the mounted panel as it is.
    pub fn navigate(&mut self, tab: Tab) {
        let _entered = self.span.enter();
        let previous = self.navigation.active();
        if !self.navigation.set_active(tab) {
            return;
        }
        // The old panel is dropped here, which cancels its pending work.
        self.panel = Panel::mount(tab, &self.services);
        info!(from = %previous, to = %tab, "Switched panel");
    }

    /// Navigates by tab id, e.g. from a sidebar link.
    pub fn navigate_to(&mut self, id: &str) -> Result<Tab> {
        let tab = Tab::from_str(id).map_err(|_| ValidationError::UnknownOption {
            field: "tab",
            value: id.to_string(),
        })?;
        self.navigate(tab);
        Ok(tab)
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut Panel {
        &mut self.panel
    }

    pub fn chat(&mut self) -> Option<&mut ChatPanel> {
        match &mut self.panel {
            Panel::Chat(chat) => Some(chat),
            _ => None,
        }
    }

    pub fn knowledge(&mut self) -> Option<&mut KnowledgePanel> {
        match &mut self.panel {
            Panel::Knowledge(knowledge) => Some(knowledge),
            _ => None,
        }
    }

    pub fn settings(&mut self) -> Option<&mut SettingsPanel> {
        match &mut self.panel {
            Panel::Settings(settings) => Some(settings),
            _ => None,
        }
    }

    pub fn faq(&mut self) -> Option<&mut FaqPanel> {
        match &mut self.panel {
            Panel::Faq(faq) => Some(faq),
            _ => None,
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(Services::default())
    }
}
