//! Capabilities negotiated with the client, fixed at `initialize`.

use jscan_config::JscanConfig;
use tower_lsp::lsp_types::ClientCapabilities;

use crate::settings::{ConfigurationMode, SettingsCache};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCapabilities {
    pub configuration_pull: bool,
    pub workspace_folders: bool,
    pub related_information: bool,
}

impl SessionCapabilities {
    pub fn from_client(capabilities: &ClientCapabilities) -> Self {
        let workspace = capabilities.workspace.as_ref();
        Self {
            configuration_pull: workspace
                .and_then(|workspace| workspace.configuration)
                .unwrap_or(false),
            workspace_folders: workspace
                .and_then(|workspace| workspace.workspace_folders)
                .unwrap_or(false),
            related_information: capabilities
                .text_document
                .as_ref()
                .and_then(|text_document| text_document.publish_diagnostics.as_ref())
                .and_then(|publish| publish.related_information)
                .unwrap_or(false),
        }
    }

    pub fn configuration_mode(&self) -> ConfigurationMode {
        if self.configuration_pull {
            ConfigurationMode::Pull
        } else {
            ConfigurationMode::Push
        }
    }
}

/// State whose shape depends on the negotiated capabilities.
pub struct Session {
    pub capabilities: SessionCapabilities,
    pub settings: SettingsCache,
}

impl Session {
    pub fn new(capabilities: SessionCapabilities, defaults: &JscanConfig) -> Self {
        Self {
            capabilities,
            settings: SettingsCache::new(capabilities.configuration_mode(), defaults.settings()),
        }
    }
}
