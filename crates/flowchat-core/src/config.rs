use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ChatError, Result};
use crate::suggestions::Suggestion;

/// Environment variable that takes precedence over the stored API key
pub const API_KEY_ENV: &str = "FLOWCHAT_API_KEY";

pub const DEFAULT_PLACEHOLDER: &str = "Type your message...";
pub const DEFAULT_PLACEHOLDER_SENDING: &str = "Thinking...";

/// Where the chat window sits relative to the screen
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    CenterRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

/// Per-element style overrides, e.g. `"fg=white bg=blue bold"`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StyleOverrides {
    pub bot_message: Option<String>,
    pub user_message: Option<String>,
    pub error_message: Option<String>,
    pub send_icon: Option<String>,
    pub send_button: Option<String>,
    pub input: Option<String>,
    pub input_container: Option<String>,
    pub chat_window: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WidgetConfig {
    pub host_url: String,
    pub flow_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub chat_inputs: Map<String, Value>,
    pub chat_input_field: String,
    pub output_key: Option<String>,
    pub tweaks: Option<Map<String, Value>>,

    pub window_title: String,
    pub online: bool,
    pub online_message: String,
    pub offline_message: String,
    pub placeholder: Option<String>,
    pub placeholder_sending: Option<String>,
    pub width: u32,
    pub height: u32,
    pub position: Position,
    pub styles: StyleOverrides,
    pub suggested_questions: Vec<Suggestion>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            host_url: String::new(),
            flow_id: String::new(),
            api_key: None,
            chat_inputs: Map::new(),
            chat_input_field: "input".to_string(),
            output_key: None,
            tweaks: None,
            window_title: "Chat".to_string(),
            online: true,
            online_message: "We'll reply as soon as we can".to_string(),
            offline_message: "We're offline now".to_string(),
            placeholder: None,
            placeholder_sending: None,
            width: 450,
            height: 650,
            position: Position::default(),
            styles: StyleOverrides::default(),
            suggested_questions: Vec::new(),
            request_timeout_secs: None,
        }
    }
}

impl WidgetConfig {
    /// Load from the default location, falling back to defaults when no file exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: WidgetConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Environment first, then whatever the file had
    pub fn apply_env(&mut self) {
        if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.host_url.trim().is_empty() {
            return Err(ChatError::Config("host_url is not set".to_string()));
        }
        if self.flow_id.trim().is_empty() {
            return Err(ChatError::Config("flow_id is not set".to_string()));
        }
        if self.chat_input_field.is_empty() {
            return Err(ChatError::Config("chat_input_field must not be empty".to_string()));
        }
        // ids double as 1-based positions when a suggestion is picked
        for (position, suggestion) in self.suggested_questions.iter().enumerate() {
            if usize::try_from(suggestion.id).ok() != Some(position + 1) {
                return Err(ChatError::Config(format!(
                    "suggested question {:?} has id {}, expected {}",
                    suggestion.text,
                    suggestion.id,
                    position + 1
                )));
            }
        }
        Ok(())
    }

    pub fn placeholder(&self) -> &str {
        self.placeholder.as_deref().unwrap_or(DEFAULT_PLACEHOLDER)
    }

    pub fn placeholder_sending(&self) -> &str {
        self.placeholder_sending
            .as_deref()
            .unwrap_or(DEFAULT_PLACEHOLDER_SENDING)
    }

    pub fn status_message(&self) -> &str {
        if self.online {
            &self.online_message
        } else {
            &self.offline_message
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ChatError::Config("could not determine config directory".to_string()))?;

        Ok(config_dir.join("flowchat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = WidgetConfig::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, WidgetConfig::default());
        assert_eq!(config.width, 450);
        assert_eq!(config.height, 650);
        assert_eq!(config.placeholder(), "Type your message...");
        assert_eq!(config.placeholder_sending(), "Thinking...");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "host_url": "http://localhost:7860",
                "flow_id": "abc",
                "position": "top-left",
                "suggested_questions": [{"questionId": 1, "text": "What is this?"}],
                "styles": {"bot_message": "fg=green"}
            }"#,
        )
        .unwrap();

        let config = WidgetConfig::load_from(&path).unwrap();
        assert_eq!(config.flow_id, "abc");
        assert_eq!(config.position, Position::TopLeft);
        assert_eq!(config.window_title, "Chat");
        assert_eq!(config.chat_input_field, "input");
        assert_eq!(config.suggested_questions[0].id, 1);
        assert_eq!(config.styles.bot_message.as_deref(), Some("fg=green"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = WidgetConfig {
            host_url: "http://h".to_string(),
            flow_id: "f".to_string(),
            ..WidgetConfig::default()
        };
        config.save_to(&path).unwrap();
        assert!(path.exists());
        assert_eq!(WidgetConfig::load_from(&path).unwrap().host_url, "http://h");
    }

    #[test]
    fn test_validate_requires_endpoint() {
        let config = WidgetConfig::default();
        assert!(matches!(config.validate(), Err(ChatError::Config(_))));
    }

    #[test]
    fn test_validate_suggestion_ids_follow_positions() {
        let suggestion = |id: u32, text: &str| Suggestion { id, text: text.to_string() };
        let mut config = WidgetConfig {
            host_url: "http://h".to_string(),
            flow_id: "f".to_string(),
            suggested_questions: vec![suggestion(1, "A"), suggestion(2, "B")],
            ..WidgetConfig::default()
        };
        assert!(config.validate().is_ok());

        config.suggested_questions = vec![suggestion(2, "A"), suggestion(1, "B")];
        assert!(matches!(config.validate(), Err(ChatError::Config(_))));

        config.suggested_questions = vec![suggestion(7, "Only")];
        assert!(matches!(config.validate(), Err(ChatError::Config(_))));

        config.suggested_questions = vec![suggestion(0, "Zero")];
        assert!(matches!(config.validate(), Err(ChatError::Config(_))));
    }

    #[test]
    fn test_status_message_follows_online_flag() {
        let mut config = WidgetConfig::default();
        assert_eq!(config.status_message(), "We'll reply as soon as we can");
        config.online = false;
        assert_eq!(config.status_message(), "We're offline now");
    }
}
