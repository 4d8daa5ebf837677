//! Bot configuration types.
//!
//! `BotConfig` represents the top-level `config.toml` controlling pairing,
//! the command table, reconnect policy, and the generation backends.
//! Loaded from `~/.wagenie/config.toml`; all fields have sensible defaults
//! so an empty file (or no file at all) yields a working configuration.

use serde::{Deserialize, Serialize};

use crate::pairing::PairingMode;

/// Top-level configuration for the Wagenie bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Phone-number identifier for code-based pairing (E.164 digits,
    /// optional leading `+`). Required when `pairing_mode = "code"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Which pairing flow to run when unregistered.
    #[serde(default)]
    pub pairing_mode: PairingModeSetting,

    /// Command table: message prefix -> handler action.
    #[serde(default = "default_commands")]
    pub commands: Vec<CommandBinding>,

    /// Reconnect policy knobs.
    #[serde(default)]
    pub reconnect: ReconnectConfig,

    /// Text-completion backend settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Image-generation backend settings.
    #[serde(default)]
    pub image: ImageConfig,
}

impl BotConfig {
    /// Resolve the configured pairing mode.
    ///
    /// Returns `None` when code mode is selected but no phone number is
    /// configured; the caller decides how to surface that.
    pub fn pairing(&self) -> Option<PairingMode> {
        match self.pairing_mode {
            PairingModeSetting::Code => self.phone_number.clone().map(|phone_number| {
                PairingMode::Code { phone_number }
            }),
            PairingModeSetting::Qr => Some(PairingMode::Qr),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            phone_number: None,
            pairing_mode: PairingModeSetting::default(),
            commands: default_commands(),
            reconnect: ReconnectConfig::default(),
            completion: CompletionConfig::default(),
            image: ImageConfig::default(),
        }
    }
}

/// Config-file spelling of the pairing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingModeSetting {
    #[default]
    Code,
    Qr,
}

/// One entry of the command table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandBinding {
    /// Literal, case-sensitive prefix (e.g. ".ai").
    pub prefix: String,

    /// Which handler the prefix dispatches to.
    pub action: CommandAction,
}

/// Handler kinds a prefix can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    Completion,
    Image,
}

fn default_commands() -> Vec<CommandBinding> {
    vec![
        CommandBinding {
            prefix: ".ai".to_string(),
            action: CommandAction::Completion,
        },
        CommandBinding {
            prefix: ".img".to_string(),
            action: CommandAction::Image,
        },
    ]
}

/// Bounded-exponential-backoff reconnect policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// First retry delay in milliseconds; doubles per attempt.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Delay cap in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Circuit breaker: consecutive failed attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    10
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Settings for the text-completion backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_completion_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

fn default_completion_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_completion_model(),
            max_tokens: default_max_tokens(),
            base_url: default_openai_base_url(),
        }
    }
}

/// Settings for the image-generation backend. Exactly one image per
/// request, at a fixed size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_image_model")]
    pub model: String,

    #[serde(default = "default_image_size")]
    pub size: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: default_image_model(),
            size: default_image_size(),
            base_url: default_openai_base_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: BotConfig = toml::from_str("").unwrap();
        assert_eq!(config.pairing_mode, PairingModeSetting::Code);
        assert_eq!(config.commands.len(), 2);
        assert_eq!(config.commands[0].prefix, ".ai");
        assert_eq!(config.commands[0].action, CommandAction::Completion);
        assert_eq!(config.commands[1].prefix, ".img");
        assert_eq!(config.commands[1].action, CommandAction::Image);
        assert_eq!(config.reconnect.base_delay_ms, 500);
        assert_eq!(config.reconnect.max_attempts, 10);
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.image.size, "1024x1024");
    }

    #[test]
    fn full_toml_parses() {
        let toml_str = r#"
phone_number = "15551234567"
pairing_mode = "qr"

[[commands]]
prefix = ".ask"
action = "completion"

[reconnect]
base_delay_ms = 250
max_delay_ms = 10000
max_attempts = 5

[completion]
model = "gpt-4o"
max_tokens = 2048

[image]
size = "512x512"
"#;
        let config: BotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.phone_number.as_deref(), Some("15551234567"));
        assert_eq!(config.pairing_mode, PairingModeSetting::Qr);
        assert_eq!(config.commands.len(), 1);
        assert_eq!(config.commands[0].prefix, ".ask");
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.completion.model, "gpt-4o");
        assert_eq!(config.image.size, "512x512");
        // base_url untouched by the override
        assert_eq!(config.image.base_url, "https://api.openai.com");
    }

    #[test]
    fn pairing_resolution() {
        let mut config = BotConfig::default();
        // Code mode without a phone number is unresolvable
        assert!(config.pairing().is_none());

        config.phone_number = Some("15551234567".to_string());
        assert_eq!(
            config.pairing(),
            Some(PairingMode::Code {
                phone_number: "15551234567".to_string()
            })
        );

        config.pairing_mode = PairingModeSetting::Qr;
        assert_eq!(config.pairing(), Some(PairingMode::Qr));
    }
}
