use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{DaynoteError, Result};
use daynote::suggest::SuggestOptions;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub switcher: SwitcherConfig,
    #[serde(default)]
    pub keybindings: HashMap<String, String>,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_token: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EditorConfig {
    #[serde(default = "default_trigger")]
    pub trigger: char,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            trigger: default_trigger(),
            debounce_ms: default_debounce_ms(),
            cache_capacity: default_cache_capacity(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl EditorConfig {
    pub fn suggest_options(&self) -> SuggestOptions {
        SuggestOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            timeout: Duration::from_millis(self.request_timeout_ms),
            cache_capacity: self.cache_capacity,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SwitcherConfig {
    #[serde(default = "default_hotkey")]
    pub hotkey: String,
}

impl Default for SwitcherConfig {
    fn default() -> Self {
        Self {
            hotkey: default_hotkey(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_trigger() -> char {
    '@'
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_cache_capacity() -> usize {
    128
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_hotkey() -> String {
    "Ctrl+j".into()
}

fn default_log_level() -> String {
    "info".into()
}

impl AppConfig {
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::defaults()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("DAYNOTE_").split("__"))
            .extract()
            .map_err(|e| DaynoteError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.is_empty() {
            return Err(DaynoteError::Config("server.base_url is required".into()));
        }
        if !self.server.base_url.starts_with("http://")
            && !self.server.base_url.starts_with("https://")
        {
            return Err(DaynoteError::Config(format!(
                "server.base_url must start with http:// or https://, got '{}'",
                self.server.base_url
            )));
        }
        if self.editor.trigger.is_whitespace() {
            return Err(DaynoteError::Config(
                "editor.trigger must not be whitespace".into(),
            ));
        }
        if self.editor.request_timeout_ms == 0 {
            return Err(DaynoteError::Config(
                "editor.request_timeout_ms must be greater than zero".into(),
            ));
        }
        crate::keys::parser::parse_key(&self.switcher.hotkey)?;
        crate::keys::KeybindingMap::new(&self.keybindings)?;
        Ok(())
    }

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(|xdg| PathBuf::from(xdg).join("daynote"))
            .or_else(|| {
                directories::BaseDirs::new()
                    .map(|dirs| dirs.home_dir().join(".config").join("daynote"))
            })
    }

    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = r#"[server]
base_url = "http://localhost:8080"
api_token = ""  # or set DAYNOTE_SERVER__API_TOKEN

[editor]
trigger = "@"
debounce_ms = 300
cache_capacity = 128
request_timeout_ms = 5000

[switcher]
hotkey = "Ctrl+j"

[keybindings]
# go_today = "Ctrl+t"

[log]
level = "info"  # RUST_LOG overrides this
"#;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn defaults() -> Self {
        Self {
            server: ServerConfig {
                base_url: String::new(),
                api_token: String::new(),
            },
            editor: EditorConfig::default(),
            switcher: SwitcherConfig::default(),
            keybindings: HashMap::new(),
            log: LogConfig::default(),
        }
    }
}
