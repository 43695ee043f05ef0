use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaynoteError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Invalid date format: {0}")]
    InvalidDate(String),
    #[error("Request timed out after {0} ms")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, DaynoteError>;

/// Structured error data for the message channel
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorInfo {
    Api { status: u16, body: String },
    Network(String),
    InvalidDate(String),
    Save(String),
}

impl ErrorInfo {
    pub fn from_error(e: &DaynoteError) -> Self {
        match e {
            DaynoteError::Api { status, message } => ErrorInfo::Api {
                status: *status,
                body: message.clone(),
            },
            DaynoteError::InvalidDate(input) => ErrorInfo::InvalidDate(input.clone()),
            _ => ErrorInfo::Network(e.to_string()),
        }
    }
}

/// Ready-to-render error popup data
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPopup {
    pub title: String,
    pub message: String,
    pub hint: String,
}

impl ErrorPopup {
    pub fn from_error_info(info: &ErrorInfo) -> Self {
        match info {
            ErrorInfo::Api { status, body } => Self::from_api(*status, body),
            ErrorInfo::Network(msg) => Self {
                title: "Network Error".into(),
                message: truncate(msg, 80),
                hint: "Check that the notes server is reachable".into(),
            },
            ErrorInfo::InvalidDate(input) => Self {
                title: "400 Bad Request".into(),
                message: format!("Invalid date format: {}", truncate(input, 40)),
                hint: "Dates look like 2024-06-15".into(),
            },
            ErrorInfo::Save(msg) => Self {
                title: "Save Failed".into(),
                message: truncate(msg, 80),
                hint: "Your note may not have been saved".into(),
            },
        }
    }

    fn from_api(status: u16, body: &str) -> Self {
        let extracted_message = extract_json_message(body);

        match status {
            401 => Self {
                title: "Unauthorized".into(),
                message: "Invalid API token".into(),
                hint: "Check server.api_token in your config.toml".into(),
            },
            403 => Self {
                title: "Forbidden".into(),
                message: extracted_message.unwrap_or_else(|| "Access denied".into()),
                hint: "Check your account permissions".into(),
            },
            500 => Self {
                title: "Server Error".into(),
                message: "The notes server returned an error".into(),
                hint: "Try again later".into(),
            },
            _ => Self {
                title: format!("API Error ({})", status),
                message: extracted_message.unwrap_or_else(|| truncate(body, 200)),
                hint: "Try again later".into(),
            },
        }
    }
}

fn extract_json_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(*key)?.as_str().map(String::from))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
