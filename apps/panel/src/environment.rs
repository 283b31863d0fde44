//! Host environment descriptor, passed in at startup instead of sniffing
//! browser globals at call sites.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where the panel front-end is hosted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEnvironment {
    /// Browser extension side panel: extension storage and tab queries exist.
    #[default]
    Extension,
    /// Plain web page: no extension APIs, the page URL is the tab URL.
    Web,
}

impl FromStr for HostEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extension" => Ok(HostEnvironment::Extension),
            "web" => Ok(HostEnvironment::Web),
            other => Err(format!("unknown host environment '{other}'")),
        }
    }
}

/// Dev override for the backend base URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// Configured URL, else production.
    #[default]
    Auto,
    /// Always the local dev backend.
    Local,
}

impl FromStr for BackendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendMode::Auto),
            "local" => Ok(BackendMode::Local),
            other => Err(format!("unknown backend mode '{other}'")),
        }
    }
}

pub const BACKEND_LOCAL_URL: &str = "http://127.0.0.1:8000";
pub const BACKEND_PROD_URL: &str = "https://airecruitingagent.pythonanywhere.com";

/// Resolves the backend base URL: local override, then configured, then prod.
pub fn resolve_backend_url(mode: BackendMode, configured: Option<&str>) -> String {
    if mode == BackendMode::Local {
        return BACKEND_LOCAL_URL.to_string();
    }
    configured
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(BACKEND_PROD_URL)
        .trim_end_matches('/')
        .to_string()
}

/// The flag set every panel variant is configured by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelFlags {
    pub demo_mode: bool,
    pub authenticated: bool,
    /// Cleared on a 403: signed in, but résumé content is blocked.
    pub authorized: bool,
}

impl Default for PanelFlags {
    fn default() -> Self {
        Self {
            demo_mode: false,
            authenticated: false,
            authorized: true,
        }
    }
}
