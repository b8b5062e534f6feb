//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top, so a
//! config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! my-portfolio/
//! ├── config.toml          # Site config (optional)
//! ├── about.md             # About page body (path set by site.about)
//! ├── published.json       # Published snapshot (path set by storage.snapshot)
//! └── .folio/              # Local state: collections, session, caption cache
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! state_dir = ".folio"
//!
//! [site]
//! title = "Portraits Plaza"
//! tagline = "Minimalist focus on character and light."
//! owner = ""
//! splash_image = ""        # Full-bleed image on the showcase landing
//! about = "about.md"
//! email = ""
//! instagram = ""
//! phone = ""
//! location = ""
//!
//! [studio]
//! passcode = "1234"
//! session_minutes = 240
//! publish_uploads = true
//!
//! [storage]
//! gallery_key = "gallery"
//! heroes_key = "heroes"
//! remote_key = "remote"
//! snapshot = "published.json"
//!
//! [caption]
//! enabled = true
//! endpoint = "https://generativelanguage.googleapis.com/v1beta"
//! model = "gemini-2.0-flash"
//! api_key_env = "GEMINI_API_KEY"
//! timeout_secs = 30
//!
//! [colors.light]
//! background = "#fafafa"
//! ...
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file inside the portfolio root.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Portfolio configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FolioConfig {
    /// Directory (relative to the root) holding the local store, the
    /// studio session and the caption cache.
    pub state_dir: String,
    /// Public-facing site identity: title, about, contact details.
    pub site: SiteInfo,
    /// Owner access and upload policy.
    pub studio: StudioConfig,
    /// Store key names and the published snapshot location.
    pub storage: StorageConfig,
    /// Captioning API settings.
    pub caption: CaptionConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            state_dir: ".folio".to_string(),
            site: SiteInfo::default(),
            studio: StudioConfig::default(),
            storage: StorageConfig::default(),
            caption: CaptionConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl FolioConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state_dir.trim().is_empty() {
            return Err(ConfigError::Validation("state_dir must not be empty".into()));
        }
        if self.studio.passcode.is_empty() {
            return Err(ConfigError::Validation(
                "studio.passcode must not be empty".into(),
            ));
        }
        if self.studio.session_minutes == 0 {
            return Err(ConfigError::Validation(
                "studio.session_minutes must be at least 1".into(),
            ));
        }
        let keys = [
            &self.storage.gallery_key,
            &self.storage.heroes_key,
            &self.storage.remote_key,
        ];
        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "storage keys must not be empty".into(),
            ));
        }
        if keys[0] == keys[1] || keys[0] == keys[2] || keys[1] == keys[2] {
            return Err(ConfigError::Validation(
                "storage keys must be distinct".into(),
            ));
        }
        if !self.caption.endpoint.starts_with("http://")
            && !self.caption.endpoint.starts_with("https://")
        {
            return Err(ConfigError::Validation(
                "caption.endpoint must be an http(s) URL".into(),
            ));
        }
        if self.caption.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "caption.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Absolute location of the state directory for a given root.
    pub fn state_path(&self, root: &Path) -> PathBuf {
        root.join(&self.state_dir)
    }

    /// Absolute location of the published snapshot for a given root.
    pub fn snapshot_path(&self, root: &Path) -> PathBuf {
        root.join(&self.storage.snapshot)
    }
}

/// Public-facing site identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
    pub tagline: String,
    pub owner: String,
    /// Full-bleed image on the showcase landing. Empty for none.
    pub splash_image: String,
    /// Markdown file (relative to the root) rendered as the about page.
    pub about: String,
    pub email: String,
    pub instagram: String,
    pub phone: String,
    pub location: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Portraits Plaza".to_string(),
            tagline: "Minimalist focus on character and light.".to_string(),
            owner: String::new(),
            splash_image: String::new(),
            about: "about.md".to_string(),
            email: String::new(),
            instagram: String::new(),
            phone: String::new(),
            location: String::new(),
        }
    }
}

/// Owner access and upload policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Shared owner passcode. A deterrent, not a security boundary.
    pub passcode: String,
    /// How long a studio login lasts.
    pub session_minutes: u32,
    /// Whether freshly uploaded photos start out published.
    pub publish_uploads: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            passcode: "1234".to_string(),
            session_minutes: 240,
            publish_uploads: true,
        }
    }
}

/// Store key names and the snapshot location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub gallery_key: String,
    pub heroes_key: String,
    pub remote_key: String,
    /// Published snapshot path, relative to the root.
    pub snapshot: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            gallery_key: "gallery".to_string(),
            heroes_key: "heroes".to_string(),
            remote_key: "remote".to_string(),
            snapshot: "published.json".to_string(),
        }
    }
}

/// Captioning API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionConfig {
    /// When false, uploads always receive the missing-credentials fallback.
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    /// Inline API key. Prefer the environment variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable consulted for the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub prompt: String,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 30,
            prompt: DEFAULT_CAPTION_PROMPT.to_string(),
        }
    }
}

const DEFAULT_CAPTION_PROMPT: &str = "Analyze this photography piece. Provide a minimal premium title, a single word category (Prefer one of: Portrait, Pre-wed, Kids, Product, Landscape, Street, or Architecture), and a short poetic description.";

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Tabs, captions, secondary labels.
    pub text_muted: String,
    pub border: String,
    /// Active tab underline and hover accents.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fafafa".to_string(),
            text: "#171717".to_string(),
            text_muted: "#a3a3a3".to_string(),
            border: "#f5f5f5".to_string(),
            accent: "#d97706".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#f5f5f5".to_string(),
            text_muted: "#737373".to_string(),
            border: "#262626".to_string(),
            accent: "#f59e0b".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(FolioConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<FolioConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: FolioConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given root.
pub fn load_config(root: &Path) -> Result<FolioConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    let config = resolve_config(base, overlay)?;
    log::debug!("loaded config from {}", root.display());
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Local state: collections, studio session, caption cache.
state_dir = ".folio"

# ---------------------------------------------------------------------------
# Site identity (showcase, about, contact)
# ---------------------------------------------------------------------------
[site]
title = "Portraits Plaza"
tagline = "Minimalist focus on character and light."
owner = ""
# Full-bleed image on the showcase landing. Empty for none.
splash_image = ""
# Markdown file rendered as the about page.
about = "about.md"
email = ""
instagram = ""
phone = ""
location = ""

# ---------------------------------------------------------------------------
# Studio (owner curation)
# ---------------------------------------------------------------------------
[studio]
# Shared owner passcode. This keeps casual visitors out of the studio
# commands; it is not a security boundary. Change it.
passcode = "1234"
# Minutes a login stays valid.
session_minutes = 240
# Whether freshly uploaded photos are published immediately.
publish_uploads = true

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
gallery_key = "gallery"
heroes_key = "heroes"
remote_key = "remote"
# Published snapshot ({photos, homeHeroes}). When present and non-empty,
# the public site is built from it instead of the local store.
snapshot = "published.json"

# ---------------------------------------------------------------------------
# Captioning
# ---------------------------------------------------------------------------
[caption]
enabled = true
endpoint = "https://generativelanguage.googleapis.com/v1beta"
model = "gemini-2.0-flash"
# Inline key. Prefer the environment variable below.
# api_key = ""
api_key_env = "GEMINI_API_KEY"
timeout_secs = 30
prompt = "Analyze this photography piece. Provide a minimal premium title, a single word category (Prefer one of: Portrait, Pre-wed, Kids, Product, Landscape, Street, or Architecture), and a short poetic description."

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fafafa"
text = "#171717"
text_muted = "#a3a3a3"
border = "#f5f5f5"
accent = "#d97706"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#f5f5f5"
text_muted = "#737373"
border = "#262626"
accent = "#f59e0b"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-accent: {light_accent};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-accent: {dark_accent};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_accent = colors.light.accent,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_accent = colors.dark.accent,
    )
}
