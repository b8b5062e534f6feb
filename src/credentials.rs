//! Credential lookup as an ordered provider chain.
//!
//! Each provider answers "do you have a value?" with an `Option`. The chain
//! asks them in order and takes the first non-empty answer. Provider errors
//! (unreadable key files, non-unicode env values) count as "no value".

use std::fmt;
use std::path::PathBuf;

pub trait CredentialProvider: Send + Sync {
    /// Short description for logs; never the secret itself.
    fn describe(&self) -> String;
    fn get(&self) -> Option<String>;
}

/// A value known up front (from config or from stored coordinates).
pub struct StaticCredential {
    label: &'static str,
    value: Option<String>,
}

impl StaticCredential {
    pub fn new(label: &'static str, value: Option<String>) -> Self {
        Self { label, value }
    }
}

impl CredentialProvider for StaticCredential {
    fn describe(&self) -> String {
        self.label.to_string()
    }

    fn get(&self) -> Option<String> {
        self.value.clone()
    }
}

/// An environment variable.
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredential {
    fn describe(&self) -> String {
        format!("${}", self.var)
    }

    fn get(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

/// First line of a file.
pub struct FileCredential {
    path: PathBuf,
}

impl FileCredential {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for FileCredential {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn get(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        content.lines().next().map(str::to_string)
    }
}

#[derive(Default)]
pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// First non-blank value, trimmed.
    pub fn resolve(&self) -> Option<String> {
        self.providers.iter().find_map(|provider| {
            let value = provider.get()?;
            let value = value.trim();
            if value.is_empty() {
                return None;
            }
            log::debug!("credential resolved from {}", provider.describe());
            Some(value.to_string())
        })
    }
}

impl fmt::Debug for CredentialChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<String> = self.providers.iter().map(|p| p.describe()).collect();
        f.debug_struct("CredentialChain")
            .field("sources", &sources)
            .finish()
    }
}

/// Captioning API key: config value, configured env var, `$API_KEY`, then
/// `<state_dir>/caption.key`.
pub fn caption_key_chain(config: &crate::config::CaptionConfig, state_dir: &std::path::Path) -> CredentialChain {
    CredentialChain::new()
        .with(StaticCredential::new("caption.api_key", config.api_key.clone()))
        .with(EnvCredential::new(config.api_key_env.clone()))
        .with(EnvCredential::new("API_KEY"))
        .with(FileCredential::new(state_dir.join("caption.key")))
}

/// Environment variable `folio login` reads before prompting.
pub const PASSCODE_ENV: &str = "FOLIO_PASSCODE";

/// Studio passcode from `$FOLIO_PASSCODE`. Never a command-line argument.
pub fn passcode_chain() -> CredentialChain {
    CredentialChain::new().with(EnvCredential::new(PASSCODE_ENV))
}

/// Remote host token: stored coordinates, then `$GITHUB_TOKEN`.
pub fn remote_token_chain(stored: Option<String>) -> CredentialChain {
    CredentialChain::new()
        .with(StaticCredential::new("stored remote token", stored))
        .with(EnvCredential::new("GITHUB_TOKEN"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UNSET: &str = "FOLIO_TEST_SURELY_UNSET_VARIABLE";

    #[test]
    fn first_provider_with_value_wins() {
        let chain = CredentialChain::new()
            .with(StaticCredential::new("a", None))
            .with(StaticCredential::new("b", Some("second".into())))
            .with(StaticCredential::new("c", Some("third".into())));
        assert_eq!(chain.resolve().as_deref(), Some("second"));
    }

    #[test]
    fn blank_values_are_skipped() {
        let chain = CredentialChain::new()
            .with(StaticCredential::new("a", Some("   ".into())))
            .with(StaticCredential::new("b", Some(" key \n".into())));
        assert_eq!(chain.resolve().as_deref(), Some("key"));
    }

    #[test]
    fn empty_chain_resolves_nothing() {
        assert_eq!(CredentialChain::new().resolve(), None);
    }

    #[test]
    fn missing_env_var_is_none() {
        assert_eq!(EnvCredential::new(UNSET).get(), None);
    }

    #[test]
    fn file_provider_reads_first_line() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("caption.key");
        std::fs::write(&path, "abc123\nignored\n").unwrap();
        assert_eq!(FileCredential::new(&path).get().as_deref(), Some("abc123"));
        assert_eq!(FileCredential::new(tmp.path().join("none")).get(), None);
    }

    #[test]
    fn caption_chain_falls_through_to_key_file() {
        // The shared fallback variable sits ahead of the key file.
        if std::env::var_os("API_KEY").is_some() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("caption.key"), "from-file\n").unwrap();
        let mut config = crate::config::CaptionConfig::default();
        config.api_key_env = UNSET.into();
        let chain = caption_key_chain(&config, tmp.path());
        assert_eq!(chain.resolve().as_deref(), Some("from-file"));
    }

    #[test]
    fn caption_chain_prefers_inline_key() {
        let tmp = TempDir::new().unwrap();
        let mut config = crate::config::CaptionConfig::default();
        config.api_key = Some("inline".into());
        let chain = caption_key_chain(&config, tmp.path());
        assert_eq!(chain.resolve().as_deref(), Some("inline"));
    }

    #[test]
    fn passcode_comes_from_the_environment_only() {
        let debug = format!("{:?}", passcode_chain());
        assert!(debug.contains("[\"$FOLIO_PASSCODE\"]"), "{debug}");
        if std::env::var_os(PASSCODE_ENV).is_none() {
            assert_eq!(passcode_chain().resolve(), None);
        }
    }

    #[test]
    fn debug_lists_sources_without_secrets() {
        let chain = remote_token_chain(Some("ghp_secret".into()));
        let debug = format!("{chain:?}");
        assert!(debug.contains("$GITHUB_TOKEN"));
        assert!(!debug.contains("ghp_secret"));
    }
}
