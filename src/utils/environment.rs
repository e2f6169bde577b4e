use std::env;
use std::path::{Path, PathBuf};

use super::paths::{EXPORT_FILE_NAME, expand_tilde};
use crate::models::Provider;

pub const DATA_DIR_VAR: &str = "CHAT_HISTORY_DATA_DIR";
pub const CHATGPT_PATH_VAR: &str = "CHAT_HISTORY_CHATGPT_PATH";
pub const CLAUDE_PATH_VAR: &str = "CHAT_HISTORY_CLAUDE_PATH";
pub const FAVORITES_PATH_VAR: &str = "CHAT_HISTORY_FAVORITES_PATH";

pub const DEFAULT_DATA_DIR: &str = "./data";
const FAVORITES_FILE_NAME: &str = "favorites.json";

/// Where the provider exports and the favorites file live.
///
/// Paths may be files or directories; directories are resolved to the
/// `conversations.json` inside them when the export is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub chatgpt_path: Option<PathBuf>,
    pub claude_path: Option<PathBuf>,
    pub favorites_path: PathBuf,
}

impl Settings {
    /// Resolve settings from the `CHAT_HISTORY_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_dir = expand_tilde(&var(DATA_DIR_VAR).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
        Self::new(
            data_dir,
            var(CHATGPT_PATH_VAR).map(|raw| expand_tilde(&raw)),
            var(CLAUDE_PATH_VAR).map(|raw| expand_tilde(&raw)),
            var(FAVORITES_PATH_VAR).map(|raw| expand_tilde(&raw)),
        )
    }

    /// Build settings from explicit values, filling the same defaults as
    /// [`Settings::from_env`].
    pub fn new(
        data_dir: PathBuf,
        chatgpt_path: Option<PathBuf>,
        claude_path: Option<PathBuf>,
        favorites_path: Option<PathBuf>,
    ) -> Self {
        // A bare ChatGPT export dropped into the data directory
        let chatgpt_path = chatgpt_path.or_else(|| {
            let candidate = data_dir.join(EXPORT_FILE_NAME);
            candidate.is_file().then_some(candidate)
        });
        let favorites_path = favorites_path.unwrap_or_else(|| data_dir.join(FAVORITES_FILE_NAME));

        Self { data_dir, chatgpt_path, claude_path, favorites_path }
    }

    pub fn provider_path(&self, provider: Provider) -> Option<&Path> {
        match provider {
            Provider::ChatGpt => self.chatgpt_path.as_deref(),
            Provider::Claude => self.claude_path.as_deref(),
        }
    }

    /// Providers with a configured export path, in [`Provider::ALL`] order.
    pub fn configured_providers(&self) -> Vec<Provider> {
        Provider::ALL.into_iter().filter(|p| self.provider_path(*p).is_some()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert_eq!(settings.data_dir, PathBuf::from("./data"));
        assert_eq!(settings.claude_path, None);
        assert_eq!(settings.favorites_path, PathBuf::from("./data/favorites.json"));
    }

    #[test]
    fn test_explicit_variables_win() {
        let settings = Settings::from_lookup(lookup(&[
            (DATA_DIR_VAR, "/srv/chats"),
            (CHATGPT_PATH_VAR, "/exports/openai"),
            (CLAUDE_PATH_VAR, "/exports/anthropic/conversations.json"),
            (FAVORITES_PATH_VAR, "/srv/favs.json"),
        ]));

        assert_eq!(settings.data_dir, PathBuf::from("/srv/chats"));
        assert_eq!(settings.provider_path(Provider::ChatGpt), Some(Path::new("/exports/openai")));
        assert_eq!(
            settings.provider_path(Provider::Claude),
            Some(Path::new("/exports/anthropic/conversations.json"))
        );
        assert_eq!(settings.favorites_path, PathBuf::from("/srv/favs.json"));
        assert_eq!(settings.configured_providers(), vec![Provider::ChatGpt, Provider::Claude]);
    }

    #[test]
    fn test_blank_variables_are_ignored() {
        let settings = Settings::from_lookup(lookup(&[(CLAUDE_PATH_VAR, "  ")]));
        assert_eq!(settings.claude_path, None);
    }

    #[test]
    fn test_chatgpt_export_in_data_dir_is_picked_up() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("conversations.json"), "[]").unwrap();

        let settings = Settings::new(dir.path().to_path_buf(), None, None, None);
        assert_eq!(settings.chatgpt_path, Some(dir.path().join("conversations.json")));
        assert_eq!(settings.configured_providers(), vec![Provider::ChatGpt]);
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        let original = env::var(CLAUDE_PATH_VAR).ok();

        // SAFETY: Setting environment variables in tests is safe as long as:
        // 1. No other test reads this variable concurrently
        // 2. We restore the original value afterwards
        unsafe {
            env::set_var(CLAUDE_PATH_VAR, "/tmp/claude-export");
        }

        let settings = Settings::from_env();
        assert_eq!(settings.claude_path, Some(PathBuf::from("/tmp/claude-export")));

        unsafe {
            match original {
                Some(value) => env::set_var(CLAUDE_PATH_VAR, value),
                None => env::remove_var(CLAUDE_PATH_VAR),
            }
        }
    }
}
