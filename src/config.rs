//! Shortcut records and the file-backed store that owns them.
//!
//! The store never surfaces an error: a missing or corrupt file reads as the
//! built-in defaults, and failed writes come back as `false`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{MmduckError, MmduckResult};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "MMDUCK_CONFIG";

/// How a shortcut's `command` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutType {
    /// Application name or bundle path
    #[default]
    Application,
    /// URL handed to the default handler
    Url,
    /// Literal script text run in a terminal
    Script,
    /// Anything else: run as a background shell command
    #[serde(other)]
    Other,
}

impl std::fmt::Display for ShortcutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ShortcutType::Application => "application",
            ShortcutType::Url => "url",
            ShortcutType::Script => "script",
            ShortcutType::Other => "other",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ShortcutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "application" | "app" => Ok(ShortcutType::Application),
            "url" => Ok(ShortcutType::Url),
            "script" => Ok(ShortcutType::Script),
            "other" | "shell" => Ok(ShortcutType::Other),
            _ => Err(format!("Unknown shortcut type: {}", s)),
        }
    }
}

/// A user-defined mapping from a display identity to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(rename = "type", default)]
    pub kind: ShortcutType,
    #[serde(default)]
    pub command: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_title() -> String {
    "New Shortcut".to_string()
}

fn default_icon() -> String {
    "default".to_string()
}

fn default_enabled() -> bool {
    true
}

impl Shortcut {
    fn new(id: &str, title: &str, icon: &str, kind: ShortcutType, command: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            icon: icon.to_string(),
            kind,
            command: command.to_string(),
            enabled: true,
        }
    }

    /// Shallow-merge `patch` into this record.
    pub fn apply(&mut self, patch: ShortcutPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(command) = patch.command {
            self.command = command;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
    }
}

/// Fields supplied when adding a shortcut. Anything left out is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    /// An empty `type` means the default, not [`ShortcutType::Other`]
    #[serde(rename = "type", deserialize_with = "draft_kind")]
    pub kind: Option<ShortcutType>,
    pub command: Option<String>,
    pub enabled: Option<bool>,
}

fn draft_kind<'de, D>(deserializer: D) -> Result<Option<ShortcutType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::IntoDeserializer;

    match Option::<String>::deserialize(deserializer)? {
        Some(kind) if !kind.is_empty() => {
            ShortcutType::deserialize(kind.into_deserializer()).map(Some)
        }
        _ => Ok(None),
    }
}

/// Empty strings count as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Fields to overwrite on an existing shortcut.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutPatch {
    pub id: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ShortcutType>,
    pub command: Option<String>,
    pub enabled: Option<bool>,
}

/// The persisted aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub shortcuts: Vec<Shortcut>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shortcuts: default_shortcuts(),
        }
    }
}

impl Config {
    /// Index of the first shortcut with this id.
    fn position(&self, id: &str) -> Option<usize> {
        self.shortcuts.iter().position(|s| s.id == id)
    }

    fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }
}

/// The eight seeded shortcuts.
pub fn default_shortcuts() -> Vec<Shortcut> {
    use ShortcutType::{Application, Script};

    vec![
        Shortcut::new("home", "Finder", "🏠", Application, "Finder"),
        Shortcut::new("terminal", "Terminal", "💻", Application, "Terminal"),
        Shortcut::new("browser", "Chrome", "🌐", Application, "Google Chrome"),
        Shortcut::new("code", "VS Code", "⚙️", Application, "Visual Studio Code"),
        Shortcut::new("activity", "Activity Monitor", "📊", Application, "Activity Monitor"),
        Shortcut::new("email", "Mail", "✉️", Application, "Mail"),
        Shortcut::new(
            "screenshot",
            "Screenshot",
            "📸",
            Script,
            "screencapture -i ~/Desktop/screenshot-$(date +%Y%m%d-%H%M%S).png",
        ),
        Shortcut::new("open-downloads", "Downloads", "⬇️", Script, "open ~/Downloads"),
    ]
}

/// Derive an application name from a bundle path, e.g.
/// `/Applications/Visual Studio Code.app` becomes `Visual Studio Code`.
pub fn application_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.strip_suffix(".app").unwrap_or(file_name);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// File-backed owner of the shortcut list.
///
/// Every call re-reads the file, so two stores on the same path see each
/// other's writes (last writer wins).
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Create a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the well-known location.
    pub fn open_default() -> Self {
        Self::new(Self::config_path())
    }

    /// The well-known config file path, honoring `MMDUCK_CONFIG`.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return PathBuf::from(shellexpand::tilde(&path).into_owned());
            }
        }

        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("mmduck")
            .join("config.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, or the defaults if the file is missing or corrupt.
    pub fn load_config(&self) -> Config {
        match self.read() {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                tracing::error!(path = %self.path.display(), "Failed to read config: {}", e);
                Config::default()
            }
        }
    }

    fn read(&self) -> MmduckResult<Option<Config>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|source| MmduckError::ConfigIo {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Write the config as pretty JSON. Returns whether the write succeeded.
    pub fn save_config(&self, config: &Config) -> bool {
        match self.write(config) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(path = %self.path.display(), "Failed to save config: {}", e);
                false
            }
        }
    }

    fn write(&self, config: &Config) -> MmduckResult<()> {
        let io_err = |source| MmduckError::ConfigIo {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content).map_err(io_err)
    }

    /// Enabled shortcuts, in order.
    pub fn get_shortcuts(&self) -> Vec<Shortcut> {
        self.load_config()
            .shortcuts
            .into_iter()
            .filter(|s| s.enabled)
            .collect()
    }

    /// Every shortcut, in order.
    pub fn get_all_shortcuts(&self) -> Vec<Shortcut> {
        self.load_config().shortcuts
    }

    pub fn get_shortcut(&self, id: &str) -> Option<Shortcut> {
        self.load_config()
            .shortcuts
            .into_iter()
            .find(|s| s.id == id)
    }

    /// Append a shortcut built from `draft` over the defaults.
    ///
    /// Fails if an explicit id is already taken.
    pub fn add_shortcut(&self, draft: ShortcutDraft) -> bool {
        let mut config = self.load_config();

        let id = match non_empty(draft.id) {
            Some(id) if config.contains(&id) => {
                tracing::warn!(id = %id, "Refusing to add shortcut with duplicate id");
                return false;
            }
            Some(id) => id,
            None => generate_id(&config),
        };

        config.shortcuts.push(Shortcut {
            id,
            title: non_empty(draft.title).unwrap_or_else(default_title),
            icon: non_empty(draft.icon).unwrap_or_else(default_icon),
            kind: draft.kind.unwrap_or_default(),
            command: draft.command.unwrap_or_default(),
            enabled: draft.enabled.unwrap_or(true),
        });
        self.save_config(&config)
    }

    /// Merge `updates` into the shortcut with this id.
    pub fn update_shortcut(&self, id: &str, updates: ShortcutPatch) -> bool {
        let mut config = self.load_config();
        let Some(index) = config.position(id) else {
            return false;
        };

        if let Some(new_id) = &updates.id {
            if new_id != id && config.contains(new_id) {
                tracing::warn!(id, new_id = %new_id, "Refusing to rename shortcut onto an existing id");
                return false;
            }
        }

        config.shortcuts[index].apply(updates);
        self.save_config(&config)
    }

    pub fn delete_shortcut(&self, id: &str) -> bool {
        let mut config = self.load_config();
        let Some(index) = config.position(id) else {
            return false;
        };

        config.shortcuts.remove(index);
        self.save_config(&config)
    }

    /// Flip the `enabled` flag.
    pub fn toggle_shortcut(&self, id: &str) -> bool {
        let mut config = self.load_config();
        let Some(index) = config.position(id) else {
            return false;
        };

        let shortcut = &mut config.shortcuts[index];
        shortcut.enabled = !shortcut.enabled;
        self.save_config(&config)
    }

    /// Replace everything with the seeded defaults.
    pub fn reset_to_default(&self) -> bool {
        self.save_config(&Config::default())
    }
}

/// Milliseconds since the epoch, bumped until it doesn't collide.
fn generate_id(config: &Config) -> String {
    let mut millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    while config.contains(&millis.to_string()) {
        millis += 1;
    }
    millis.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, ConfigStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("config.json"));
        (temp_dir, store)
    }

    fn draft(title: &str, command: &str) -> ShortcutDraft {
        ShortcutDraft {
            title: Some(title.to_string()),
            command: Some(command.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let (_dir, store) = temp_store();
        let config = store.load_config();
        assert_eq!(config, Config::default());
        assert!(!store.path().exists(), "Loading should not create the file");
    }

    #[test]
    fn test_corrupt_file_loads_defaults() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load_config().shortcuts.len(), 8);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (_dir, store) = temp_store();
        let mut config = Config::default();
        config.shortcuts[1].enabled = false;
        config.shortcuts.push(Shortcut {
            id: "docs".to_string(),
            title: "Docs".to_string(),
            icon: "📚".to_string(),
            kind: ShortcutType::Url,
            command: "https://docs.rs".to_string(),
            enabled: true,
        });

        assert!(store.save_config(&config));
        assert_eq!(store.load_config(), config);
    }

    #[test]
    fn test_saved_file_uses_type_key() {
        let (_dir, store) = temp_store();
        assert!(store.reset_to_default());

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["shortcuts"][0]["type"], "application");
        assert_eq!(raw["shortcuts"][6]["type"], "script");
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("nested/dir/config.json"));
        assert!(store.save_config(&Config::default()));
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_failure_returns_false() {
        let temp_dir = TempDir::new().unwrap();
        // The path is a directory, so writing a file there fails.
        let store = ConfigStore::new(temp_dir.path());
        assert!(!store.save_config(&Config::default()));
    }

    #[test]
    fn test_lenient_record_parsing() {
        let (_dir, store) = temp_store();
        fs::write(
            store.path(),
            r#"{"shortcuts":[{"id":"a","title":"A","type":"applescript"},{"id":"b","title":"B"}]}"#,
        )
        .unwrap();

        let all = store.get_all_shortcuts();
        assert_eq!(all[0].kind, ShortcutType::Other);
        assert_eq!(all[1].kind, ShortcutType::Application);
        assert_eq!(all[1].icon, "default");
        assert!(all[1].enabled);
        assert_eq!(all[1].command, "");
    }

    #[test]
    fn test_incomplete_record_keeps_the_file() {
        let (_dir, store) = temp_store();
        fs::write(
            store.path(),
            r#"{"shortcuts":[{"id":"mine","title":"Mine","command":"x"},{"id":"notitle","command":"y"}]}"#,
        )
        .unwrap();

        let all = store.get_all_shortcuts();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].title, "New Shortcut");

        assert!(store.toggle_shortcut("mine"));
        let ids: Vec<String> = store.get_all_shortcuts().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["mine", "notitle"]);
        assert!(!store.get_shortcut("mine").unwrap().enabled);
    }

    #[test]
    fn test_enabled_subset_preserves_order() {
        let (_dir, store) = temp_store();
        assert!(store.reset_to_default());
        assert!(store.toggle_shortcut("browser"));
        assert!(store.toggle_shortcut("email"));

        let expected: Vec<Shortcut> = store
            .get_all_shortcuts()
            .into_iter()
            .filter(|s| s.enabled)
            .collect();
        let enabled = store.get_shortcuts();

        assert_eq!(enabled, expected);
        assert_eq!(enabled.len(), 6);
        assert!(enabled.iter().all(|s| s.id != "browser" && s.id != "email"));
    }

    #[test]
    fn test_add_applies_defaults() {
        let (_dir, store) = temp_store();
        assert!(store.add_shortcut(draft("X", "Y")));

        let added = store.get_all_shortcuts().pop().unwrap();
        let fetched = store.get_shortcut(&added.id).unwrap();
        assert_eq!(fetched.title, "X");
        assert_eq!(fetched.command, "Y");
        assert_eq!(fetched.icon, "default");
        assert_eq!(fetched.kind, ShortcutType::Application);
        assert!(fetched.enabled);
        assert!(fetched.id.parse::<u128>().is_ok(), "Generated id should be a timestamp");
    }

    #[test]
    fn test_add_treats_empty_fields_as_absent() {
        let (_dir, store) = temp_store();
        let draft: ShortcutDraft = serde_json::from_str(
            r#"{"id":"","title":"","icon":"","type":"","command":"Mail"}"#,
        )
        .unwrap();
        assert_eq!(draft.kind, None);

        assert!(store.add_shortcut(draft.clone()));
        assert!(store.add_shortcut(draft));

        let all = store.get_all_shortcuts();
        let (first, second) = (&all[8], &all[9]);
        assert!(!first.id.is_empty());
        assert_ne!(first.id, second.id);
        assert_eq!(first.title, "New Shortcut");
        assert_eq!(first.icon, "default");
        assert_eq!(first.kind, ShortcutType::Application);
        assert_eq!(first.command, "Mail");
    }

    #[test]
    fn test_draft_type_parsing() {
        let parse = |json: &str| serde_json::from_str::<ShortcutDraft>(json).unwrap().kind;
        assert_eq!(parse(r#"{}"#), None);
        assert_eq!(parse(r#"{"type":null}"#), None);
        assert_eq!(parse(r#"{"type":"url"}"#), Some(ShortcutType::Url));
        assert_eq!(parse(r#"{"type":"applescript"}"#), Some(ShortcutType::Other));
    }

    #[test]
    fn test_add_appends_after_defaults() {
        let (_dir, store) = temp_store();
        assert!(store.add_shortcut(ShortcutDraft {
            id: Some("zed".to_string()),
            ..draft("Zed", "Zed")
        }));

        let all = store.get_all_shortcuts();
        assert_eq!(all.len(), 9);
        assert_eq!(all[0].id, "home");
        assert_eq!(all[8].id, "zed");
        assert_eq!(all[8].title, "Zed");
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let (_dir, store) = temp_store();
        assert!(store.reset_to_default());
        let before = fs::read(store.path()).unwrap();

        assert!(!store.add_shortcut(ShortcutDraft {
            id: Some("terminal".to_string()),
            ..Default::default()
        }));
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let (_dir, store) = temp_store();
        for i in 0..5 {
            assert!(store.add_shortcut(draft(&format!("s{}", i), "true")));
        }

        let mut ids: Vec<String> = store.get_all_shortcuts().into_iter().map(|s| s.id).collect();
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_update_merges_fields() {
        let (_dir, store) = temp_store();
        assert!(store.update_shortcut(
            "browser",
            ShortcutPatch {
                title: Some("Firefox".to_string()),
                command: Some("Firefox".to_string()),
                ..Default::default()
            }
        ));

        let browser = store.get_shortcut("browser").unwrap();
        assert_eq!(browser.title, "Firefox");
        assert_eq!(browser.command, "Firefox");
        assert_eq!(browser.icon, "🌐");
        assert_eq!(browser.kind, ShortcutType::Application);
        assert_eq!(store.get_all_shortcuts()[2].id, "browser");
    }

    #[test]
    fn test_update_unknown_id_returns_false() {
        let (_dir, store) = temp_store();
        assert!(!store.update_shortcut("missing", ShortcutPatch::default()));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_update_rejects_rename_onto_existing_id() {
        let (_dir, store) = temp_store();
        let patch = ShortcutPatch {
            id: Some("terminal".to_string()),
            ..Default::default()
        };
        assert!(!store.update_shortcut("home", patch));
        assert!(store.get_shortcut("home").is_some());
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let (_dir, store) = temp_store();
        let original = store.get_shortcut("code").unwrap().enabled;

        assert!(store.toggle_shortcut("code"));
        assert_eq!(store.get_shortcut("code").unwrap().enabled, !original);
        assert!(store.toggle_shortcut("code"));
        assert_eq!(store.get_shortcut("code").unwrap().enabled, original);
    }

    #[test]
    fn test_toggle_unknown_id_returns_false() {
        let (_dir, store) = temp_store();
        assert!(!store.toggle_shortcut("missing"));
    }

    #[test]
    fn test_delete_removes_shortcut() {
        let (_dir, store) = temp_store();
        assert!(store.delete_shortcut("email"));
        assert!(store.get_shortcut("email").is_none());
        assert_eq!(store.get_all_shortcuts().len(), 7);
    }

    #[test]
    fn test_delete_unknown_id_leaves_file_unchanged() {
        let (_dir, store) = temp_store();
        assert!(store.add_shortcut(draft("X", "Y")));
        let before = fs::read(store.path()).unwrap();

        assert!(!store.delete_shortcut("missing"));
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn test_reset_restores_seed() {
        let (_dir, store) = temp_store();
        assert!(store.delete_shortcut("home"));
        assert!(store.add_shortcut(draft("X", "Y")));
        assert!(store.toggle_shortcut("email"));
        assert!(!store.get_shortcut("email").unwrap().enabled);

        assert!(store.reset_to_default());
        let all = store.get_all_shortcuts();
        assert_eq!(all, default_shortcuts());

        let apps = all.iter().filter(|s| s.kind == ShortcutType::Application).count();
        let scripts = all.iter().filter(|s| s.kind == ShortcutType::Script).count();
        assert_eq!((apps, scripts), (6, 2));
    }

    #[test]
    fn test_application_name_strips_bundle_suffix() {
        assert_eq!(
            application_name(Path::new("/Applications/Visual Studio Code.app")),
            Some("Visual Studio Code".to_string())
        );
        assert_eq!(
            application_name(Path::new("/usr/local/bin/alacritty")),
            Some("alacritty".to_string())
        );
        assert_eq!(application_name(Path::new("/")), None);
    }

    #[test]
    fn test_shortcut_type_parsing() {
        assert_eq!("app".parse::<ShortcutType>(), Ok(ShortcutType::Application));
        assert_eq!("url".parse::<ShortcutType>(), Ok(ShortcutType::Url));
        assert_eq!("shell".parse::<ShortcutType>(), Ok(ShortcutType::Other));
        assert!("folder".parse::<ShortcutType>().is_err());
        assert_eq!(ShortcutType::Script.to_string(), "script");
    }
}
