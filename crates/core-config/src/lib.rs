//! Configuration loading and parsing.
//!
//! Reads `oxline.toml` (or an override path provided by the binary). Every
//! section and field is optional; absent values take the defaults below.
//! Unknown fields are ignored so older binaries tolerate newer files. A file
//! that is missing or fails to parse yields the default configuration and a
//! `config` warning instead of an error.

use anyhow::Result;
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "oxline.toml";
pub const DEFAULT_HISTORY_FILE_NAME: &str = ".oxline_history";

/// Which unterminated quotes keep a line open for continuation on Enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuoteContinuation {
    /// Any unterminated quote continues the line.
    #[default]
    Enabled,
    /// Quotes never continue the line; only a trailing backslash does.
    Disabled,
    /// Only single quotes continue the line.
    #[serde(rename = "ignore-double")]
    IgnoreDoubleQuotes,
    /// Only double quotes continue the line.
    #[serde(rename = "ignore-single")]
    IgnoreSingleQuotes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditingMode {
    #[default]
    Emacs,
    Vi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum CharsetName {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "iso-8859-1", alias = "latin1")]
    Latin1,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PermissionConfig {
    #[serde(default = "PermissionConfig::yes")]
    pub readable: bool,
    #[serde(default = "PermissionConfig::yes")]
    pub readable_owner_only: bool,
    #[serde(default = "PermissionConfig::yes")]
    pub writable: bool,
    #[serde(default = "PermissionConfig::yes")]
    pub writable_owner_only: bool,
    #[serde(default)]
    pub executable: bool,
    #[serde(default = "PermissionConfig::yes")]
    pub executable_owner_only: bool,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            readable: true,
            readable_owner_only: true,
            writable: true,
            writable_owner_only: true,
            executable: false,
            executable_owner_only: true,
        }
    }
}

impl PermissionConfig {
    const fn yes() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "HistoryConfig::default_size")]
    pub size: usize,
    /// History file; `None` resolves to `~/.oxline_history`.
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub permission: PermissionConfig,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            size: Self::default_size(),
            file: None,
            permission: PermissionConfig::default(),
        }
    }
}

impl HistoryConfig {
    const fn default_enabled() -> bool {
        true
    }
    const fn default_size() -> usize {
        500
    }

    /// Configured file, else the default file in the home directory.
    pub fn resolved_file(&self) -> Option<PathBuf> {
        self.file
            .clone()
            .or_else(|| dirs::home_dir().map(|h| h.join(DEFAULT_HISTORY_FILE_NAME)))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditingConfig {
    #[serde(default)]
    pub mode: EditingMode,
    #[serde(default)]
    pub quote_continuation: QuoteContinuation,
    #[serde(default = "EditingConfig::default_prompt")]
    pub prompt: String,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            mode: EditingMode::default(),
            quote_continuation: QuoteContinuation::default(),
            prompt: Self::default_prompt(),
        }
    }
}

impl EditingConfig {
    fn default_prompt() -> String {
        "oxline> ".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TerminalConfig {
    #[serde(default)]
    pub charset: CharsetName,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub editing: EditingConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
    /// Key spec (`"ctrl-t"`, `"command:x"`) to action name.
    #[serde(default)]
    pub bindings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxline").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            debug!(target: "config", path = %path.display(), error = %e, "config_file_unavailable");
            return Ok(Config::default());
        }
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            debug!(target: "config", path = %path.display(), bindings = file.bindings.len(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn load_str(content: &str) -> Config {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), content).unwrap();
        load_from(Some(tmp.path().to_path_buf())).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        assert!(cfg.file.history.enabled);
        assert_eq!(cfg.file.history.size, 500);
        assert_eq!(cfg.file.editing.mode, EditingMode::Emacs);
        assert_eq!(cfg.file.editing.quote_continuation, QuoteContinuation::Enabled);
        assert_eq!(cfg.file.editing.prompt, "oxline> ");
        assert_eq!(cfg.file.terminal.charset, CharsetName::Utf8);
        assert_eq!(cfg.file.history.permission, PermissionConfig::default());
        assert!(cfg.file.bindings.is_empty());
    }

    #[test]
    fn parses_every_section() {
        let cfg = load_str(
            r#"
[history]
enabled = false
size = 42
file = "/tmp/hist"
[history.permission]
readable_owner_only = false
executable = true

[editing]
mode = "vi"
quote_continuation = "ignore-double"
prompt = "$ "

[terminal]
charset = "iso-8859-1"

[bindings]
"ctrl-t" = "change-case-char"
"command:q" = "accept-line"
"#,
        );
        let f = &cfg.file;
        assert!(!f.history.enabled);
        assert_eq!(f.history.size, 42);
        assert_eq!(f.history.resolved_file(), Some(PathBuf::from("/tmp/hist")));
        assert!(!f.history.permission.readable_owner_only);
        assert!(f.history.permission.executable);
        assert!(f.history.permission.writable);
        assert_eq!(f.editing.mode, EditingMode::Vi);
        assert_eq!(f.editing.quote_continuation, QuoteContinuation::IgnoreDoubleQuotes);
        assert_eq!(f.editing.prompt, "$ ");
        assert_eq!(f.terminal.charset, CharsetName::Latin1);
        assert_eq!(
            f.bindings.get("ctrl-t").map(String::as_str),
            Some("change-case-char")
        );
        assert_eq!(f.bindings.len(), 2);
    }

    #[test]
    fn quote_continuation_values() {
        for (text, expected) in [
            ("enabled", QuoteContinuation::Enabled),
            ("disabled", QuoteContinuation::Disabled),
            ("ignore-double", QuoteContinuation::IgnoreDoubleQuotes),
            ("ignore-single", QuoteContinuation::IgnoreSingleQuotes),
        ] {
            let cfg = load_str(&format!("[editing]\nquote_continuation = \"{text}\"\n"));
            assert_eq!(cfg.file.editing.quote_continuation, expected);
        }
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let cfg = load_str("[editing]\nmode = \"emacs\"\nfuture_knob = 3\n[other]\nx = 1\n");
        assert!(cfg.raw.is_some());
        assert_eq!(cfg.file.editing.mode, EditingMode::Emacs);
    }

    #[test]
    fn parse_failure_falls_back_and_warns() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[editing]\nmode = \"nano\"\n").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::WARN)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || {
            load_from(Some(tmp.path().to_path_buf())).unwrap()
        });

        assert!(cfg.raw.is_none());
        assert_eq!(cfg.file.editing.mode, EditingMode::Emacs);
        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_parse_failed_using_defaults"));
    }
}
