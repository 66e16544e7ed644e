//! Configuration loading and parsing.
//!
//! Parses `markpad.toml` (or an override path provided by the binary). Three
//! tables are understood:
//!
//! * `[vim] enabled` toggles modal emulation at startup.
//! * `[input] timeout` / `timeoutlen` govern how long a pending multi-key
//!   sequence (`d` awaiting `dd`) waits before it is flushed.
//! * `[search]` supplies the default search toggles.
//!
//! Unknown fields are ignored so older binaries keep accepting newer files.
//! A file that fails to parse falls back to defaults with a warning.

use anyhow::Result;
use core_search::SearchOptions;
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "markpad.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct VimConfig {
    #[serde(default = "VimConfig::default_enabled")]
    pub enabled: bool,
}

impl Default for VimConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
        }
    }
}

impl VimConfig {
    const fn default_enabled() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_timeout")] // Vim default: enabled
    pub timeout: bool,
    #[serde(default = "InputConfig::default_timeoutlen")] // Vim default 1000ms
    pub timeoutlen: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timeout: Self::default_timeout(),
            timeoutlen: Self::default_timeoutlen(),
        }
    }
}

impl InputConfig {
    const fn default_timeout() -> bool {
        true
    }
    const fn default_timeoutlen() -> u32 {
        1000
    }

    /// Sequence timeout, or `None` when `timeout = false` (pending keys wait indefinitely).
    pub fn sequence_timeout(&self) -> Option<Duration> {
        self.timeout
            .then(|| Duration::from_millis(u64::from(self.timeoutlen)))
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub vim: VimConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub search: SearchOptions,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub source: Option<PathBuf>,
}

impl Config {
    pub fn vim_enabled(&self) -> bool {
        self.file.vim.enabled
    }

    pub fn sequence_timeout(&self) -> Option<Duration> {
        self.file.input.sequence_timeout()
    }

    pub fn search_defaults(&self) -> SearchOptions {
        self.file.search
    }
}

/// Best-effort config path: local working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("markpad").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_absent_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                vim_enabled = file.vim.enabled,
                timeoutlen = file.input.timeoutlen,
                "config_loaded"
            );
            Ok(Config {
                raw: Some(content),
                file,
                source: Some(path),
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

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.vim_enabled());
        assert_eq!(cfg.file.input.timeoutlen, 1000);
        assert_eq!(cfg.search_defaults(), SearchOptions::default());
        assert!(cfg.source.is_none());
    }

    #[test]
    fn parses_all_tables() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[vim]\nenabled = false\n[input]\ntimeout = true\ntimeoutlen = 250\n\
             [search]\ncase_sensitive = true\nwhole_word = true\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(!cfg.vim_enabled());
        assert_eq!(cfg.sequence_timeout(), Some(Duration::from_millis(250)));
        let search = cfg.search_defaults();
        assert!(search.case_sensitive);
        assert!(search.whole_word);
        assert!(!search.use_regex);
        assert_eq!(cfg.source.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn timeout_disabled_yields_no_deadline() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[input]\ntimeout = false\ntimeoutlen = 250\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(!cfg.file.input.timeout);
        assert_eq!(cfg.sequence_timeout(), None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[vim]\nenabled = true\nrelativenumber = true\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.vim_enabled());
        assert!(cfg.raw.is_some());
    }

    #[test]
    fn parse_failure_falls_back_and_warns() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[input]\ntimeoutlen = \"soon\"\n").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::WARN)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || load_from(Some(tmp.path().to_path_buf())).unwrap());

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_parse_failed_using_defaults"));
        assert_eq!(cfg.file.input.timeoutlen, 1000);
        assert!(cfg.raw.is_none());
    }
}
