//! Configuration loading and parsing.
//!
//! Parses `splice.toml` (or an override path provided by the embedding
//! application) into edit-engine settings:
//!
//! ```toml
//! [ripple]
//! enabled = true      # timeline ripple used by clip updates
//! all_tracks = false  # ripple edits into every unlocked track
//! markers = false     # ripple edits shift markers
//!
//! [history]
//! limit = 200              # 0 keeps every command
//! strict_snapshots = true  # abort undo when the model drifted underneath
//! ```
//!
//! Unknown fields are ignored and every field has a default, so a missing or
//! partial file always yields a usable `Config`. A malformed file falls back
//! to defaults as well; the parse error is logged rather than surfaced because
//! editing must remain possible with a broken config on disk.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Default cap on retained history entries.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RippleConfig {
    #[serde(default = "RippleConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub all_tracks: bool,
    #[serde(default)]
    pub markers: bool,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            all_tracks: false,
            markers: false,
        }
    }
}

impl RippleConfig {
    const fn default_enabled() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_limit")]
    pub limit: usize,
    #[serde(default = "HistoryConfig::default_strict")]
    pub strict_snapshots: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: Self::default_limit(),
            strict_snapshots: Self::default_strict(),
        }
    }
}

impl HistoryConfig {
    const fn default_limit() -> usize {
        DEFAULT_HISTORY_LIMIT
    }
    const fn default_strict() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub ripple: RippleConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub path: Option<PathBuf>,
}

/// Project-local `splice.toml` if present, else the per-user config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("splice.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("splice").join("splice.toml");
    }
    PathBuf::from("splice.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                ripple = file.ripple.enabled,
                ripple_all_tracks = file.ripple.all_tracks,
                ripple_markers = file.ripple.markers,
                history_limit = file.history.limit,
                "config_loaded"
            );
            Ok(Config {
                raw: Some(content),
                file,
                path: Some(path),
            })
        }
        Err(err) => {
            warn!(target: "config", path = %path.display(), error = %err, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn ripple(&self) -> &RippleConfig {
        &self.file.ripple
    }

    pub fn history(&self) -> &HistoryConfig {
        &self.file.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
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
        let cfg = load_from(Some(PathBuf::from("missing-splice-config.toml"))).unwrap();
        assert!(cfg.ripple().enabled);
        assert!(!cfg.ripple().all_tracks);
        assert!(!cfg.ripple().markers);
        assert_eq!(cfg.history().limit, DEFAULT_HISTORY_LIMIT);
        assert!(cfg.history().strict_snapshots);
        assert!(cfg.path.is_none());
    }

    #[test]
    fn parses_ripple_and_history_sections() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[ripple]\nall_tracks = true\nmarkers = true\n[history]\nlimit = 5\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.ripple().enabled);
        assert!(cfg.ripple().all_tracks);
        assert!(cfg.ripple().markers);
        assert_eq!(cfg.history().limit, 5);
        assert!(cfg.history().strict_snapshots);
        assert!(cfg.raw.is_some());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[ripple\nall_tracks = yes").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
    }

    #[test]
    fn parse_failure_logs_under_config_target() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[history]\nlimit = \"lots\"\n").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        with_default(subscriber, || {
            let _ = load_from(Some(tmp.path().to_path_buf())).unwrap();
        });

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_parse_failed_using_defaults"));
    }
}
