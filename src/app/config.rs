use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::diagram::EmitOptions;
use crate::error::ConfigError;

/// Noteの最大文字数のデフォルト値
pub const DEFAULT_NOTE_MAX: usize = 160;

/// Noteの最大文字数を上書きする環境変数
pub const NOTE_MAX_ENV: &str = "LOG2M_NOTE_MAX";

/// アプリケーション設定
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Noteの最大文字数（0で無制限）
    #[serde(default = "default_note_max")]
    pub note_max: usize,
    /// ログレベル
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// ルール表の区切り文字
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_note_max() -> usize {
    DEFAULT_NOTE_MAX
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_delimiter() -> char {
    ','
}

impl Default for Config {
    fn default() -> Self {
        Self {
            note_max: default_note_max(),
            log_level: default_log_level(),
            delimiter: default_delimiter(),
        }
    }
}

impl Config {
    /// 設定ファイルから読み込み（存在しない場合はデフォルト）
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// 指定パスの設定ファイルを読み込み
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;
        Ok(config)
    }

    /// 設定ファイルパスを取得
    pub fn config_path() -> Result<PathBuf> {
        // ~/.config/log2mermaid/config.toml を使用
        let base_dirs = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))?;
        Ok(base_dirs.home_dir().join(".config/log2mermaid/config.toml"))
    }

    /// 区切り文字をバイトに変換（ASCII 1文字のみ）
    pub fn delimiter_byte(&self) -> std::result::Result<u8, ConfigError> {
        delimiter_byte(self.delimiter)
    }

    /// Emitterに渡すオプションを組み立てる
    ///
    /// 環境変数はline-echoモードの時だけ参照する
    pub fn emit_options(&self, echo_lines: bool) -> EmitOptions {
        let note_max = if echo_lines {
            let raw = std::env::var(NOTE_MAX_ENV).ok();
            resolve_note_max(raw.as_deref(), self.note_max)
        } else {
            self.note_max
        };

        EmitOptions {
            echo_lines,
            note_max,
        }
    }
}

/// 区切り文字の検証
pub fn delimiter_byte(delimiter: char) -> std::result::Result<u8, ConfigError> {
    u8::try_from(delimiter)
        .ok()
        .filter(|b| b.is_ascii())
        .ok_or(ConfigError::InvalidDelimiter(delimiter))
}

/// LOG2M_NOTE_MAX の値を解釈
///
/// 整数でなければ `fallback`、0以下は無制限(0)
pub fn resolve_note_max(raw: Option<&str>, fallback: usize) -> usize {
    let Some(raw) = raw else {
        return fallback;
    };

    match raw.trim().parse::<i64>() {
        Ok(n) if n <= 0 => 0,
        Ok(n) => usize::try_from(n).unwrap_or(usize::MAX),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}, using {}", NOTE_MAX_ENV, raw, fallback);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.note_max, 160);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.delimiter, ',');
    }

    #[test]
    fn test_resolve_note_max() {
        assert_eq!(resolve_note_max(None, 160), 160);
        assert_eq!(resolve_note_max(Some("80"), 160), 80);
        assert_eq!(resolve_note_max(Some(" 42 "), 160), 42);
        assert_eq!(resolve_note_max(Some("0"), 160), 0);
        assert_eq!(resolve_note_max(Some("-5"), 160), 0);
        assert_eq!(resolve_note_max(Some("abc"), 160), 160);
        assert_eq!(resolve_note_max(Some(""), 160), 160);
        assert_eq!(resolve_note_max(Some("12.5"), 100), 100);
    }

    #[test]
    fn test_emit_options_without_echo() {
        let config = Config {
            note_max: 50,
            ..Config::default()
        };
        let options = config.emit_options(false);
        assert!(!options.echo_lines);
        assert_eq!(options.note_max, 50);
    }

    #[test]
    fn test_emit_options_reads_env_only_when_echoing() {
        // 環境変数はプロセス全体で共有されるので1つのテストにまとめる
        let config = Config::default();

        std::env::set_var(NOTE_MAX_ENV, "7");
        assert_eq!(config.emit_options(true).note_max, 7);
        assert_eq!(config.emit_options(false).note_max, 160);

        std::env::set_var(NOTE_MAX_ENV, "abc");
        let options = config.emit_options(true);
        assert!(options.echo_lines);
        assert_eq!(options.note_max, 160);

        std::env::set_var(NOTE_MAX_ENV, "-1");
        assert_eq!(config.emit_options(true).note_max, 0);

        std::env::remove_var(NOTE_MAX_ENV);
        assert_eq!(config.emit_options(true).note_max, 160);
    }

    #[test]
    fn test_delimiter_byte() {
        assert_eq!(delimiter_byte(',').unwrap(), b',');
        assert_eq!(delimiter_byte('\t').unwrap(), b'\t');
        assert!(matches!(
            delimiter_byte('、'),
            Err(ConfigError::InvalidDelimiter('、'))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "note_max = 80\ndelimiter = \";\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.note_max, 80);
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "note_max = \"many\"\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
