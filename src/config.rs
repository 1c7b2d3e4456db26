// ============================================
// src/config.rs
// コマンドライン引数と実行時設定
// ============================================

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::catalog::Tab;

const LOG_FILE: &str = "nihongo.log";

#[derive(Debug, Parser)]
#[command(name = "nihongo", version, about = "日本語 Quick Guide: phrases, vocabulary and counters")]
pub struct Cli {
    /// お気に入り・テーマ・ログの保存先
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// 同梱カタログの代わりに使うJSONファイル
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// 読み上げを無効にする
    #[arg(long, global = true)]
    pub no_speech: bool,

    /// ログレベル (RUST_LOG があればそちらが優先)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// 対話画面を開く (既定)
    Tui,
    /// カタログを検索して一致したカードを表示する
    Search {
        query: String,
        /// 指定したタブだけを検索する
        #[arg(long, value_parser = parse_tab)]
        tab: Option<Tab>,
    },
    /// 保存済みのお気に入りを表示する
    Favorites,
    /// 読み仮名注釈を除いて一度だけ読み上げる
    Speak { text: String },
}

fn parse_tab(value: &str) -> Result<Tab, String> {
    Tab::from_key(&value.to_lowercase()).ok_or_else(|| {
        let keys: Vec<_> = Tab::ALL.iter().map(|t| t.key()).collect();
        format!("unknown tab `{value}` (expected one of: {})", keys.join(", "))
    })
}

/// 引数から決まる実行時設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub catalog: Option<PathBuf>,
    pub speech: bool,
    pub log_level: String,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            data_dir: cli.data_dir.clone().unwrap_or_else(default_data_dir),
            catalog: cli.catalog.clone(),
            speech: !cli.no_speech,
            log_level: cli.log_level.clone(),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn log_file_name(&self) -> &'static str {
        LOG_FILE
    }
}

// MARK:OSごとのデータ保存用ディレクトリ
fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("jp", "nihongo-guide", "NIHONGO_GUIDE") {
        return proj_dirs.data_dir().to_path_buf();
    }

    // 取得できなかったらカレントディレクトリに (フォールバック)
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_tui_defaults() {
        let cli = Cli::try_parse_from(["nihongo"]).unwrap();
        assert_eq!(cli.command, None);

        let config = Config::from_cli(&cli);
        assert!(config.speech);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.catalog, None);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nihongo",
            "search",
            "ありがとう",
            "--tab",
            "Conversation",
            "--data-dir",
            "/tmp/nihongo",
            "--no-speech",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Some(Command::Search {
                query: "ありがとう".to_string(),
                tab: Some(Tab::Conversation),
            })
        );
        let config = Config::from_cli(&cli);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/nihongo"));
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/nihongo/logs"));
        assert!(!config.speech);
    }

    #[test]
    fn unknown_tab_is_rejected() {
        let result = Cli::try_parse_from(["nihongo", "search", "x", "--tab", "karaoke"]);
        assert!(result.is_err());
    }
}
