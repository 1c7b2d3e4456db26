// ============================================
// src/logging.rs
// ログ出力 (画面はTUIが使うのでファイルへ書く)
// ============================================

use std::fs;

use console::style;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// ログを初期化する。戻り値のガードはプロセス終了まで保持すること
///
/// ログの保存先が使えない場合は警告を一度だけ出し、ファイルログなしで続行する (`None`)。
pub fn init(config: &Config) -> Option<WorkerGuard> {
    let log_dir = config.log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!(
            "{} file logging disabled, cannot create {}: {e}",
            style("warning:").yellow().bold(),
            log_dir.display()
        );
        return None;
    }

    let file_appender = tracing_appender::rolling::never(&log_dir, config.log_file_name());
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .try_init()
    {
        eprintln!(
            "{} file logging disabled: {e}",
            style("warning:").yellow().bold()
        );
        return None;
    }

    tracing::info!("nihongo v{} starting", env!("CARGO_PKG_VERSION"));
    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn unusable_data_dir_disables_file_logging_instead_of_failing() {
        let dir = tempdir().unwrap();
        let occupied = dir.path().join("occupied");
        fs::write(&occupied, "").unwrap();

        // 通常ファイルの下にはディレクトリを作れない
        let config = Config {
            data_dir: occupied.join("data"),
            catalog: None,
            speech: false,
            log_level: "info".to_string(),
        };

        assert!(init(&config).is_none());
        assert!(!config.log_dir().exists());
    }
}
