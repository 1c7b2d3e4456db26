// ============================================
// src/storage.rs
// お気に入り・テーマを保存するキーバリューストア
// ============================================

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// お気に入り (JSON配列) のキー
pub const FAVORITES_KEY: &str = "favorites";
/// テーマ (`light` / `dark`) のキー
pub const THEME_KEY: &str = "theme";

const STORAGE_FILE: &str = "storage.json";

/// 文字列キー → 文字列値の永続ストア
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

// --------------------------------------------------
// ファイル保存
// --------------------------------------------------

/// データディレクトリの `storage.json` に全キーをまとめて保存する
///
/// 書き込みのたびにファイル全体を書き直す。書き手はこのプロセスだけ。
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl FileStorage {
    /// ディレクトリを用意して既存の値を読み込む
    ///
    /// ファイルが無い・壊れている場合は空のストアになる。
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(data_dir).map_err(|source| StorageError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let path = data_dir.join(STORAGE_FILE);
        let items = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "ignoring corrupt storage file: {e}");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "could not read storage file: {e}");
                BTreeMap::new()
            }
        };

        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&self.items)?;
        fs::write(&self.path, json).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

// --------------------------------------------------
// メモリ上のみ
// --------------------------------------------------

/// 保存先が使えないとき・テスト用
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// ファイル保存を開き、失敗したらメモリ保存にフォールバックする
pub fn open_or_memory(data_dir: &Path) -> Box<dyn Storage> {
    match FileStorage::open(data_dir) {
        Ok(storage) => {
            tracing::info!(path = %storage.path().display(), "using file storage");
            Box::new(storage)
        }
        Err(e) => {
            tracing::warn!("falling back to in-memory storage: {e}");
            Box::new(MemoryStorage::new())
        }
    }
}
