// ============================================
// src/favorites.rs
// お気に入りの管理 (追加順を保持、重複なし)
// ============================================

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::{FAVORITES_KEY, Storage};

/// お気に入りの識別子 (日本語と英訳の組)
///
/// 区切り文字で連結せず、組のまま持つ。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FavoriteKey {
    pub jp: String,
    pub en: String,
}

impl FavoriteKey {
    pub fn new(jp: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            jp: jp.into(),
            en: en.into(),
        }
    }

    fn is(&self, jp: &str, en: &str) -> bool {
        self.jp == jp && self.en == en
    }
}

/// 保存形式の1要素
///
/// 書き込みは `["jp", "en"]`。古い `"jp|en"` 形式も読める。
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Pair(String, String),
    Legacy(String),
}

impl From<StoredEntry> for FavoriteKey {
    fn from(entry: StoredEntry) -> Self {
        match entry {
            StoredEntry::Pair(jp, en) => FavoriteKey { jp, en },
            StoredEntry::Legacy(joined) => match joined.split_once('|') {
                Some((jp, en)) => FavoriteKey::new(jp, en),
                None => FavoriteKey::new(joined, ""),
            },
        }
    }
}

/// トグルの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteChange {
    Added,
    Removed,
}

impl FavoriteChange {
    /// トースト表示用のメッセージ
    pub fn message(self) -> &'static str {
        match self {
            FavoriteChange::Added => "Added to favorites",
            FavoriteChange::Removed => "Removed from favorites",
        }
    }
}

/// お気に入り一覧
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesStore {
    entries: Vec<FavoriteKey>,
}

impl FavoritesStore {
    /// MARK:ストレージから読み込む (無い・壊れている場合は空)
    pub fn load(storage: &dyn Storage) -> Self {
        let Some(raw) = storage.get_item(FAVORITES_KEY) else {
            return Self::default();
        };

        match serde_json::from_str::<Vec<StoredEntry>>(&raw) {
            Ok(stored) => {
                let mut store = Self::default();
                for key in stored.into_iter().map(FavoriteKey::from) {
                    // 手で編集されたファイルでも重複は持たない
                    if !store.is_favorited(&key.jp, &key.en) {
                        store.entries.push(key);
                    }
                }
                store
            }
            Err(e) => {
                tracing::warn!("ignoring unreadable favorites: {e}");
                Self::default()
            }
        }
    }

    /// MARK:全件を書き直す
    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        let stored: Vec<StoredEntry> = self
            .entries
            .iter()
            .map(|k| StoredEntry::Pair(k.jp.clone(), k.en.clone()))
            .collect();
        let json = serde_json::to_string(&stored)?;
        storage.set_item(FAVORITES_KEY, &json)
    }

    pub fn is_favorited(&self, jp: &str, en: &str) -> bool {
        self.entries.iter().any(|k| k.is(jp, en))
    }

    /// あれば削除、なければ末尾に追加
    pub fn toggle(&mut self, jp: &str, en: &str) -> FavoriteChange {
        if let Some(index) = self.entries.iter().position(|k| k.is(jp, en)) {
            self.entries.remove(index);
            FavoriteChange::Removed
        } else {
            self.entries.push(FavoriteKey::new(jp, en));
            FavoriteChange::Added
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FavoriteKey> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn toggle_twice_restores_original_list() {
        let mut store = FavoritesStore::default();
        store.toggle("すみません", "Excuse me");
        let before = store.clone();

        assert_eq!(store.toggle("こんにちは", "Hello"), FavoriteChange::Added);
        assert!(store.is_favorited("こんにちは", "Hello"));
        assert_eq!(store.toggle("こんにちは", "Hello"), FavoriteChange::Removed);

        assert_eq!(store, before);
    }

    #[test]
    fn toggle_never_duplicates() {
        let mut store = FavoritesStore::default();
        for _ in 0..5 {
            store.toggle("水（みず）", "Water");
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn removal_keeps_order_of_the_rest() {
        let mut store = FavoritesStore::default();
        store.toggle("a", "1");
        store.toggle("b", "2");
        store.toggle("c", "3");
        store.toggle("b", "2");

        let jp: Vec<_> = store.iter().map(|k| k.jp.as_str()).collect();
        assert_eq!(jp, ["a", "c"]);
    }

    #[test]
    fn separator_inside_fields_does_not_collide() {
        let mut store = FavoritesStore::default();
        store.toggle("a|b", "c");
        assert!(!store.is_favorited("a", "b|c"));
        store.toggle("a", "b|c");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut storage = MemoryStorage::new();
        let mut store = FavoritesStore::default();
        store.toggle("ビール", "Beer");
        store.toggle("a|b", "pipe | inside");
        store.toggle("お茶（ちゃ）", "Tea");
        store.save(&mut storage).unwrap();

        assert_eq!(FavoritesStore::load(&storage), store);
    }

    #[test]
    fn missing_or_corrupt_value_loads_empty() {
        let mut storage = MemoryStorage::new();
        assert!(FavoritesStore::load(&storage).is_empty());

        storage.set_item(FAVORITES_KEY, "not json").unwrap();
        assert!(FavoritesStore::load(&storage).is_empty());

        storage.set_item(FAVORITES_KEY, r#"{"jp":"x"}"#).unwrap();
        assert!(FavoritesStore::load(&storage).is_empty());
    }

    #[test]
    fn legacy_joined_strings_are_read() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(FAVORITES_KEY, r#"["こんにちは|Hello", ["ビール", "Beer"]]"#)
            .unwrap();

        let store = FavoritesStore::load(&storage);
        assert!(store.is_favorited("こんにちは", "Hello"));
        assert!(store.is_favorited("ビール", "Beer"));
        assert_eq!(store.len(), 2);
    }
}
