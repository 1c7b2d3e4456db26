// ============================================
// src/view.rs
// 画面の状態 (タブ・検索・お気に入り・テーマ) と表示カードの計算
// ============================================

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::catalog::{Card, CardKind, Catalog, Section, Tab};
use crate::favorites::{FavoriteChange, FavoritesStore};
use crate::search;
use crate::storage::Storage;
use crate::theme::Theme;

/// トーストの表示時間
pub const TOAST_DURATION: Duration = Duration::from_millis(2000);
/// カードの「コピーしました」表示時間
pub const COPIED_DURATION: Duration = Duration::from_millis(1500);

/// いま表示しているもの
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Tab(Tab),
    Favorites,
}

/// 一時的なお知らせ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: &'static str,
    expires_at: Instant,
}

/// 表示カードの計算結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visible<'a> {
    Sections(Vec<Section<'a>>),
    /// お気に入りが一件も無い (検索で0件になった場合とは区別する)
    NoFavorites,
}

impl<'a> Visible<'a> {
    pub fn sections(&self) -> &[Section<'a>] {
        match self {
            Visible::Sections(sections) => sections,
            Visible::NoFavorites => &[],
        }
    }

    /// 上から順に並べたカード (選択カーソル用)
    pub fn cards(&self) -> impl Iterator<Item = &Card<'a>> {
        self.sections().iter().flat_map(|s| s.cards.iter())
    }
}

/// 画面状態のただ一つの持ち主
///
/// お気に入りとテーマは生成時にストレージから読み、変更のたびに書き戻す。
pub struct ViewState {
    catalog: Catalog,
    storage: Box<dyn Storage>,

    active_tab: Tab,
    showing_favorites: bool,
    query: String,

    favorites: FavoritesStore,
    theme: Theme,

    toast: Option<Toast>,
    /// 表示カード (全セクション通し) の位置 → 印の期限
    copied: HashMap<usize, Instant>,
}

impl ViewState {
    /// 起動時の状態 (保存済みのお気に入りとテーマだけを信じる)
    pub fn load(catalog: Catalog, storage: Box<dyn Storage>) -> Self {
        let favorites = FavoritesStore::load(storage.as_ref());
        let theme = Theme::load(storage.as_ref());
        tracing::info!(favorites = favorites.len(), %theme, "view state restored");

        Self {
            catalog,
            storage,
            active_tab: Tab::default(),
            showing_favorites: false,
            query: String::new(),
            favorites,
            theme,
            toast: None,
            copied: HashMap::new(),
        }
    }

    // MARK:参照系

    pub fn display_mode(&self) -> DisplayMode {
        if self.showing_favorites {
            DisplayMode::Favorites
        } else {
            DisplayMode::Tab(self.active_tab)
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn is_favorited(&self, jp: &str, en: &str) -> bool {
        self.favorites.is_favorited(jp, en)
    }

    pub fn toast(&self) -> Option<&'static str> {
        self.toast.as_ref().map(|t| t.message)
    }

    /// `index` は `visible()` のカードを全セクション通しで数えた位置
    pub fn is_copied(&self, index: usize) -> bool {
        self.copied.contains_key(&index)
    }

    /// タブ選択 → お気に入り表示 → 検索 の順で表示カードを決める
    pub fn visible(&self) -> Visible<'_> {
        let sections = if self.showing_favorites {
            if self.favorites.is_empty() {
                return Visible::NoFavorites;
            }
            vec![Section {
                title: "Favorites".to_string(),
                tip: None,
                cards: self
                    .favorites
                    .iter()
                    .map(|key| Card {
                        kind: CardKind::Phrase,
                        jp: &key.jp,
                        gloss: &key.en,
                        note: None,
                    })
                    .collect(),
            }]
        } else {
            self.catalog.sections(self.active_tab)
        };

        Visible::Sections(search::filter_sections(sections, &self.query))
    }

    // MARK:表示モード

    /// タブを切り替える (検索語を消し、お気に入り表示を抜ける)
    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.showing_favorites = false;
        self.query.clear();
        self.copied.clear();
    }

    /// お気に入り表示と直前のタブ表示を行き来する
    pub fn toggle_favorites_view(&mut self) {
        if !self.showing_favorites {
            self.query.clear();
        }
        self.showing_favorites = !self.showing_favorites;
        self.copied.clear();
    }

    // MARK:検索

    // 検索語が変わるとカードの位置がずれるので、コピー印も消す

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.copied.clear();
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
        self.copied.clear();
    }

    pub fn pop_query_char(&mut self) {
        if self.query.pop().is_some() {
            self.copied.clear();
        }
    }

    // MARK:永続化される変更

    /// お気に入りの追加・削除。トーストを出し、全件を保存する
    pub fn toggle_favorite(&mut self, jp: &str, en: &str) -> FavoriteChange {
        let change = self.favorites.toggle(jp, en);
        self.show_toast(change.message());
        if self.showing_favorites {
            // お気に入り表示ではカードが増減する
            self.copied.clear();
        }

        if let Err(e) = self.favorites.save(self.storage.as_mut()) {
            tracing::warn!("failed to persist favorites: {e}");
        }
        tracing::debug!(jp, en, ?change, "favorite toggled");
        change
    }

    /// テーマを切り替えてすぐに保存する
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(e) = self.theme.save(self.storage.as_mut()) {
            tracing::warn!("failed to persist theme: {e}");
        }
        self.theme
    }

    // MARK:一時的な表示

    /// `index` 番目の表示カードに「コピー済み」の印をつける (一定時間で消える)
    ///
    /// 同じ日本語・英訳のカードが他にあっても、印がつくのはこの1枚だけ。
    pub fn mark_copied(&mut self, index: usize) {
        self.copied.insert(index, Instant::now() + COPIED_DURATION);
    }

    fn show_toast(&mut self, message: &'static str) {
        self.toast = Some(Toast {
            message,
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    /// 期限切れのトーストとコピー印を消す
    pub fn tick(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| now >= t.expires_at) {
            self.toast = None;
        }
        self.copied.retain(|_, expires_at| now < *expires_at);
    }

    /// ストレージを取り出す (再読み込みのテスト用)
    #[cfg(test)]
    fn into_storage(self) -> Box<dyn Storage> {
        self.storage
    }
}
