// ============================================
// src/app.rs
// キー入力 → 画面状態の操作、コピー・読み上げの呼び出し
// ============================================

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::catalog::{CardKind, Tab};
use crate::clipboard::ClipboardSink;
use crate::speech::Speaker;
use crate::text::strip_annotation;
use crate::view::ViewState;

/// キー入力の受け先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// カード一覧の操作
    Browse,
    /// 検索欄に入力中
    Search,
}

/// 選択中のカード (借用を切るためにコピーして持つ)
#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectedCard {
    kind: CardKind,
    jp: String,
    gloss: String,
}

/// アプリ全体の状態を管理する
pub struct App {
    pub state: ViewState,
    speaker: Box<dyn Speaker>,
    clipboard: Box<dyn ClipboardSink>,

    pub mode: InputMode,
    /// 表示カード (全セクション通し) のうち何番目を選んでいるか
    pub selected: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        state: ViewState,
        speaker: Box<dyn Speaker>,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        Self {
            state,
            speaker,
            clipboard,
            mode: InputMode::Browse,
            selected: 0,
            should_quit: false,
        }
    }

    /// キー入力の処理
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.mode {
            InputMode::Search => self.handle_search_key(key),
            InputMode::Browse => self.handle_browse_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.mode = InputMode::Browse,
            KeyCode::Backspace => {
                self.state.pop_query_char();
                self.selected = 0;
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.set_query(String::new());
                self.selected = 0;
            }
            KeyCode::Char(c) => {
                self.state.push_query_char(c);
                self.selected = 0;
            }
            KeyCode::Down => self.move_selection(1),
            KeyCode::Up => self.move_selection(-1),
            _ => {}
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => self.mode = InputMode::Search,
            KeyCode::Char(c @ '1'..='6') => {
                let index = c as usize - '1' as usize;
                self.select_tab(Tab::ALL[index]);
            }
            KeyCode::Tab => self.select_tab(self.state.active_tab().next()),
            KeyCode::BackTab => self.select_tab(self.state.active_tab().prev()),
            KeyCode::Char('v') => {
                self.state.toggle_favorites_view();
                self.selected = 0;
            }
            KeyCode::Char('t') => {
                let theme = self.state.toggle_theme();
                tracing::debug!(%theme, "theme toggled");
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Enter => self.activate_selected(),
            KeyCode::Char('p') => self.speak_selected(),
            KeyCode::Char('f') => self.toggle_selected_favorite(),
            _ => {}
        }
    }

    fn select_tab(&mut self, tab: Tab) {
        self.state.select_tab(tab);
        self.selected = 0;
    }

    fn card_count(&self) -> usize {
        self.state.visible().cards().count()
    }

    fn move_selection(&mut self, delta: isize) {
        let count = self.card_count();
        if count == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(count - 1);
    }

    fn selected_card(&self) -> Option<SelectedCard> {
        self.state
            .visible()
            .cards()
            .nth(self.selected)
            .map(|card| SelectedCard {
                kind: card.kind,
                jp: card.jp.to_string(),
                gloss: card.gloss.to_string(),
            })
    }

    /// Enter: フレーズ・単語はコピー、助数詞は読み上げ
    fn activate_selected(&mut self) {
        let Some(card) = self.selected_card() else {
            return;
        };
        match card.kind {
            CardKind::Counter => self.speak(&card.jp),
            CardKind::Phrase | CardKind::Vocab => {
                let text = strip_annotation(&card.jp);
                self.clipboard.copy(&text);
                self.state.mark_copied(self.selected);
            }
        }
    }

    fn speak_selected(&mut self) {
        if let Some(card) = self.selected_card() {
            self.speak(&card.jp);
        }
    }

    fn speak(&mut self, jp: &str) {
        self.speaker.speak(&strip_annotation(jp));
    }

    fn toggle_selected_favorite(&mut self) {
        let Some(card) = self.selected_card() else {
            return;
        };
        if card.kind == CardKind::Counter {
            return;
        }
        self.state.toggle_favorite(&card.jp, &card.gloss);

        // お気に入り表示中に外すとカードが減る
        let count = self.card_count();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.state.tick(now);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::catalog::Catalog;
    use crate::clipboard::MemoryClipboard;
    use crate::storage::MemoryStorage;
    use crate::theme::Theme;
    use crate::view::DisplayMode;

    /// 読み上げ要求を記録する
    #[derive(Clone, Default)]
    struct RecordingSpeaker {
        spoken: Rc<RefCell<Vec<String>>>,
    }

    impl Speaker for RecordingSpeaker {
        fn speak(&mut self, text: &str) {
            self.spoken.borrow_mut().push(text.to_string());
        }
        fn cancel(&mut self) {}
    }

    /// コピー内容を外から見られるようにする
    #[derive(Clone, Default)]
    struct SharedClipboard(Rc<RefCell<MemoryClipboard>>);

    impl ClipboardSink for SharedClipboard {
        fn copy(&mut self, text: &str) {
            self.0.borrow_mut().copy(text);
        }
    }

    fn app() -> (App, RecordingSpeaker, SharedClipboard) {
        let state = ViewState::load(Catalog::embedded().unwrap(), Box::new(MemoryStorage::new()));
        let speaker = RecordingSpeaker::default();
        let clipboard = SharedClipboard::default();
        let app = App::new(state, Box::new(speaker.clone()), Box::new(clipboard.clone()));
        (app, speaker, clipboard)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn enter_copies_text_without_reading_annotation() {
        let (mut app, _, clipboard) = app();
        // レストランタブの先頭: 二人（ふたり）です
        press(&mut app, KeyCode::Enter);

        assert_eq!(clipboard.0.borrow().contents, ["二人です"]);
        assert!(app.state.is_copied(0));
    }

    #[test]
    fn copied_mark_follows_the_selected_card_only() {
        let (mut app, _, _) = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert!(app.state.is_copied(1));
        assert!(!app.state.is_copied(0));
    }

    #[test]
    fn enter_on_counter_speaks_instead_of_copying() {
        let (mut app, speaker, clipboard) = app();
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.state.display_mode(), DisplayMode::Tab(Tab::Counters));

        press(&mut app, KeyCode::Enter);
        assert_eq!(*speaker.spoken.borrow(), ["ひとつ"]);
        assert!(clipboard.0.borrow().contents.is_empty());

        // 助数詞はお気に入りにできない
        press(&mut app, KeyCode::Char('f'));
        assert!(app.state.favorites().is_empty());
    }

    #[test]
    fn play_key_speaks_stripped_text() {
        let (mut app, speaker, _) = app();
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(*speaker.spoken.borrow(), ["予約しています"]);
    }

    #[test]
    fn search_mode_captures_letters() {
        let (mut app, _, _) = app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "quick");
        assert_eq!(app.state.query(), "quick");
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.state.query(), "quic");

        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(app.state.query(), "");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, InputMode::Browse);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn search_then_favorite_the_match() {
        let (mut app, _, _) = app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "hello");
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('f'));
        assert!(app.state.is_favorited("こんにちは", "Hello"));
        assert_eq!(app.state.toast(), Some("Added to favorites"));

        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.state.display_mode(), DisplayMode::Favorites);
        assert_eq!(app.state.query(), "");

        // お気に入り表示で外すと選択位置が詰まる
        press(&mut app, KeyCode::Char('f'));
        assert!(app.state.favorites().is_empty());
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn tab_keys_cycle_and_reset_selection() {
        let (mut app, _, _) = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected, 2);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.state.active_tab(), Tab::Shopping);
        assert_eq!(app.selected, 0);

        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.state.active_tab(), Tab::Useful);
    }

    #[test]
    fn selection_stops_at_last_card() {
        let (mut app, _, _) = app();
        for _ in 0..500 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.selected, app.card_count() - 1);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected, app.card_count() - 2);
    }

    #[test]
    fn theme_key_toggles_theme() {
        let (mut app, _, _) = app();
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.state.theme(), Theme::Dark);
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.state.theme(), Theme::Light);
    }

    #[test]
    fn ctrl_c_quits_even_while_searching() {
        let (mut app, _, _) = app();
        press(&mut app, KeyCode::Char('/'));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
