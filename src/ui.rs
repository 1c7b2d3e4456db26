// ============================================
// src/ui.rs
// UI描画
// ============================================

use ratatui::{
    prelude::*,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};

use crate::app::{App, InputMode};
use crate::catalog::{CardKind, Tab};
use crate::theme::{Palette, Theme};
use crate::view::{DisplayMode, Visible};

const HELP: &str =
    "1-6/Tab: tabs  /: search  j/k: move  Enter: copy  p: play  f: favorite  v: favorites  t: theme  q: quit";

pub fn ui(f: &mut Frame, app: &App) {
    let palette = app.state.theme().palette();
    let size = f.area();

    // 枠線を描画 (背景色もここで塗る)
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 語 日本語 Quick Guide ")
        .title_style(palette.title())
        .style(palette.base);
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] ヘッダー (お気に入り・テーマ)
            Constraint::Length(3), // [1] 検索欄
            Constraint::Length(1), // [2] タブ
            Constraint::Min(1),    // [3] カード一覧
            Constraint::Length(1), // [4] トースト / ヘルプ
        ])
        .split(inner_area);

    render_header(f, app, &palette, chunks[0]);
    render_search(f, app, &palette, chunks[1]);
    render_tabs(f, app, &palette, chunks[2]);
    render_cards(f, app, &palette, chunks[3]);
    render_footer(f, app, &palette, chunks[4]);
}

fn render_header(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let showing_favorites = app.state.display_mode() == DisplayMode::Favorites;
    let favorites_style = if showing_favorites {
        palette.base.fg(palette.favorite).add_modifier(Modifier::BOLD)
    } else {
        palette.dim()
    };
    let theme_icon = match app.state.theme() {
        Theme::Light => "☀",
        Theme::Dark => "☾",
    };

    let line = Line::from(vec![
        Span::styled(
            format!("♥ Favorites ({})", app.state.favorites().len()),
            favorites_style,
        ),
        Span::raw("   "),
        Span::styled(format!("{theme_icon} {}", app.state.theme()), palette.dim()),
    ]);
    f.render_widget(Paragraph::new(line).style(palette.base).right_aligned(), area);
}

fn render_search(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let editing = app.mode == InputMode::Search;
    let border_style = if editing {
        palette.base.fg(palette.accent)
    } else {
        palette.dim()
    };

    let query = app.state.query();
    let line = if query.is_empty() && !editing {
        Line::from(Span::styled("Search phrases...  (press /)", palette.dim()))
    } else {
        let mut spans = vec![Span::styled(query.to_string(), palette.base)];
        if editing {
            // カーソル代わり
            spans.push(Span::styled(" ", palette.base.add_modifier(Modifier::REVERSED)));
        }
        Line::from(spans)
    };

    let search = Paragraph::new(line).style(palette.base).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" 🔍 "),
    );
    f.render_widget(search, area);
}

fn render_tabs(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    // お気に入り表示中はタブを隠す
    if app.state.display_mode() == DisplayMode::Favorites {
        f.render_widget(
            Paragraph::new(Span::styled("♥ Favorites", palette.title())).style(palette.base),
            area,
        );
        return;
    }

    let titles: Vec<String> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| format!("{} {}", i + 1, tab.title()))
        .collect();
    let tabs = Tabs::new(titles)
        .style(palette.dim())
        .highlight_style(palette.title().add_modifier(Modifier::UNDERLINED))
        .select(app.state.active_tab().index())
        .divider("│");
    f.render_widget(tabs, area);
}

fn render_cards(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let visible = app.state.visible();

    if visible == Visible::NoFavorites {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("♡", palette.dim())),
            Line::from(Span::styled("No favorites yet.", palette.base)),
            Line::from(Span::styled(
                "Press f on any phrase to save it here.",
                palette.dim(),
            )),
        ])
        .style(palette.base)
        .centered();
        f.render_widget(empty, area);
        return;
    }

    if visible.sections().is_empty() {
        let message = format!("No matches for \"{}\"", app.state.query());
        f.render_widget(
            Paragraph::new(Span::styled(message, palette.dim()))
                .style(palette.base)
                .centered(),
            area,
        );
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0;
    let mut index = 0;

    for section in visible.sections() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(section.title.clone(), palette.title())));
        if let Some(tip) = section.tip {
            lines.push(Line::from(Span::styled(
                format!("  💡 {tip}"),
                palette.dim().add_modifier(Modifier::ITALIC),
            )));
        }

        for card in &section.cards {
            let is_selected = index == app.selected;
            if is_selected {
                selected_line = lines.len();
            }
            let row_style = if is_selected {
                palette.base.patch(palette.selected)
            } else {
                palette.base
            };
            let marker = if is_selected { "▶ " } else { "  " };

            // 1行目: 日本語 (助数詞は数字つき) とマーク
            let mut spans = vec![Span::styled(marker, row_style.fg(palette.accent))];
            match card.kind {
                CardKind::Counter => {
                    spans.push(Span::styled(
                        format!("{:>3}  ", card.gloss),
                        row_style.fg(palette.accent).add_modifier(Modifier::BOLD),
                    ));
                    spans.push(Span::styled(card.jp, row_style));
                    spans.push(Span::styled("  ♪", row_style.fg(palette.muted)));
                }
                CardKind::Phrase | CardKind::Vocab => {
                    spans.push(Span::styled(card.jp, row_style.add_modifier(Modifier::BOLD)));
                    if card.kind == CardKind::Vocab {
                        spans.push(Span::styled(" ─ ", row_style.fg(palette.muted)));
                        spans.push(Span::styled(card.gloss, row_style));
                    }
                    let heart = if app.state.is_favorited(card.jp, card.gloss) {
                        Span::styled("  ♥", row_style.fg(palette.favorite))
                    } else {
                        Span::styled("  ♡", row_style.fg(palette.muted))
                    };
                    spans.push(heart);
                    if app.state.is_copied(index) {
                        spans.push(Span::styled(
                            "  ✓ copied",
                            row_style.fg(palette.copied).add_modifier(Modifier::BOLD),
                        ));
                    }
                }
            }
            lines.push(Line::from(spans));

            // 2行目以降: 英訳と補足 (フレーズカードのみ)
            if card.kind == CardKind::Phrase {
                lines.push(Line::from(Span::styled(
                    format!("    {}", card.gloss),
                    palette.base,
                )));
                if let Some(note) = card.note {
                    lines.push(Line::from(Span::styled(
                        format!("    ※ {note}"),
                        palette.dim().add_modifier(Modifier::ITALIC),
                    )));
                }
            }
            index += 1;
        }
    }

    // 選択行が画面内に収まるようにスクロール
    let height = area.height as usize;
    let scroll = (selected_line + 3).saturating_sub(height);

    f.render_widget(
        Paragraph::new(lines)
            .style(palette.base)
            .scroll((scroll.min(u16::MAX as usize) as u16, 0)),
        area,
    );
}

fn render_footer(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let line = match app.state.toast() {
        Some(message) => Line::from(Span::styled(
            message,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .centered(),
        None => Line::from(Span::styled(HELP, palette.dim())),
    };
    f.render_widget(Paragraph::new(line).style(palette.base), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::clipboard::MemoryClipboard;
    use crate::speech::MuteSpeaker;
    use crate::storage::MemoryStorage;
    use crate::view::ViewState;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let state = ViewState::load(Catalog::embedded().unwrap(), Box::new(MemoryStorage::new()));
        App::new(state, Box::new(MuteSpeaker), Box::new(MemoryClipboard::default()))
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn renders_tabs_and_first_section() {
        let screen = render(&app());
        assert!(screen.contains("1 Restaurant"));
        assert!(screen.contains("6 Useful"));
        assert!(screen.contains("Entering"));
        assert!(screen.contains("Two people, please"));
    }

    #[test]
    fn favorites_view_hides_tabs_and_shows_empty_state() {
        let mut app = app();
        press(&mut app, KeyCode::Char('v'));
        let screen = render(&app);
        assert!(!screen.contains("1 Restaurant"));
        assert!(screen.contains("No favorites yet."));
    }

    #[test]
    fn no_matches_message() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        for c in "xyzzy".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        let screen = render(&app);
        assert!(screen.contains("No matches for \"xyzzy\""));
    }

    #[test]
    fn toast_replaces_help_line() {
        let mut app = app();
        assert!(render(&app).contains("q: quit"));
        press(&mut app, KeyCode::Char('f'));
        let screen = render(&app);
        assert!(screen.contains("Added to favorites"));
        assert!(!screen.contains("q: quit"));
    }
}
