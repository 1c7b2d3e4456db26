// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use console::style;

mod app;
mod catalog;
mod clipboard;
mod config;
mod error;
mod favorites;
mod logging;
mod search;
mod speech;
mod storage;
mod text;
mod theme;
mod ui;
mod view;

use app::App;
use catalog::{Catalog, Tab};
use clipboard::SystemClipboard;
use config::{Cli, Command, Config};
use speech::{MuteSpeaker, Speaker, SystemSpeaker};
use view::ViewState;

use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

// --------------------------------------------------
// メイン関数
// --------------------------------------------------

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli);
    let _log_guard = logging::init(&config);

    let catalog = load_catalog(&config)?;

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => run_tui(&config, catalog),
        Command::Search { query, tab } => {
            print_search(&catalog, &query, tab);
            Ok(())
        }
        Command::Favorites => {
            print_favorites(&config);
            Ok(())
        }
        Command::Speak { text } => {
            speak_once(&config, &text);
            Ok(())
        }
    }
}

fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    let catalog = match &config.catalog {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => Catalog::embedded().context("loading built-in catalog")?,
    };
    Ok(catalog)
}

fn make_speaker(config: &Config) -> Box<dyn Speaker> {
    if config.speech {
        Box::new(SystemSpeaker::new())
    } else {
        Box::new(MuteSpeaker)
    }
}

// --------------------------------------------------
// TUIセットアップと実行ループ
// --------------------------------------------------

fn run_tui(config: &Config, catalog: Catalog) -> anyhow::Result<()> {
    // テーマは最初の描画より前に保存値から決まる
    let state = ViewState::load(catalog, storage::open_or_memory(&config.data_dir));
    let mut app = App::new(state, make_speaker(config), Box::new(SystemClipboard::new()));

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal()?;

    if let Err(e) = &result {
        tracing::error!("event loop exited: {e:#}");
    }
    result
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Ok(Terminal::new(backend)?)
}

fn restore_terminal() -> anyhow::Result<()> {
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<impl Backend>, app: &mut App) -> anyhow::Result<()> {
    while !app.should_quit {
        app.tick(Instant::now());
        terminal.draw(|f| ui::ui(f, app))?;

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }

    tracing::info!("quit requested");
    Ok(())
}

// --------------------------------------------------
// サブコマンド (標準出力へ表示)
// --------------------------------------------------

fn print_search(catalog: &Catalog, query: &str, tab: Option<Tab>) {
    let tabs: Vec<Tab> = match tab {
        Some(tab) => vec![tab],
        None => Tab::ALL.to_vec(),
    };

    let mut hits = 0;
    for tab in tabs {
        for section in search::filter_sections(catalog.sections(tab), query) {
            println!(
                "{} {}",
                style(format!("[{}]", tab.title())).dim(),
                style(&section.title).cyan().bold()
            );
            for card in &section.cards {
                match card.kind {
                    catalog::CardKind::Counter => {
                        println!("  {:>3}  {}", style(card.gloss).bold(), card.jp);
                    }
                    catalog::CardKind::Phrase | catalog::CardKind::Vocab => {
                        println!("  {}  {}", style(card.jp).bold(), card.gloss);
                        if let Some(note) = card.note {
                            println!("      {}", style(format!("※ {note}")).dim().italic());
                        }
                    }
                }
                hits += 1;
            }
        }
    }

    if hits == 0 {
        println!("{}", style(format!("No matches for \"{query}\"")).yellow());
    }
}

fn print_favorites(config: &Config) {
    let storage = storage::open_or_memory(&config.data_dir);
    let favorites = favorites::FavoritesStore::load(storage.as_ref());

    if favorites.is_empty() {
        println!("{}", style("No favorites yet.").dim());
        return;
    }
    for key in favorites.iter() {
        println!("{} {}  {}", style("♥").red(), style(&key.jp).bold(), key.en);
    }
}

fn speak_once(config: &Config, text: &str) {
    let clean = text::strip_annotation(text);
    if !config.speech {
        println!("{}", style("speech disabled (--no-speech)").dim());
        return;
    }
    let mut speaker = SystemSpeaker::new();
    speaker.speak(&clean);
    speaker.wait();
}
