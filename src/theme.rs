// ============================================
// src/theme.rs
// ライト / ダークテーマと配色
// ============================================

use std::fmt;

use ratatui::style::{Color, Modifier, Style};

use crate::error::StorageError;
use crate::storage::{Storage, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// 保存値から復元 (不明な値はライト)
    pub fn load(storage: &dyn Storage) -> Theme {
        match storage.get_item(THEME_KEY).as_deref() {
            Some("dark") => Theme::Dark,
            Some("light") | None => Theme::Light,
            Some(other) => {
                tracing::warn!("unknown theme `{other}`, using light");
                Theme::Light
            }
        }
    }

    pub fn save(self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        storage.set_item(THEME_KEY, self.as_str())
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                base: Style::default().fg(Color::Black).bg(Color::White),
                accent: Color::Rgb(0x3d, 0x5a, 0x80),
                muted: Color::DarkGray,
                favorite: Color::Rgb(0xc0, 0x39, 0x2b),
                copied: Color::Rgb(0x5b, 0x8a, 0x72),
                selected: Style::default().bg(Color::Rgb(0xe4, 0xea, 0xf2)),
            },
            Theme::Dark => Palette {
                base: Style::default().fg(Color::Gray).bg(Color::Black),
                accent: Color::Rgb(0x98, 0xc1, 0xd9),
                muted: Color::DarkGray,
                favorite: Color::Rgb(0xee, 0x6c, 0x4d),
                copied: Color::Rgb(0x8f, 0xbc, 0xa3),
                selected: Style::default().bg(Color::Rgb(0x29, 0x32, 0x41)),
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 画面全体で使う色 (起動時に保存済みテーマから決まる)
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub base: Style,
    pub accent: Color,
    pub muted: Color,
    pub favorite: Color,
    pub copied: Color,
    pub selected: Style,
}

impl Palette {
    pub fn title(&self) -> Style {
        self.base.fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn dim(&self) -> Style {
        self.base.fg(self.muted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn defaults_to_light() {
        assert_eq!(Theme::load(&MemoryStorage::new()), Theme::Light);
    }

    #[test]
    fn unknown_value_falls_back_to_light() {
        let mut storage = MemoryStorage::new();
        storage.set_item(THEME_KEY, "sepia").unwrap();
        assert_eq!(Theme::load(&storage), Theme::Light);
    }

    #[test]
    fn saved_theme_is_restored() {
        let mut storage = MemoryStorage::new();
        Theme::Light.toggled().save(&mut storage).unwrap();
        assert_eq!(Theme::load(&storage), Theme::Dark);
    }
}
