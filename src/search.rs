// ============================================
// src/search.rs
// 検索フィルタ (大文字小文字を無視した部分一致)
// ============================================

use crate::catalog::{Card, Counter, Phrase, Section};
use crate::favorites::FavoriteKey;

/// 検索対象になる2つのテキストを持つもの
pub trait Searchable {
    fn jp(&self) -> &str;
    /// 英訳 (助数詞は数字)
    fn en(&self) -> &str;
}

impl Searchable for Phrase {
    fn jp(&self) -> &str {
        &self.jp
    }
    fn en(&self) -> &str {
        &self.en
    }
}

impl Searchable for Counter {
    fn jp(&self) -> &str {
        &self.jp
    }
    fn en(&self) -> &str {
        &self.num
    }
}

impl Searchable for FavoriteKey {
    fn jp(&self) -> &str {
        &self.jp
    }
    fn en(&self) -> &str {
        &self.en
    }
}

impl Searchable for Card<'_> {
    fn jp(&self) -> &str {
        self.jp
    }
    fn en(&self) -> &str {
        self.gloss
    }
}

/// 空のクエリは常に一致。それ以外は `jp` か `en` に部分一致すれば表示する
pub fn matches<R: Searchable + ?Sized>(record: &R, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    record.jp().to_lowercase().contains(&query) || record.en().to_lowercase().contains(&query)
}

/// セクションごとにカードを絞り込む (順番はそのまま)
///
/// 検索中は一致するカードが無いセクションを落とす。
pub fn filter_sections<'a>(sections: Vec<Section<'a>>, query: &str) -> Vec<Section<'a>> {
    if query.is_empty() {
        return sections;
    }
    sections
        .into_iter()
        .filter_map(|mut section| {
            section.cards.retain(|card| matches(card, query));
            (!section.cards.is_empty()).then_some(section)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Tab};

    fn phrase(jp: &str, en: &str) -> Phrase {
        Phrase {
            jp: jp.to_string(),
            en: en.to_string(),
            note: None,
        }
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(matches(&phrase("", ""), ""));
        assert!(matches(&phrase("こんにちは", "Hello"), ""));
    }

    #[test]
    fn match_is_case_insensitive_substring_of_either_field() {
        let p = phrase("お水（みず）をください", "Water, please");
        assert!(matches(&p, "WATER"));
        assert!(matches(&p, "er, pl"));
        assert!(matches(&p, "みず"));
        assert!(!matches(&p, "tea"));
        assert!(!matches(&p, "water please"));
    }

    #[test]
    fn counters_match_on_number() {
        let c = Counter {
            num: "3".to_string(),
            jp: "みっつ".to_string(),
        };
        assert!(matches(&c, "3"));
        assert!(matches(&c, "みっ"));
        assert!(!matches(&c, "4"));
    }

    #[test]
    fn conversation_search_keeps_catalog_order() {
        let catalog = Catalog::embedded().unwrap();
        let query = "ありがとう";

        let expected: Vec<(String, String)> = catalog
            .conversation
            .iter()
            .flat_map(|c| c.items.iter())
            .filter(|p| p.jp.contains(query) || p.en.contains(query))
            .map(|p| (p.jp.clone(), p.en.clone()))
            .collect();

        let found: Vec<(String, String)> =
            filter_sections(catalog.sections(Tab::Conversation), query)
                .iter()
                .flat_map(|s| s.cards.iter())
                .map(|c| (c.jp.to_string(), c.gloss.to_string()))
                .collect();

        assert!(!found.is_empty());
        assert_eq!(found, expected);
        assert!(found.iter().all(|(jp, _)| jp.contains(query)));
    }

    #[test]
    fn sections_without_matches_are_dropped() {
        let catalog = Catalog::embedded().unwrap();
        let sections = filter_sections(catalog.sections(Tab::Restaurant), "check");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Paying");
    }
}
