// ============================================
// src/catalog.rs
// フレーズ・単語・助数詞のカタログ (起動時に一度だけ読み込む、読み取り専用)
// ============================================

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CatalogError;

/// バイナリに同梱するカタログ
const EMBEDDED_CATALOG: &str = include_str!("../data/japanese-phrases.json");

/// 「役に立つ」タブで単語カード扱いにしないカテゴリ
const PHRASE_STYLE_USEFUL_KEYS: [&str; 3] = ["emergency", "transportation", "accommodation"];

// --------------------------------------------------
// レコード
// --------------------------------------------------

/// フレーズ (単語カードも同じ形で、`note` が無いだけ)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    pub jp: String,
    pub en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// 助数詞の一行 (例: "3" / "みっつ")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub num: String,
    pub jp: String,
}

/// データ上で明示できるカードの見た目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStyle {
    Phrase,
    Vocab,
}

/// カテゴリ (キーの順番はJSONのまま)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub key: String,
    /// `{ "style": ..., "items": [...] }` 形式で書かれていた場合のみ `Some`
    pub style: Option<CategoryStyle>,
    pub items: Vec<Phrase>,
}

/// カテゴリ本体は配列そのものか、スタイル付きのオブジェクト
#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryBody {
    Items(Vec<Phrase>),
    Styled {
        style: CategoryStyle,
        items: Vec<Phrase>,
    },
}

/// カテゴリキー → レコード列 (順序保持)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Categories(Vec<Category>);

impl Categories {
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.0.iter()
    }
}

impl TryFrom<Map<String, Value>> for Categories {
    type Error = CatalogError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        // `preserve_order` のおかげで Map の順番 = ファイル上の順番
        map.into_iter()
            .map(|(key, value)| {
                let body: CategoryBody =
                    serde_json::from_value(value).map_err(|source| CatalogError::Category {
                        category: key.clone(),
                        source,
                    })?;
                let (style, items) = match body {
                    CategoryBody::Items(items) => (None, items),
                    CategoryBody::Styled { style, items } => (Some(style), items),
                };
                Ok(Category { key, style, items })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Categories)
    }
}

/// 助数詞セクション (サブキーは固定)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Counters {
    pub general_objects: Vec<Counter>,
    pub people: Vec<Counter>,
    pub flat_objects: Vec<Counter>,
    pub long_objects: Vec<Counter>,
    pub bound_objects: Vec<Counter>,
}

/// 助数詞のグループ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterGroup {
    GeneralObjects,
    People,
    FlatObjects,
    LongObjects,
    BoundObjects,
}

impl CounterGroup {
    pub const ALL: [CounterGroup; 5] = [
        CounterGroup::GeneralObjects,
        CounterGroup::People,
        CounterGroup::FlatObjects,
        CounterGroup::LongObjects,
        CounterGroup::BoundObjects,
    ];

    pub fn title(self) -> &'static str {
        match self {
            CounterGroup::GeneralObjects => "General Objects (〜つ)",
            CounterGroup::People => "People (〜人（にん）)",
            CounterGroup::FlatObjects => "Flat Objects (〜枚（まい）)",
            CounterGroup::LongObjects => "Long Objects (〜本（ほん）)",
            CounterGroup::BoundObjects => "Bound Objects (〜冊（さつ）)",
        }
    }

    pub fn tip(self) -> Option<&'static str> {
        match self {
            CounterGroup::GeneralObjects => {
                Some("Use these for general objects. Press Enter to hear pronunciation!")
            }
            CounterGroup::People => None,
            CounterGroup::FlatObjects => Some("For paper, tickets, plates, shirts, etc."),
            CounterGroup::LongObjects => Some("For bottles, pens, umbrellas, trees, etc."),
            CounterGroup::BoundObjects => Some("For books, magazines, notebooks, etc."),
        }
    }
}

impl Counters {
    pub fn group(&self, group: CounterGroup) -> &[Counter] {
        match group {
            CounterGroup::GeneralObjects => &self.general_objects,
            CounterGroup::People => &self.people,
            CounterGroup::FlatObjects => &self.flat_objects,
            CounterGroup::LongObjects => &self.long_objects,
            CounterGroup::BoundObjects => &self.bound_objects,
        }
    }
}

// --------------------------------------------------
// タブ
// --------------------------------------------------

/// カタログの最上位キー = タブ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Restaurant,
    Shopping,
    Conversation,
    Counters,
    Vocab,
    Useful,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Restaurant,
        Tab::Shopping,
        Tab::Conversation,
        Tab::Counters,
        Tab::Vocab,
        Tab::Useful,
    ];

    /// データファイル上のキー
    pub fn key(self) -> &'static str {
        match self {
            Tab::Restaurant => "restaurant",
            Tab::Shopping => "shopping",
            Tab::Conversation => "conversation",
            Tab::Counters => "counters",
            Tab::Vocab => "vocab",
            Tab::Useful => "useful",
        }
    }

    /// タブ見出し (キーの先頭だけ大文字)
    pub fn title(self) -> &'static str {
        match self {
            Tab::Restaurant => "Restaurant",
            Tab::Shopping => "Shopping",
            Tab::Conversation => "Conversation",
            Tab::Counters => "Counters",
            Tab::Vocab => "Vocab",
            Tab::Useful => "Useful",
        }
    }

    pub fn from_key(key: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|t| t.key() == key)
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// --------------------------------------------------
// 表示用のカードとセクション
// --------------------------------------------------

/// カードの種類 (押したときの動作と見た目が変わる)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    /// 補足 (note) 付きのフレーズカード。Enterでコピー
    Phrase,
    /// 単語カード。Enterでコピー
    Vocab,
    /// 助数詞カード。Enterで読み上げ、お気に入り不可
    Counter,
}

impl From<CategoryStyle> for CardKind {
    fn from(style: CategoryStyle) -> Self {
        match style {
            CategoryStyle::Phrase => CardKind::Phrase,
            CategoryStyle::Vocab => CardKind::Vocab,
        }
    }
}

/// 描画・検索用にカタログを借用した一枚のカード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card<'a> {
    pub kind: CardKind,
    pub jp: &'a str,
    /// フレーズ・単語は英訳、助数詞は数字
    pub gloss: &'a str,
    pub note: Option<&'a str>,
}

impl<'a> Card<'a> {
    pub fn from_phrase(kind: CardKind, phrase: &'a Phrase) -> Self {
        Self {
            kind,
            jp: &phrase.jp,
            gloss: &phrase.en,
            note: phrase.note.as_deref(),
        }
    }

    pub fn from_counter(counter: &'a Counter) -> Self {
        Self {
            kind: CardKind::Counter,
            jp: &counter.jp,
            gloss: &counter.num,
            note: None,
        }
    }
}

/// カテゴリ見出しとカード列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub title: String,
    pub tip: Option<&'static str>,
    pub cards: Vec<Card<'a>>,
}

/// `bound_objects` → `Bound Objects`
pub fn format_category_title(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 「役に立つ」タブのカテゴリを単語カードで出すかどうかの推定
///
/// データに `style` が書かれていないときだけ使う。
pub fn looks_like_vocab(key: &str, items: &[Phrase]) -> bool {
    let Some(first) = items.first() else {
        return false;
    };
    !first.jp.is_empty()
        && !first.en.is_empty()
        && first.note.is_none()
        && !PHRASE_STYLE_USEFUL_KEYS.contains(&key)
}

// --------------------------------------------------
// カタログ本体
// --------------------------------------------------

/// 読み込み済みのカタログ (実行中は変更しない)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    pub restaurant: Categories,
    pub shopping: Categories,
    pub conversation: Categories,
    pub counters: Counters,
    pub vocab: Categories,
    pub useful: Categories,
}

impl Catalog {
    /// 同梱のカタログを読み込む
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// 差し替え用のカタログファイルを読み込む
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        tracing::debug!(
            phrases = catalog.phrase_count(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    fn categories(&self, tab: Tab) -> Option<&Categories> {
        match tab {
            Tab::Restaurant => Some(&self.restaurant),
            Tab::Shopping => Some(&self.shopping),
            Tab::Conversation => Some(&self.conversation),
            Tab::Vocab => Some(&self.vocab),
            Tab::Useful => Some(&self.useful),
            Tab::Counters => None,
        }
    }

    /// タブの中身をセクション単位で返す (フィルタ前)
    pub fn sections(&self, tab: Tab) -> Vec<Section<'_>> {
        let Some(categories) = self.categories(tab) else {
            return CounterGroup::ALL
                .into_iter()
                .map(|group| Section {
                    title: group.title().to_string(),
                    tip: group.tip(),
                    cards: self
                        .counters
                        .group(group)
                        .iter()
                        .map(Card::from_counter)
                        .collect(),
                })
                .collect();
        };

        categories
            .iter()
            .map(|category| {
                let kind = card_kind(tab, category);
                Section {
                    title: format_category_title(&category.key),
                    tip: None,
                    cards: category
                        .items
                        .iter()
                        .map(|phrase| Card::from_phrase(kind, phrase))
                        .collect(),
                }
            })
            .collect()
    }

    /// 全タブのレコード数 (ログ用)
    pub fn phrase_count(&self) -> usize {
        let phrases: usize = [
            &self.restaurant,
            &self.shopping,
            &self.conversation,
            &self.vocab,
            &self.useful,
        ]
        .iter()
        .flat_map(|c| c.iter())
        .map(|c| c.items.len())
        .sum();
        let counters: usize = CounterGroup::ALL
            .iter()
            .map(|g| self.counters.group(*g).len())
            .sum();
        phrases + counters
    }
}

/// カテゴリのカード種別を決める (明示スタイル > タブの既定 > 推定)
fn card_kind(tab: Tab, category: &Category) -> CardKind {
    if let Some(style) = category.style {
        return style.into();
    }
    match tab {
        Tab::Vocab => CardKind::Vocab,
        Tab::Useful if looks_like_vocab(&category.key, &category.items) => CardKind::Vocab,
        _ => CardKind::Phrase,
    }
}
