// ============================================
// src/text.rs
// 読み仮名注釈の除去
// ============================================

use std::borrow::Cow;

const OPEN: char = '（';
const CLOSE: char = '）';

/// 全角括弧で囲まれた読み仮名注釈をすべて取り除く
///
/// `一人（ひとり）` → `一人`。コピーと読み上げの前に使う。表示には元の文字列を使うこと。
/// 閉じ括弧が見つからない `（` はそのまま残る。
pub fn strip_annotation(text: &str) -> Cow<'_, str> {
    if !text.contains(OPEN) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len_utf8()..];
        match after_open.find(CLOSE) {
            Some(end) => {
                out.push_str(&rest[..start]);
                rest = &after_open[end + CLOSE.len_utf8()..];
            }
            None => break, // 閉じていない括弧以降は注釈ではない
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}
