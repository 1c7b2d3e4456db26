// ============================================
// src/clipboard.rs
// クリップボードへの書き込み (結果は待たない)
// ============================================

use arboard::Clipboard;

/// コピー先
pub trait ClipboardSink {
    /// 失敗しても呼び出し側には何も返さない
    fn copy(&mut self, text: &str);
}

/// OSのクリップボード
///
/// X11 ではハンドルを捨てると内容も消えるので、セッション中は保持し続ける。
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy(&mut self, text: &str) {
        if self.inner.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.inner = Some(clipboard),
                Err(e) => {
                    tracing::debug!("clipboard unavailable: {e}");
                    return;
                }
            }
        }

        if let Some(clipboard) = self.inner.as_mut()
            && let Err(e) = clipboard.set_text(text.to_string())
        {
            tracing::debug!("clipboard write failed: {e}");
        }
    }
}

/// 書き込んだ内容を覚えておくだけのクリップボード
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Vec<String>,
}

#[cfg(test)]
impl ClipboardSink for MemoryClipboard {
    fn copy(&mut self, text: &str) {
        self.contents.push(text.to_string());
    }
}
