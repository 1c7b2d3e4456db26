// ============================================
// src/speech.rs
// 読み上げ (同時に流れる発話は最大ひとつ)
// ============================================

use std::process::{Child, Command, Stdio};

/// 読み上げ言語
pub const LANG: &str = "ja-JP";
/// 通常速度に対する倍率 (学習者向けに少し遅く)
pub const RATE: f32 = 0.8;
/// TTSエンジンの標準速度 (words per minute)
const BASE_WPM: f32 = 175.0;

/// 読み上げ先
pub trait Speaker {
    /// 再生中の発話を止めてから読み上げる。使えない環境では何もしない
    fn speak(&mut self, text: &str);
    fn cancel(&mut self);
}

fn words_per_minute() -> u32 {
    (BASE_WPM * RATE).round() as u32
}

/// 読み上げに使う外部コマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechCommand {
    program: String,
    args: Vec<String>,
    /// `Some` なら本文を引数ではなくこの環境変数で渡す
    text_env: Option<&'static str>,
    /// 本文の前に `--` を置く (`-` で始まる本文をオプション扱いさせない)
    end_of_options: bool,
}

impl SpeechCommand {
    /// 本文を最後の引数として渡すコマンド
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            text_env: None,
            end_of_options: false,
        }
    }

    /// 本文の直前で `--` によりオプション解析を打ち切る
    pub fn with_end_of_options(mut self) -> Self {
        self.end_of_options = true;
        self
    }

    /// MARK:OSごとの標準TTS
    pub fn for_platform() -> Option<Self> {
        let wpm = words_per_minute().to_string();

        if cfg!(target_os = "linux") {
            Some(Self::new(
                "espeak",
                vec!["-v".into(), "ja".into(), "-s".into(), wpm],
            )
            .with_end_of_options())
        } else if cfg!(target_os = "macos") {
            Some(Self::new(
                "say",
                vec!["-v".into(), "Kyoko".into(), "-r".into(), wpm],
            )
            .with_end_of_options())
        } else if cfg!(target_os = "windows") {
            // SAPI の Rate は -10..10、0 が標準
            let script = format!(
                "Add-Type -AssemblyName System.Speech; \
                 $s = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
                 try {{ $s.SelectVoiceByHints('NotSet', 'NotSet', 0, [Globalization.CultureInfo]'{LANG}') }} catch {{}}; \
                 $s.Rate = -2; \
                 $s.Speak($env:NIHONGO_SPEECH_TEXT)"
            );
            Some(Self {
                program: "powershell".into(),
                args: vec!["-NoProfile".into(), "-Command".into(), script],
                text_env: Some("NIHONGO_SPEECH_TEXT"),
                end_of_options: false,
            })
        } else {
            None
        }
    }

    fn build(&self, text: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        match self.text_env {
            Some(var) => {
                command.env(var, text);
            }
            None => {
                if self.end_of_options {
                    command.arg("--");
                }
                command.arg(text);
            }
        }
        command
    }
}

/// 外部TTSプロセスで読み上げる
pub struct SystemSpeaker {
    command: Option<SpeechCommand>,
    current: Option<Child>,
}

impl SystemSpeaker {
    pub fn new() -> Self {
        Self::with_command(SpeechCommand::for_platform())
    }

    pub fn with_command(command: Option<SpeechCommand>) -> Self {
        Self {
            command,
            current: None,
        }
    }

    /// 再生中の発話のPID (終わっていれば `None`)
    #[cfg(test)]
    fn in_flight_pid(&mut self) -> Option<u32> {
        let child = self.current.as_mut()?;
        match child.try_wait() {
            Ok(None) => Some(child.id()),
            _ => {
                self.current = None;
                None
            }
        }
    }

    /// 再生が終わるまで待つ (CLIの一回読み上げ用)
    pub fn wait(&mut self) {
        if let Some(mut child) = self.current.take()
            && let Err(e) = child.wait()
        {
            tracing::debug!("waiting for speech failed: {e}");
        }
    }
}

impl Default for SystemSpeaker {
    fn default() -> Self {
        Self::new()
    }
}

impl Speaker for SystemSpeaker {
    fn speak(&mut self, text: &str) {
        self.cancel();

        let Some(command) = &self.command else {
            tracing::debug!("no speech engine on this platform");
            return;
        };

        match command.build(text).spawn() {
            Ok(child) => {
                tracing::debug!(pid = child.id(), lang = LANG, rate = RATE, "speaking");
                self.current = Some(child);
            }
            Err(e) => tracing::debug!(program = %command.program, "speech unavailable: {e}"),
        }
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.current.take() {
            if let Ok(None) = child.try_wait()
                && let Err(e) = child.kill()
            {
                tracing::debug!(pid = child.id(), "stopping speech failed: {e}");
            }
            // ゾンビを残さない
            if let Err(e) = child.wait() {
                tracing::debug!(pid = child.id(), "reaping speech process failed: {e}");
            }
        }
    }
}

impl Drop for SystemSpeaker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// `--no-speech` 用
#[derive(Debug, Default)]
pub struct MuteSpeaker;

impl Speaker for MuteSpeaker {
    fn speak(&mut self, _text: &str) {}
    fn cancel(&mut self) {}
}
