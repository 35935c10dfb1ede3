//! Prompt engine
//!
//! Generic atas `Read` + `Write`, jadi bisa dijalankan di atas stdin/stdout
//! (lihat `console`) maupun di atas `ByteReader` dari `pipe()`.
//!
//! Fitur:
//! - Password dengan mask
//! - Line editor dengan echo dan backspace
//! - Line biasa (cooked), yes/no
//! - Tunggu sampai sequence tombol tertentu diketik

mod console;
mod keys;

pub use console::{line, message_box, password, password_with_mask, wait_until, yes_no};

use std::io::{Read, Write};
use std::time::Duration;

use log::debug;

use crate::error::{Error, Result};
use crate::input::InputMsg;
use keys::KeyReader;

const ENTER: char = '\r';
const NEWLINE: char = '\n';
const BACKSPACE: char = '\u{8}';
const DELETE: char = '\u{7f}';

/// Prompt configuration
#[derive(Debug, Clone)]
pub struct PromptConfig {
    /// Karakter pengganti untuk `password`
    pub mask: String,
    /// Jeda sebelum membaca ulang input yang `WouldBlock`
    pub poll_interval: Duration,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            mask: "●".to_string(),
            poll_interval: Duration::from_millis(1),
        }
    }
}

/// Cara menampilkan teks yang sedang diketik
#[derive(Clone, Copy)]
enum Echo<'a> {
    Plain,
    Mask(&'a str),
}

pub struct Prompt<R, W> {
    keys: KeyReader<R>,
    output: W,
    config: PromptConfig,
    // `\n` tepat setelah Enter (`\r`) diabaikan
    swallow_lf: bool,
}

impl<R: Read, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self::with_config(input, output, PromptConfig::default())
    }

    pub fn with_config(input: R, output: W, config: PromptConfig) -> Self {
        Self {
            keys: KeyReader::new(input, config.poll_interval),
            output,
            config,
            swallow_lf: false,
        }
    }

    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    pub fn into_inner(self) -> (R, W) {
        (self.keys.into_inner(), self.output)
    }

    fn next_key(&mut self) -> Result<char> {
        let mut key = self.keys.read_char();
        if std::mem::take(&mut self.swallow_lf) && matches!(key, Ok(NEWLINE)) {
            key = self.keys.read_char();
        }
        if let Err(Error::EndOfStream) = key {
            debug!("prompt input reached end of stream");
        }
        key
    }

    fn print_hint(&mut self, hint: &str) -> Result<()> {
        if !hint.is_empty() {
            self.output.write_all(hint.as_bytes())?;
            self.output.flush()?;
        }
        Ok(())
    }

    /// Password, setiap karakter ditampilkan sebagai `config.mask`
    pub fn password(&mut self, hint: &str, default: &str) -> InputMsg {
        let mask = self.config.mask.clone();
        self.edit(hint, default, Echo::Mask(&mask)).into()
    }

    pub fn password_with_mask(&mut self, hint: &str, default: &str, mask: &str) -> InputMsg {
        self.edit(hint, default, Echo::Mask(mask)).into()
    }

    /// Line editor raw mode yang menampilkan teks apa adanya
    pub fn line(&mut self, hint: &str, default: &str) -> InputMsg {
        self.edit(hint, default, Echo::Plain).into()
    }

    fn edit(&mut self, hint: &str, default: &str, echo: Echo<'_>) -> Result<String> {
        self.print_hint(hint)?;

        // Hint multi-baris: hanya baris terakhir yang digambar ulang
        let hint = match hint.rfind('\n') {
            Some(pos) => hint[pos..].trim(),
            None => hint,
        };

        let mut text: Vec<char> = Vec::new();
        loop {
            let key = self.next_key()?;
            match key {
                ENTER | NEWLINE => {
                    self.swallow_lf = key == ENTER;
                    let value: String = text.iter().collect();
                    return Ok(value_or_default(&value, default));
                }
                BACKSPACE | DELETE => {
                    text.pop();
                    let blank = text.len() + 2 + hint.chars().count();
                    write!(self.output, "\r{}", " ".repeat(blank))?;
                }
                c => text.push(c),
            }

            write!(self.output, "\r{}", hint)?;
            match echo {
                Echo::Plain => {
                    let shown: String = text.iter().collect();
                    self.output.write_all(shown.as_bytes())?;
                }
                Echo::Mask(mask) => {
                    self.output.write_all(mask.repeat(text.len()).as_bytes())?;
                }
            }
            self.output.flush()?;
        }
    }

    /// Satu baris cooked sampai `\n`, tanpa editing.
    ///
    /// Input yang habis sebelum `\n` menjadi `EndOfStream`.
    pub fn message_box(&mut self, hint: &str, default: &str) -> InputMsg {
        self.read_line(hint, default).into()
    }

    fn read_line(&mut self, hint: &str, default: &str) -> Result<String> {
        self.print_hint(hint)?;

        let mut value = String::new();
        loop {
            match self.next_key()? {
                NEWLINE => return Ok(value_or_default(&value, default)),
                c => value.push(c),
            }
        }
    }

    /// Ulangi `message_box` sampai jawabannya diawali Y atau N.
    /// Input kosong mengembalikan `default`.
    pub fn yes_no(&mut self, hint: &str, default: bool) -> Result<bool> {
        loop {
            let answer = self.message_box(hint, "").string()?;
            match answer.chars().next().map(|c| c.to_ascii_uppercase()) {
                None => return Ok(default),
                Some('Y') => return Ok(true),
                Some('N') => return Ok(false),
                Some(_) => continue,
            }
        }
    }

    /// Konsumsi input sampai `trigger` diketik berurutan.
    ///
    /// `trigger` kosong: tombol apa pun. Salah ketik mempertahankan bagian yang masih cocok;
    /// dengan `repeat`, hint dicetak ulang di baris baru.
    pub fn wait_until(&mut self, hint: &str, trigger: &str, repeat: bool) -> Result<()> {
        self.print_hint(hint)?;

        let trigger: Vec<char> = trigger.chars().collect();
        if trigger.is_empty() {
            self.next_key()?;
            return Ok(());
        }

        let prefix = prefix_table(&trigger);
        let mut matched = 0;
        loop {
            let key = self.next_key()?;
            if key == trigger[matched] {
                matched += 1;
                if matched == trigger.len() {
                    return Ok(());
                }
                continue;
            }

            // Mundur ke prefix terpanjang yang masih cocok (KMP)
            while matched > 0 && key != trigger[matched] {
                matched = prefix[matched - 1];
            }
            if key == trigger[matched] {
                matched += 1;
            }

            if repeat && !hint.is_empty() {
                write!(self.output, "\r\n{}", hint)?;
                self.output.flush()?;
            }
        }
    }
}

/// `prefix[i]`: panjang proper prefix terpanjang dari `pattern[..=i]` yang juga suffix-nya
fn prefix_table(pattern: &[char]) -> Vec<usize> {
    let mut prefix = vec![0; pattern.len()];
    let mut k = 0;
    for i in 1..pattern.len() {
        while k > 0 && pattern[i] != pattern[k] {
            k = prefix[k - 1];
        }
        if pattern[i] == pattern[k] {
            k += 1;
        }
        prefix[i] = k;
    }
    prefix
}

fn value_or_default(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{pipe, ByteReader, Source};
    use std::thread;

    /// Prompt di atas pipe yang sudah berisi `input` dan sudah finish
    fn scripted(input: &str) -> Prompt<ByteReader, Vec<u8>> {
        let (writer, reader) = pipe(256).unwrap();
        assert_eq!(writer.write_block(input.as_bytes()).count, input.len());
        drop(writer);
        Prompt::new(reader, Vec::new())
    }

    fn output(prompt: Prompt<ByteReader, Vec<u8>>) -> String {
        String::from_utf8(prompt.into_inner().1).unwrap()
    }

    #[test]
    fn test_password_masks_and_trims() {
        let mut prompt = scripted(" abc \r");
        let msg = prompt.password("pw: ", "dflt");
        assert_eq!(msg.string().unwrap(), "abc");

        let out = output(prompt);
        assert!(out.starts_with("pw: "));
        assert!(out.ends_with("\rpw: ●●●●●"));
        assert!(!out.contains("abc"));
    }

    #[test]
    fn test_custom_mask() {
        let mut prompt = scripted("xy\r");
        let msg = prompt.password_with_mask("", "", "*");
        assert_eq!(msg.string().unwrap(), "xy");
        assert_eq!(output(prompt), "\r*\r**");
    }

    #[test]
    fn test_empty_input_uses_default() {
        let mut prompt = scripted("   \r");
        assert_eq!(prompt.line("name: ", "guest").string().unwrap(), "guest");
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut prompt = scripted("abx\u{8}c\u{7f}\u{7f}d\r");
        let msg = prompt.line("", "");
        assert_eq!(msg.string().unwrap(), "ad");

        // Setelah backspace pertama: sisa "ab", blank = 2 + 2 + 0
        let out = output(prompt);
        assert!(out.contains("\r    \rab"));
    }

    #[test]
    fn test_multiline_hint_redraws_last_line() {
        let mut prompt = scripted("k\r");
        prompt.line("Welcome\n  key: ", "");
        let out = output(prompt);
        assert_eq!(out, "Welcome\n  key: \rkey:k");
    }

    #[test]
    fn test_crlf_is_one_enter() {
        let mut prompt = scripted("one\r\ntwo\r");
        assert_eq!(prompt.line("", "").string().unwrap(), "one");
        assert_eq!(prompt.line("", "").string().unwrap(), "two");
    }

    #[test]
    fn test_end_of_stream_ends_prompt() {
        let mut prompt = scripted("partial");
        let msg = prompt.password("", "");
        assert!(msg.err().unwrap().is_end_of_stream());
    }

    #[test]
    fn test_message_box_reads_cooked_line() {
        let mut prompt = scripted("  42 \nrest\n");
        let msg = prompt.message_box("n? ", "0");
        assert_eq!(msg.int().unwrap(), 42);
        assert_eq!(prompt.message_box("", "").string().unwrap(), "rest");
        assert_eq!(output(prompt), "n? ");
    }

    #[test]
    fn test_yes_no() {
        let mut prompt = scripted("maybe\nyes\n\nNo\n");
        assert!(prompt.yes_no("ok? ", false).unwrap());
        assert!(prompt.yes_no("ok? ", false).is_ok_and(|v| !v));
        assert!(!prompt.yes_no("ok? ", true).unwrap());
        assert!(prompt.yes_no("ok? ", true).unwrap_err().is_end_of_stream());
    }

    #[test]
    fn test_yes_no_empty_returns_default() {
        let mut prompt = scripted("\n");
        assert!(prompt.yes_no("", true).unwrap());
    }

    #[test]
    fn test_wait_until_sequence() {
        let mut prompt = scripted("xqquitz");
        prompt.wait_until("type quit", "quit", false).unwrap();
        // 'z' belum dikonsumsi
        assert_eq!(prompt.line("", "").err().map(Error::is_end_of_stream), Some(true));
    }

    #[test]
    fn test_wait_until_repeats_hint() {
        let mut prompt = scripted("ab");
        prompt.wait_until(">", "b", true).unwrap();
        assert_eq!(output(prompt), ">\r\n>");
    }

    #[test]
    fn test_wait_until_overlapping_trigger() {
        let mut prompt = scripted("aaab");
        prompt.wait_until("", "aab", false).unwrap();

        let mut prompt = scripted("abababc!");
        prompt.wait_until("", "ababc", false).unwrap();
        assert_eq!(prompt.line("", "").err().map(Error::is_end_of_stream), Some(true));
    }

    #[test]
    fn test_prefix_table() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(prefix_table(&chars("aab")), vec![0, 1, 0]);
        assert_eq!(prefix_table(&chars("ababc")), vec![0, 0, 1, 2, 0]);
        assert_eq!(prefix_table(&chars("quit")), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_wait_until_any_key() {
        let mut prompt = scripted("z");
        prompt.wait_until("", "", false).unwrap();

        let mut prompt = scripted("");
        assert!(prompt.wait_until("", "", false).unwrap_err().is_end_of_stream());
    }

    #[test]
    fn test_prompt_waits_for_slow_producer() {
        let (writer, reader) = pipe(4).unwrap();

        let typist = thread::spawn(move || {
            for key in "secret\r".bytes() {
                thread::sleep(Duration::from_millis(2));
                assert_eq!(writer.write_block(&[key]).count, 1);
            }
        });

        let mut prompt = Prompt::new(reader, Vec::new());
        let msg = prompt.password("", "");
        typist.join().unwrap();
        assert_eq!(msg.string().unwrap(), "secret");
    }
}
