//! Prompt langsung di stdin/stdout
//!
//! Fungsi raw-mode (password, line, wait_until) memasang raw mode hanya kalau
//! stdin adalah terminal, lalu mencetak newline setelah terminal dikembalikan.
//!
//! Semua fungsi berbagi satu `Prompt` per proses, sehingga state antar panggilan
//! (`\n` sisa CRLF, byte UTF-8 yang tertunda) tidak hilang.

use std::io::{self, Read, Stdin, Stdout, Write};
use std::sync::{Mutex, PoisonError};

use super::Prompt;
use crate::error::Result;
use crate::input::InputMsg;
use crate::terminal::{self, RawMode};

type ConsolePrompt = Prompt<Stdin, Stdout>;

static CONSOLE: Mutex<Option<ConsolePrompt>> = Mutex::new(None);

/// Jalankan `run` dengan prompt yang tersimpan di `slot`, dibuat oleh `init` saat pertama kali
fn with_shared_prompt<R, W, T>(
    slot: &Mutex<Option<Prompt<R, W>>>,
    init: impl FnOnce() -> Prompt<R, W>,
    run: impl FnOnce(&mut Prompt<R, W>) -> T,
) -> T
where
    R: Read,
    W: Write,
{
    let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    let prompt = guard.get_or_insert_with(init);
    run(prompt)
}

fn with_console<T>(run: impl FnOnce(&mut ConsolePrompt) -> T) -> T {
    with_shared_prompt(&CONSOLE, || Prompt::new(io::stdin(), io::stdout()), run)
}

fn with_raw_terminal<T>(newline: bool, run: impl FnOnce(&mut ConsolePrompt) -> T) -> Result<T> {
    let result = if terminal::is_terminal(terminal::STDIN_FD) {
        let _raw = RawMode::enable(terminal::STDIN_FD)?;
        with_console(run)
    } else {
        with_console(run)
    };

    if newline {
        let mut out = io::stdout();
        writeln!(out)?;
        out.flush()?;
    }

    Ok(result)
}

/// Password dengan mask default "●"
pub fn password(hint: &str, default: &str) -> InputMsg {
    with_raw_terminal(true, |p| p.password(hint, default)).unwrap_or_else(InputMsg::from_error)
}

pub fn password_with_mask(hint: &str, default: &str, mask: &str) -> InputMsg {
    with_raw_terminal(true, |p| p.password_with_mask(hint, default, mask))
        .unwrap_or_else(InputMsg::from_error)
}

/// Line editor raw mode dengan echo
pub fn line(hint: &str, default: &str) -> InputMsg {
    with_raw_terminal(true, |p| p.line(hint, default)).unwrap_or_else(InputMsg::from_error)
}

/// Satu baris cooked dari stdin
pub fn message_box(hint: &str, default: &str) -> InputMsg {
    with_console(|p| p.message_box(hint, default))
}

pub fn yes_no(hint: &str, default: bool) -> Result<bool> {
    with_console(|p| p.yes_no(hint, default))
}

/// Tunggu sampai `trigger` diketik di terminal
pub fn wait_until(hint: &str, trigger: &str, repeat: bool) -> Result<()> {
    with_raw_terminal(false, |p| p.wait_until(hint, trigger, repeat))?
}
