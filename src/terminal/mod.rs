//! Terminal control
//!
//! Hanya yang dibutuhkan prompt: deteksi tty dan raw mode.

mod raw_mode;

pub use raw_mode::RawMode;

/// fd stdin
#[cfg(unix)]
pub const STDIN_FD: std::os::unix::io::RawFd = libc::STDIN_FILENO;
#[cfg(not(unix))]
pub const STDIN_FD: i32 = 0;

/// `true` jika `fd` adalah terminal
#[cfg(unix)]
pub fn is_terminal(fd: std::os::unix::io::RawFd) -> bool {
    // SAFETY: isatty hanya membaca fd
    unsafe { libc::isatty(fd) == 1 }
}

#[cfg(not(unix))]
pub fn is_terminal(_fd: i32) -> bool {
    use std::io::IsTerminal;
    std::io::stdin().is_terminal()
}
