//! Raw mode guard berbasis termios
//!
//! `RawMode::enable` menyimpan termios lama, memasang `cfmakeraw`,
//! dan mengembalikannya saat guard di-drop.

#[cfg(unix)]
use std::io;
#[cfg(unix)]
use std::os::unix::io::RawFd;

use log::debug;
#[cfg(unix)]
use log::warn;

use crate::error::Result;

/// Terminal dikembalikan ke mode semula saat guard ini di-drop
#[cfg(unix)]
pub struct RawMode {
    fd: RawFd,
    original: libc::termios,
}

#[cfg(unix)]
impl RawMode {
    /// Masuk raw mode pada `fd`
    pub fn enable(fd: RawFd) -> Result<Self> {
        // SAFETY: termios adalah POD, tcgetattr mengisi seluruh struct
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
            return Err(io::Error::last_os_error().into());
        }

        let mut raw = original;
        // SAFETY: raw adalah salinan termios yang valid
        unsafe { libc::cfmakeraw(&mut raw) };

        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error().into());
        }

        debug!("raw mode enabled on fd {}", fd);
        Ok(Self { fd, original })
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        // SAFETY: original berasal dari tcgetattr pada fd yang sama
        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &self.original) } != 0 {
            warn!(
                "failed to restore terminal on fd {}: {}",
                self.fd,
                io::Error::last_os_error()
            );
        } else {
            debug!("terminal restored on fd {}", self.fd);
        }
    }
}

/// Platform tanpa termios: guard kosong
#[cfg(not(unix))]
pub struct RawMode {
    _private: (),
}

#[cfg(not(unix))]
impl RawMode {
    pub fn enable(_fd: i32) -> Result<Self> {
        debug!("raw mode not supported on this platform, input stays cooked");
        Ok(Self { _private: () })
    }
}
