//! Unix PTY allocation.
//!
//! The master side is put in non-blocking mode and registered with tokio so
//! the capture loop can await output without tying up the thread.

use std::io;
use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};
use std::path::Path;

use rustix::fs::{Mode, OFlags, fcntl_setfl, open};
use rustix::pty::{OpenptFlags, grantpt, openpt, ptsname, unlockpt};
use rustix::termios::{Winsize, tcsetwinsize};
use tokio::io::unix::AsyncFd;

use crate::config::WindowSize;
use crate::error::{PtyError, Result, errno};

/// Read chunk size for the master side.
const READ_CHUNK: usize = 4096;

/// The master side of a Unix pseudo-terminal.
pub struct PtyMaster {
    async_fd: AsyncFd<OwnedFd>,
}

impl std::fmt::Debug for PtyMaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyMaster")
            .field("fd", &self.async_fd.as_raw_fd())
            .finish()
    }
}

impl PtyMaster {
    /// Allocate a new PTY pair.
    ///
    /// Returns the master and an open descriptor for the slave side. The
    /// slave descriptor is close-on-exec; callers hand duplicates of it to
    /// the child as stdio and drop the original once the child is running.
    ///
    /// Must be called from within a tokio runtime with I/O enabled.
    pub fn open() -> Result<(Self, OwnedFd)> {
        let master_fd = openpt(OpenptFlags::RDWR | OpenptFlags::NOCTTY)
            .map_err(|e| PtyError::Create(errno(e)))?;
        grantpt(&master_fd).map_err(|e| PtyError::Create(errno(e)))?;
        unlockpt(&master_fd).map_err(|e| PtyError::Create(errno(e)))?;

        let slave_name =
            ptsname(&master_fd, Vec::new()).map_err(|e| PtyError::Create(errno(e)))?;
        let slave_path = slave_name.to_str().map_err(|_| {
            PtyError::Create(io::Error::new(
                io::ErrorKind::InvalidData,
                "invalid slave path encoding",
            ))
        })?;
        let slave_fd = open(
            Path::new(slave_path),
            OFlags::RDWR | OFlags::NOCTTY | OFlags::CLOEXEC,
            Mode::empty(),
        )
        .map_err(|e| PtyError::Create(errno(e)))?;

        fcntl_setfl(&master_fd, OFlags::NONBLOCK).map_err(|e| PtyError::Create(errno(e)))?;
        let async_fd = AsyncFd::new(master_fd).map_err(PtyError::Create)?;

        Ok((Self { async_fd }, slave_fd))
    }

    /// Set the window size seen by the child.
    pub fn set_window_size(&self, size: WindowSize) -> Result<()> {
        let winsize = Winsize {
            ws_col: size.cols,
            ws_row: size.rows,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        tcsetwinsize(self.async_fd.get_ref(), winsize).map_err(|e| PtyError::Resize(errno(e)))
    }

    /// Read one chunk of output.
    ///
    /// Returns `Ok(0)` at end of output. Linux reports a hung-up slave as
    /// `EIO` rather than a zero-length read, so that is mapped to EOF too.
    pub async fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let mut guard = self.async_fd.readable().await?;
            match guard.try_io(|inner| rustix::io::read(inner.get_ref(), &mut *buf).map_err(errno)) {
                Ok(Ok(n)) => return Ok(n),
                Ok(Err(e)) if e.raw_os_error() == Some(libc::EIO) => return Ok(0),
                Ok(Err(e)) => return Err(e),
                Err(_would_block) => {}
            }
        }
    }

    /// Read until every holder of the slave side has closed it.
    pub async fn read_to_end(&self) -> io::Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = self.read(&mut chunk).await?;
            if n == 0 {
                return Ok(output);
            }
            output.extend_from_slice(&chunk[..n]);
        }
    }
}

impl AsRawFd for PtyMaster {
    fn as_raw_fd(&self) -> RawFd {
        self.async_fd.as_raw_fd()
    }
}
