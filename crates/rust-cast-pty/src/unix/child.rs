//! Spawning a shell on the slave side of a PTY.

use std::io;
use std::os::unix::io::OwnedFd;
use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::config::PtyConfig;
use crate::error::{PtyError, Result};

/// Spawn `<shell> -c <command>` with the slave PTY as its controlling
/// terminal and stdio.
///
/// The command string is handed to the shell unchanged, so quoting,
/// pipes and redirections keep their shell meaning.
pub fn spawn_in_pty(slave: &OwnedFd, command: &str, config: &PtyConfig) -> Result<Child> {
    let stdio = || -> Result<Stdio> {
        let fd = slave.try_clone().map_err(PtyError::Spawn)?;
        Ok(Stdio::from(fd))
    };

    let mut cmd = Command::new(&config.shell);
    cmd.arg("-c").arg(command);
    cmd.stdin(stdio()?).stdout(stdio()?).stderr(stdio()?);

    // SAFETY: setsid and ioctl are async-signal-safe. By the time pre_exec
    // hooks run, fd 0 is already the slave.
    #[allow(unsafe_code)]
    unsafe {
        cmd.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(io::Error::last_os_error());
            }
            if libc::ioctl(0, libc::TIOCSCTTY, 0) == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }

    cmd.spawn().map_err(PtyError::Spawn)
}
