use crate::interface::{LaunchError, UrlLauncher};
use std::{
    io,
    process::{Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
};

///
/// SystemLauncher
/// Hands the URL to the platform opener and returns without waiting. The
/// opener is reaped on a detached thread once it exits.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    fn command(url: &str) -> Result<Command, LaunchError> {
        let cmd = if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        } else if cfg!(unix) {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        } else {
            return Err(LaunchError::Unsupported);
        };

        Ok(cmd)
    }

    fn spawn_reaped(mut cmd: Command) -> Result<JoinHandle<io::Result<ExitStatus>>, LaunchError> {
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LaunchError::Spawn(e.to_string()))?;

        Ok(thread::spawn(move || child.wait()))
    }
}

impl UrlLauncher for SystemLauncher {
    fn open_foreground(&self, url: &str) -> Result<(), LaunchError> {
        Self::spawn_reaped(Self::command(url)?).map(drop)
    }
}

///
/// TESTS
///

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn opener_is_waited_on() {
        let reaper = SystemLauncher::spawn_reaped(Command::new("true")).unwrap();
        let status = reaper.join().unwrap().unwrap();

        assert!(status.success());
    }

    #[test]
    fn missing_opener_is_a_spawn_error() {
        let err = SystemLauncher::spawn_reaped(Command::new("/nonexistent/opener")).unwrap_err();

        assert!(matches!(err, LaunchError::Spawn(_)));
    }
}
