use std::fmt;
use std::process::ExitStatus;

#[derive(Debug)]
pub enum ExploreError {
    /// Transport binary (adb) failed to spawn
    CommandSpawn { command: String, source: std::io::Error },

    /// Transport command exited with non-zero status
    CommandFailed { command: String, status: ExitStatus, stderr: String },

    /// Transport produced output that could not be decoded
    CommandOutput { command: String, detail: String },

    /// UI hierarchy dump could not be parsed
    DumpParse { context: String, detail: String },

    /// Foreground activity stayed outside the target package after a relaunch
    OutOfApp { package: String, foreground: String },

    /// A session is already running
    SessionConflict,
}

impl fmt::Display for ExploreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExploreError::CommandSpawn { command, source } => {
                write!(f, "Failed to spawn '{}' (is adb on PATH?): {}", command, source)
            }
            ExploreError::CommandFailed { command, status, stderr } => {
                write!(f, "'{}' exited with {}: {}", command, status, stderr)
            }
            ExploreError::CommandOutput { command, detail } => {
                write!(f, "Unreadable output from '{}': {}", command, detail)
            }
            ExploreError::DumpParse { context, detail } => {
                write!(f, "UI dump parse error ({}): {}", context, detail)
            }
            ExploreError::OutOfApp { package, foreground } => {
                write!(
                    f,
                    "Left target package '{}' (foreground is '{}') and relaunch did not recover",
                    package, foreground
                )
            }
            ExploreError::SessionConflict => {
                write!(f, "An exploration session is already running")
            }
        }
    }
}

impl std::error::Error for ExploreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExploreError::CommandSpawn { source, .. } => Some(source),
            _ => None,
        }
    }
}
