//! Platform abstraction layer.
//!
//! Each OS mechanism the engine relies on sits behind its own trait so the
//! engine can be assembled from real implementations or from test doubles.
//! The automation implementations target macOS (`osascript`, `open`,
//! Terminal.app); on other systems they fail and report why.

mod macos;
mod shared;

pub use macos::{AppleScriptActivation, OpenApplication, TerminalApp};
pub use shared::{OpenCrateOpener, SystemShell};

use async_trait::async_trait;

use crate::error::MmduckResult;

/// What a successful launch attempt reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub message: String,
    pub stdout: Option<String>,
}

/// Captured result of a finished shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Open URLs with the system default handler
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open_url(&self, url: &str) -> MmduckResult<()>;
}

/// One way of bringing an application up. Strategies are tried in order.
#[async_trait]
pub trait LaunchStrategy: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn attempt(&self, target: &str) -> MmduckResult<LaunchOutcome>;
}

/// Run a command line in a visible, interactive terminal
#[async_trait]
pub trait TerminalRunner: Send + Sync {
    /// Returns whatever the terminal automation printed.
    async fn run_visible(&self, command_line: &str) -> MmduckResult<String>;
}

/// Run a command line in the background and capture its output
#[async_trait]
pub trait ShellRunner: Send + Sync {
    async fn run(&self, command: &str) -> MmduckResult<ShellOutput>;
}

/// Aggregate struct holding all platform-specific implementations
pub struct Platform {
    pub opener: Box<dyn UrlOpener>,
    /// Application strategies, most specific first
    pub launchers: Vec<Box<dyn LaunchStrategy>>,
    pub terminal: Box<dyn TerminalRunner>,
    pub shell: Box<dyn ShellRunner>,
}

impl Platform {
    /// The real implementations: activate via AppleScript, then fall back to
    /// `open -a`.
    pub fn current() -> Self {
        Self {
            opener: Box::new(OpenCrateOpener),
            launchers: vec![Box::new(AppleScriptActivation), Box::new(OpenApplication)],
            terminal: Box::new(TerminalApp),
            shell: Box::new(SystemShell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_tries_activation_before_open() {
        let platform = Platform::current();
        let names: Vec<&str> = platform.launchers.iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["applescript-activate", "open-application"]);
    }

    #[test]
    fn test_shell_output_success_requires_zero_exit() {
        let mut output = ShellOutput {
            code: Some(0),
            stdout: String::new(),
            stderr: "noise".to_string(),
        };
        assert!(output.success());

        output.code = Some(2);
        assert!(!output.success());

        output.code = None;
        assert!(!output.success());
    }
}
