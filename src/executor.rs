//! Shortcut execution: picks a strategy for the shortcut type and runs it,
//! always coming back with an [`ExecutionResult`].

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::config::ShortcutType;
use crate::error::{MmduckError, MmduckResult};
use crate::platform::{
    LaunchOutcome, LaunchStrategy, Platform, ShellRunner, TerminalRunner, UrlOpener,
};

/// Prefix of every temporary script file.
pub const SCRIPT_PREFIX: &str = "mmduck_script_";

static SCRIPT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Normalized outcome of running a shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl ExecutionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            stdout: None,
            stderr: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            stdout: None,
            stderr: None,
        }
    }

    pub fn with_stdout(mut self, stdout: Option<String>) -> Self {
        self.stdout = stdout;
        self
    }

    pub fn with_stderr(mut self, stderr: Option<String>) -> Self {
        self.stderr = stderr;
        self
    }
}

impl From<MmduckError> for ExecutionResult {
    fn from(err: MmduckError) -> Self {
        ExecutionResult::failure(err.to_string())
    }
}

/// The execution strategy for a shortcut type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    OpenUrl,
    LaunchApplication,
    RunScriptInTerminal,
    RunShell,
}

/// Map a shortcut type to the strategy that runs it.
pub fn resolve(kind: ShortcutType) -> Strategy {
    match kind {
        ShortcutType::Url => Strategy::OpenUrl,
        ShortcutType::Application => Strategy::LaunchApplication,
        ShortcutType::Script => Strategy::RunScriptInTerminal,
        ShortcutType::Other => Strategy::RunShell,
    }
}

/// Ordered launch strategies, tried until one succeeds.
pub struct StrategyChain {
    strategies: Vec<Box<dyn LaunchStrategy>>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Box<dyn LaunchStrategy>>) -> Self {
        Self { strategies }
    }

    pub async fn run(&self, target: &str) -> MmduckResult<LaunchOutcome> {
        for strategy in &self.strategies {
            match strategy.attempt(target).await {
                Ok(outcome) => {
                    tracing::info!(strategy = strategy.name(), app = target, "{}", outcome.message);
                    return Ok(outcome);
                }
                Err(e) => {
                    tracing::warn!(strategy = strategy.name(), app = target, "Launch attempt failed: {}", e);
                }
            }
        }

        Err(MmduckError::Execution(format!("cannot start application: {}", target)))
    }
}

/// A script written to a temp file.
///
/// The file is removed on drop unless [`TempScript::hand_off`] passed it on to
/// something that deletes it itself.
#[derive(Debug)]
pub struct TempScript {
    path: PathBuf,
    owned: bool,
}

impl TempScript {
    /// Write `body` to a new, executable file in `dir`.
    pub fn create(dir: &Path, body: &str) -> MmduckResult<Self> {
        let temp_err = |e: std::io::Error| {
            MmduckError::TempResource(format!("cannot create temporary script file: {}", e))
        };

        loop {
            let path = dir.join(unique_script_name());
            let mut options = OpenOptions::new();
            options.write(true).create_new(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o755);
            }

            let mut file = match options.open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(temp_err(e)),
            };

            // From here on the file exists, so drop cleans it up on error.
            let script = Self { path, owned: true };
            file.write_all(body.as_bytes()).map_err(temp_err)?;
            return Ok(script);
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Give up ownership; the file is left in place.
    pub fn hand_off(mut self) -> PathBuf {
        self.owned = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for TempScript {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Failed to remove temporary script: {}", e);
            }
        }
    }
}

fn unique_script_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = SCRIPT_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}{}_{}_{}.sh", SCRIPT_PREFIX, nanos, std::process::id(), seq)
}

/// Single-quote `text` for sh.
fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// The line the terminal runs: make executable, run, delete.
pub fn terminal_command_line(script: &Path) -> String {
    let path = shell_quote(&script.to_string_lossy());
    format!("chmod +x {path} && {path} && rm -f {path}")
}

/// Runs shortcut commands against a set of platform capabilities.
pub struct ExecutionEngine {
    opener: Box<dyn UrlOpener>,
    applications: StrategyChain,
    terminal: Box<dyn TerminalRunner>,
    shell: Box<dyn ShellRunner>,
    script_dir: PathBuf,
}

impl ExecutionEngine {
    pub fn new(platform: Platform) -> Self {
        Self {
            opener: platform.opener,
            applications: StrategyChain::new(platform.launchers),
            terminal: platform.terminal,
            shell: platform.shell,
            script_dir: std::env::temp_dir(),
        }
    }

    /// Engine wired to the real OS mechanisms.
    pub fn current() -> Self {
        Self::new(Platform::current())
    }

    /// Write temporary scripts into `dir` instead of the OS temp directory.
    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = dir.into();
        self
    }

    pub async fn execute(&self, command: &str, kind: ShortcutType) -> ExecutionResult {
        let strategy = resolve(kind);
        tracing::debug!(?strategy, %kind, "Resolved execution strategy");

        match strategy {
            Strategy::OpenUrl => self.open_url(command).await,
            Strategy::LaunchApplication => self.launch_application(command).await,
            Strategy::RunScriptInTerminal => self.run_script(command).await,
            Strategy::RunShell => self.run_shell(command).await,
        }
    }

    async fn open_url(&self, command: &str) -> ExecutionResult {
        if let Err(e) = url::Url::parse(command) {
            return MmduckError::InvalidUrl {
                url: command.to_string(),
                reason: e.to_string(),
            }
            .into();
        }

        match self.opener.open_url(command).await {
            Ok(()) => {
                tracing::info!(url = command, "Opened URL");
                ExecutionResult::ok(format!("opened URL: {}", command))
            }
            Err(e) => {
                tracing::error!(url = command, "Failed to open URL: {}", e);
                ExecutionResult::failure(e.to_string())
            }
        }
    }

    async fn launch_application(&self, command: &str) -> ExecutionResult {
        let target = shellexpand::tilde(command);
        match self.applications.run(&target).await {
            Ok(outcome) => ExecutionResult::ok(outcome.message).with_stdout(outcome.stdout),
            Err(e) => {
                tracing::error!(application = command, "{}", e);
                e.into()
            }
        }
    }

    async fn run_script(&self, command: &str) -> ExecutionResult {
        let script = match TempScript::create(&self.script_dir, command) {
            Ok(script) => script,
            Err(e) => {
                tracing::error!("{}", e);
                return e.into();
            }
        };

        let command_line = terminal_command_line(script.path());
        match self.terminal.run_visible(&command_line).await {
            Ok(stdout) => {
                let path = script.hand_off();
                tracing::info!(path = %path.display(), "Script handed to terminal");
                ExecutionResult::ok("script is running in the terminal").with_stdout(Some(stdout))
            }
            Err(e) => {
                tracing::error!(path = %script.path().display(), "Terminal launch failed: {}", e);
                drop(script);
                ExecutionResult::failure(format!("cannot run script in terminal: {}", e))
            }
        }
    }

    async fn run_shell(&self, command: &str) -> ExecutionResult {
        let output = match self.shell.run(command).await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(command, "{}", e);
                return e.into();
            }
        };

        if !output.success() {
            let status = output
                .code
                .map(|c| format!("exit code {}", c))
                .unwrap_or_else(|| "a signal".to_string());
            let mut error = format!("command failed with {}", status);
            if !output.stderr.is_empty() {
                error.push_str(": ");
                error.push_str(&output.stderr);
            }
            tracing::error!(command, "{}", error);
            return ExecutionResult::failure(error);
        }

        if !output.stderr.is_empty() {
            tracing::warn!(command, stderr = %output.stderr, "Command wrote to stderr");
        }

        ExecutionResult::ok("command executed successfully")
            .with_stdout(Some(output.stdout))
            .with_stderr(Some(output.stderr))
    }
}
