//! macOS automation.
//!
//! - `osascript` to activate applications and drive Terminal.app
//! - `open -a` as the generic application opener

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{LaunchOutcome, LaunchStrategy, TerminalRunner};
use crate::error::{MmduckError, MmduckResult};

/// Bring an application to the front, launching it if it isn't running.
///
/// Fails for applications that are not scriptable.
pub struct AppleScriptActivation;

#[async_trait]
impl LaunchStrategy for AppleScriptActivation {
    fn name(&self) -> &'static str {
        "applescript-activate"
    }

    async fn attempt(&self, target: &str) -> MmduckResult<LaunchOutcome> {
        let script = format!(r#"tell application "{}" to activate"#, applescript_escape(target));
        let stdout = run_osascript(&script).await?;
        Ok(LaunchOutcome {
            message: format!("activated application: {}", target),
            stdout: Some(stdout),
        })
    }
}

/// `open -a <name>`. Works for more applications, but may not raise a
/// running instance.
pub struct OpenApplication;

#[async_trait]
impl LaunchStrategy for OpenApplication {
    fn name(&self) -> &'static str {
        "open-application"
    }

    async fn attempt(&self, target: &str) -> MmduckResult<LaunchOutcome> {
        let output = Command::new("open")
            .args(["-a", target])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| MmduckError::Execution(format!("Failed to run open: {}", e)))?;

        if !output.status.success() {
            return Err(MmduckError::Execution(format!(
                "open -a exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(LaunchOutcome {
            message: format!("launched application: {}", target),
            stdout: None,
        })
    }
}

/// Terminal.app via `do script`
pub struct TerminalApp;

#[async_trait]
impl TerminalRunner for TerminalApp {
    async fn run_visible(&self, command_line: &str) -> MmduckResult<String> {
        let script = format!(
            "tell application \"Terminal\"\n    activate\n    do script \"{}\"\nend tell",
            applescript_escape(command_line)
        );
        run_osascript(&script).await
    }
}

/// Run an AppleScript and return its trimmed stdout.
async fn run_osascript(script: &str) -> MmduckResult<String> {
    let output = Command::new("osascript")
        .args(["-e", script])
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| MmduckError::Execution(format!("Failed to run osascript: {}", e)))?;

    if !output.status.success() {
        return Err(MmduckError::Execution(format!(
            "osascript exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Escape text for use inside an AppleScript string literal.
fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
