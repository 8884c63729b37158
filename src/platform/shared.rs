use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{ShellOutput, ShellRunner, UrlOpener};
use crate::error::{MmduckError, MmduckResult};

/// Cross-platform URL opening using the `open` crate
pub struct OpenCrateOpener;

#[async_trait]
impl UrlOpener for OpenCrateOpener {
    async fn open_url(&self, url: &str) -> MmduckResult<()> {
        let url = url.to_string();
        tokio::task::spawn_blocking(move || open::that(&url))
            .await
            .map_err(|e| MmduckError::Execution(format!("URL opener task failed: {}", e)))?
            .map_err(|e| MmduckError::Execution(e.to_string()))
    }
}

/// Background `sh -c` with captured output
pub struct SystemShell;

#[async_trait]
impl ShellRunner for SystemShell {
    async fn run(&self, command: &str) -> MmduckResult<ShellOutput> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| MmduckError::Execution(format!("Failed to run command: {}", e)))?;

        Ok(ShellOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
