//! bosh-init child process invocation
//!
//! Writes the manifest and SSH key into the working directory, runs the
//! external `bosh-init` binary, streams its status output line-by-line to
//! the logger, and surfaces a nonzero exit with the buffered stderr
//! verbatim. bosh-init keeps its own `bosh-state.json` next to the
//! manifest, which is why the working directory is the bbl state directory.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use bbl_core::{CoreError, Logger};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

const MANIFEST_FILE: &str = "bosh.yml";
const PRIVATE_KEY_FILE: &str = "bosh.pem";

pub struct BoshInitRunner {
    dir: PathBuf,
    logger: Arc<dyn Logger>,
}

impl BoshInitRunner {
    pub fn new(dir: impl Into<PathBuf>, logger: Arc<dyn Logger>) -> Self {
        Self {
            dir: dir.into(),
            logger,
        }
    }

    pub async fn deploy(&self, manifest_yaml: &str, private_key: &str) -> Result<(), CoreError> {
        self.run("deploy", manifest_yaml, private_key).await
    }

    pub async fn delete(&self, manifest_yaml: &str, private_key: &str) -> Result<(), CoreError> {
        self.run("delete", manifest_yaml, private_key).await
    }

    async fn run(
        &self,
        subcommand: &str,
        manifest_yaml: &str,
        private_key: &str,
    ) -> Result<(), CoreError> {
        self.write(MANIFEST_FILE, manifest_yaml).await?;
        self.write(PRIVATE_KEY_FILE, private_key).await?;

        tracing::debug!("running bosh-init {} in {}", subcommand, self.dir.display());
        let mut child = Command::new("bosh-init")
            .arg(subcommand)
            .arg(MANIFEST_FILE)
            .current_dir(&self.dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CoreError::Bosh(format!("failed to run bosh-init: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CoreError::Bosh("bosh-init stdout was not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| CoreError::Bosh("bosh-init stderr was not captured".to_string()))?;

        // drain stderr concurrently so a chatty bosh-init cannot stall on a
        // full pipe while we stream stdout
        let stderr_task = tokio::spawn(async move {
            let mut buffer = String::new();
            let _ = stderr.read_to_string(&mut buffer).await;
            buffer
        });

        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            self.logger.println(&line);
        }

        let status = child
            .wait()
            .await
            .map_err(|e| CoreError::Bosh(format!("failed to wait for bosh-init: {}", e)))?;
        let stderr_output = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(CoreError::Bosh(format!(
                "bosh-init {} exited with {}: {}",
                subcommand,
                status,
                stderr_output.trim()
            )));
        }

        Ok(())
    }

    async fn write(&self, file: &str, contents: &str) -> Result<(), CoreError> {
        let path = self.dir.join(file);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| CoreError::Bosh(format!("failed to write {}: {}", path.display(), e)))?;

        #[cfg(unix)]
        if file == PRIVATE_KEY_FILE {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&path, permissions).await.map_err(|e| {
                CoreError::Bosh(format!("failed to restrict {}: {}", path.display(), e))
            })?;
        }

        Ok(())
    }
}
