use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Verdict from the external validator: either the content is fit to
/// commit, or diagnostics explaining why not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(String),
}

/// Capability seam for content validation, so the store can be tested
/// with deterministic fakes instead of an external binary.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, content: &[u8]) -> Result<Verdict>;
}

/// Validator that shells out to a check tool (e.g.
/// `promtool check rules`), staging the content in a temp file that is
/// appended as the final argument. A nonzero exit becomes a rejection
/// whose diagnostics are the tool's combined output.
///
/// No timeout is enforced here; a hung tool blocks the calling request.
pub struct CommandValidator {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandValidator {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Validator for CommandValidator {
    async fn validate(&self, content: &[u8]) -> Result<Verdict> {
        let staged =
            tempfile::NamedTempFile::new().context("creating temp file for validator")?;
        tokio::fs::write(staged.path(), content)
            .await
            .context("writing temp file for validator")?;

        debug!(program = %self.program.display(), "running validator");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(staged.path())
            .output()
            .await
            .with_context(|| format!("running validator {}", self.program.display()))?;

        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
        let diagnostics = diagnostics.trim().to_string();

        if output.status.success() {
            debug!("validator accepted content");
            Ok(Verdict::Accepted)
        } else if diagnostics.is_empty() {
            Ok(Verdict::Rejected(output.status.to_string()))
        } else {
            Ok(Verdict::Rejected(diagnostics))
        }
    }
}

/// Validator that accepts everything; used when no check tool is
/// configured.
pub struct AcceptAll;

#[async_trait]
impl Validator for AcceptAll {
    async fn validate(&self, _content: &[u8]) -> Result<Verdict> {
        Ok(Verdict::Accepted)
    }
}
