use crate::domain::session::{CommandOutput, Credential};
use crate::error::{ExecError, SessionError};
use std::fmt;

const RULE: &str = "====================";

#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub hosts: Vec<String>,
    pub credential: Credential,
    pub command: String,
}

/// What happened on one host.
#[derive(Debug)]
pub enum HostOutcome {
    Completed(CommandOutput),
    ExpectedDisconnect,
    Failed(SessionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    SuccessWithOutput,
    SuccessNoOutput,
    ExpectedDisconnect,
    HostError,
}

#[derive(Debug)]
pub struct HostSection {
    pub host: String,
    pub outcome: HostOutcome,
}

impl HostSection {
    pub fn kind(&self) -> SectionKind {
        match &self.outcome {
            HostOutcome::Completed(out)
                if out.stdout.trim_end().is_empty() && out.stderr.trim_end().is_empty() =>
            {
                SectionKind::SuccessNoOutput
            }
            HostOutcome::Completed(_) => SectionKind::SuccessWithOutput,
            HostOutcome::ExpectedDisconnect => SectionKind::ExpectedDisconnect,
            HostOutcome::Failed(_) => SectionKind::HostError,
        }
    }
}

impl fmt::Display for HostSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{RULE}\nHost: {}\n{RULE}\n", self.host)?;
        match &self.outcome {
            HostOutcome::Completed(out) => {
                let stdout = out.stdout.trim_end();
                let stderr = out.stderr.trim_end();
                if !stdout.is_empty() {
                    write!(f, "Output:\n{stdout}\n\n")?;
                }
                if !stderr.is_empty() {
                    write!(f, "Errors:\n{stderr}\n\n")?;
                }
                if stdout.is_empty() && stderr.is_empty() {
                    f.write_str("No output received.\n\n")?;
                }
                Ok(())
            }
            HostOutcome::ExpectedDisconnect => f.write_str(
                "Command successfully started. Server rebooted, connection dropped as expected.\n\n",
            ),
            HostOutcome::Failed(e) => write!(f, "Error on {}: {}\n\n", self.host, e),
        }
    }
}

/// Aggregated result of one request. Rendering it with `Display` gives the
/// text shown to the operator.
#[derive(Debug)]
pub struct ExecutionReport {
    pub command: String,
    pub sections: Vec<HostSection>,
    pub general_error: Option<ExecError>,
}

impl ExecutionReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            sections: Vec::new(),
            general_error: None,
        }
    }

    pub fn failed(command: impl Into<String>, error: ExecError) -> Self {
        Self {
            general_error: Some(error),
            ..Self::new(command)
        }
    }

    pub fn push(&mut self, host: impl Into<String>, outcome: HostOutcome) {
        self.sections.push(HostSection {
            host: host.into(),
            outcome,
        });
    }

    pub fn section(&self, host: &str) -> Option<&HostSection> {
        self.sections.iter().find(|s| s.host == host)
    }

    pub fn has_failures(&self) -> bool {
        self.general_error.is_some() || self.sections.iter().any(|s| s.kind() == SectionKind::HostError)
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.general_error {
            Some(e @ ExecError::CommandNotFound(_)) => write!(f, "Error: {e}"),
            Some(e) => write!(f, "General error:\nType: {}\nDetails: {}\n", e.kind(), e),
            None => {
                write!(f, "Executing command: '{}'\n\n--- RESULTS ---\n", self.command)?;
                for section in &self.sections {
                    write!(f, "{section}")?;
                }
                Ok(())
            }
        }
    }
}
