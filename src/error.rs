use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures that abort a whole execution request. The executor turns these
/// into the single general-error paragraph of the report.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("The selected command '{0}' could not be found.")]
    CommandNotFound(String),

    #[error("no target hosts were given")]
    NoHosts,

    #[error("invalid prompt pattern for '{name}': {source}")]
    InvalidResponder {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("could not establish session with {host}: {source}")]
    GroupEstablishment {
        host: String,
        #[source]
        source: SessionError,
    },
}

impl ExecError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExecError::CommandNotFound(_) => "CommandNotFound",
            ExecError::NoHosts => "NoHosts",
            ExecError::InvalidResponder { .. } => "InvalidResponder",
            ExecError::GroupEstablishment { .. } => "GroupEstablishment",
        }
    }
}

/// Transport and remote-run failures scoped to one host.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid host address '{0}'")]
    InvalidAddress(String),

    #[error("connection failed for {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: russh::Error,
    },

    #[error("connection timeout to {target} after {secs}s", secs = .after.as_secs())]
    ConnectTimeout { target: String, after: Duration },

    #[error("authentication rejected for user {0}")]
    AuthRejected(String),

    #[error("authentication error: {0}")]
    Auth(#[source] russh::Error),

    #[error("authentication timeout for user {0}")]
    AuthTimeout(String),

    #[error("channel error: {0}")]
    Channel(#[from] russh::Error),

    #[error("{kind:?}: {0}", kind = .0.kind())]
    Io(#[from] std::io::Error),

    #[error("connection dropped before the command finished")]
    Disconnected,
}

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("failed to read catalogue {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalogue: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("command '{name}' has an invalid prompt pattern: {source}")]
    InvalidPrompt {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("This command requires additional input.")]
    MissingExtraInput(String),

    #[error("no catalogue file is configured")]
    NoSource,
}

#[derive(Debug, Error)]
pub enum GcloudError {
    #[error("The \"{0}\" command was not found. Is the Google Cloud CLI installed?")]
    NotFound(String),

    #[error("Error executing gcloud (check login/project): {0}")]
    Failed(String),

    #[error("gcloud did not finish within {secs}s", secs = .0.as_secs())]
    Timeout(Duration),

    #[error("An unexpected error occurred: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("An unexpected error occurred: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{}", .0.join(". "))]
    StartFailed(Vec<String>),
}
