use crate::domain::catalogue::Catalogue;
use crate::domain::report::{ExecutionReport, ExecutionRequest, HostOutcome};
use crate::domain::responder::Responders;
use crate::domain::session::{Connector, RemoteSession};
use crate::error::{ExecError, SessionError};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

pub const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct ExecOptions {
    /// Bound on commands whose template expects the host to drop the session.
    pub disconnect_timeout: Duration,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            disconnect_timeout: DISCONNECT_TIMEOUT,
        }
    }
}

/// Runs `request.command` on every host, in order, and aggregates the
/// result. Never fails: every error ends up in the returned report.
pub async fn execute_remote_command<C: Connector>(
    connector: &C,
    catalogue: &Catalogue,
    request: &ExecutionRequest,
    options: &ExecOptions,
) -> ExecutionReport {
    let command = request.command.as_str();
    let (name, template) = match catalogue.resolve(command) {
        Ok(found) => found,
        Err(e) => {
            warn!("rejected command: {}", e);
            return ExecutionReport::failed(command, e);
        }
    };
    let responders = match Responders::compile(&template.responses) {
        Ok(r) => r,
        Err(source) => {
            let e = ExecError::InvalidResponder {
                name: name.to_string(),
                source,
            };
            error!("{}", e);
            return ExecutionReport::failed(command, e);
        }
    };
    info!(
        "executing '{}' ({}) on {} host(s)",
        name,
        command,
        request.hosts.len()
    );

    let sessions = match establish_group(connector, request).await {
        Ok(sessions) => sessions,
        Err(e) => {
            error!("{}", e);
            return ExecutionReport::failed(command, e);
        }
    };

    let mut report = ExecutionReport::new(command);
    for (host, mut session) in sessions {
        // each host gets watchers that have seen nothing yet
        let mut watchers = responders.clone();
        let outcome = if template.disconnect {
            let limit = options.disconnect_timeout;
            run_expecting_disconnect(&mut session, command, &mut watchers, limit).await
        } else {
            match session.run(command, &mut watchers).await {
                Ok(output) => HostOutcome::Completed(output),
                Err(e) => HostOutcome::Failed(e),
            }
        };
        match &outcome {
            HostOutcome::Completed(_) => info!("batch server: {} done", host),
            HostOutcome::ExpectedDisconnect => info!("batch server: {} dropped as expected", host),
            HostOutcome::Failed(e) => warn!("batch server: {} failed: {}", host, e),
        }
        report.push(host, outcome);
        session.close().await;
    }
    report
}

/// Connects and authenticates every host before anything runs. The first
/// failure aborts the whole group.
async fn establish_group<C: Connector>(
    connector: &C,
    request: &ExecutionRequest,
) -> Result<Vec<(String, C::Session)>, ExecError> {
    if request.hosts.is_empty() {
        return Err(ExecError::NoHosts);
    }
    let mut sessions = Vec::with_capacity(request.hosts.len());
    for host in &request.hosts {
        match connector.connect(host, &request.credential).await {
            Ok(session) => sessions.push((host.clone(), session)),
            Err(source) => {
                for (_, session) in sessions {
                    session.close().await;
                }
                return Err(ExecError::GroupEstablishment {
                    host: host.clone(),
                    source,
                });
            }
        }
    }
    Ok(sessions)
}

async fn run_expecting_disconnect<S: RemoteSession>(
    session: &mut S,
    command: &str,
    watchers: &mut Responders,
    limit: Duration,
) -> HostOutcome {
    match timeout(limit, session.run(command, watchers)).await {
        Ok(Ok(output)) => HostOutcome::Completed(output),
        Err(_) => HostOutcome::ExpectedDisconnect,
        // A rebooting host usually resets TCP before the timer fires. Only a
        // disconnect-flagged command gets this; elsewhere a drop is an error.
        Ok(Err(SessionError::Disconnected)) => HostOutcome::ExpectedDisconnect,
        Ok(Err(e)) => HostOutcome::Failed(e),
    }
}
