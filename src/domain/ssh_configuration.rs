use crate::domain::responder::Responders;
use crate::domain::session::{CommandOutput, Connector, Credential, HostAddress, RemoteSession};
use crate::error::SessionError;
use async_trait::async_trait;
use russh::client::{self, Config, Handler};
use russh::keys::ssh_key;
use russh::{ChannelMsg, Disconnect};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub struct Client;
impl Handler for Client {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Password-only russh connector. Keys and agents are never tried.
#[derive(Clone)]
pub struct RusshConnector {
    pub config: Arc<Config>,
    pub default_port: u16,
    pub connect_timeout: Duration,
    pub auth_timeout: Duration,
    pub request_pty: bool,
}

impl RusshConnector {
    pub fn new(
        default_port: u16,
        connect_timeout: Duration,
        auth_timeout: Duration,
        request_pty: bool,
    ) -> Self {
        Self {
            config: Arc::new(Config::default()),
            default_port,
            connect_timeout,
            auth_timeout,
            request_pty,
        }
    }
}

#[async_trait]
impl Connector for RusshConnector {
    type Session = Session;

    async fn connect(&self, host: &str, credential: &Credential) -> Result<Session, SessionError> {
        let target = HostAddress::parse(host, self.default_port)?.to_string();
        info!("connect to {}", target);

        let mut handle = match timeout(
            self.connect_timeout,
            client::connect(self.config.clone(), target.clone(), Client),
        )
        .await
        {
            Ok(Ok(handle)) => handle,
            Ok(Err(source)) => return Err(SessionError::Connect { target, source }),
            Err(_) => {
                return Err(SessionError::ConnectTimeout {
                    target,
                    after: self.connect_timeout,
                })
            }
        };

        let user = credential.username.clone();
        match timeout(
            self.auth_timeout,
            handle.authenticate_password(user.clone(), credential.password.clone()),
        )
        .await
        {
            Ok(Ok(result)) if result.success() => {
                info!("{} authenticated as {}", target, user);
            }
            Ok(Ok(_)) => return Err(SessionError::AuthRejected(user)),
            Ok(Err(e)) => return Err(SessionError::Auth(e)),
            Err(_) => return Err(SessionError::AuthTimeout(user)),
        }

        Ok(Session {
            session: handle,
            target,
            request_pty: self.request_pty,
        })
    }
}

pub struct Session {
    pub session: client::Handle<Client>,
    pub target: String,
    pub request_pty: bool,
}

#[async_trait]
impl RemoteSession for Session {
    async fn run(
        &mut self,
        command: &str,
        responders: &mut Responders,
    ) -> Result<CommandOutput, SessionError> {
        let mut channel = self.session.channel_open_session().await?;
        if self.request_pty {
            channel.request_pty(false, "xterm", 200, 50, 0, 0, &[]).await?;
        }
        channel.exec(true, command).await?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        // what the responders watch: both streams in arrival order
        let mut combined = Vec::new();
        let mut code = None;
        let mut closed = false;
        loop {
            let Some(msg) = channel.wait().await else {
                break;
            };
            match msg {
                ChannelMsg::Data { ref data } => {
                    stdout.extend_from_slice(data);
                    combined.extend_from_slice(data);
                }
                ChannelMsg::ExtendedData { ref data, .. } => {
                    stderr.extend_from_slice(data);
                    combined.extend_from_slice(data);
                }
                // there might still be more data after the exit code
                ChannelMsg::ExitStatus { exit_status } => {
                    code = Some(exit_status);
                    continue;
                }
                ChannelMsg::Eof | ChannelMsg::Close => {
                    closed = true;
                    continue;
                }
                _ => continue,
            }
            if responders.is_empty() {
                continue;
            }
            for answer in responders.submit(&combined) {
                debug!("{} answering prompt", self.target);
                channel.data(answer.as_bytes()).await?;
            }
        }

        if code.is_none() && !closed {
            warn!("{} dropped the channel without an exit status", self.target);
            return Err(SessionError::Disconnected);
        }
        if let Some(code) = code.filter(|c| *c != 0) {
            warn!("{} command exited with status {}", self.target, code);
        }
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: code,
        })
    }

    async fn close(self) {
        if let Err(e) = self
            .session
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
        {
            debug!("{} disconnect: {}", self.target, e);
        }
    }
}
