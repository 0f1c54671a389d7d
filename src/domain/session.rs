use crate::domain::responder::Responders;
use crate::error::SessionError;
use async_trait::async_trait;
use std::fmt;
use std::net::Ipv6Addr;

/// Password credential applied to every host of a request.
#[derive(Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<u32>,
}

/// `host` or `host:port`, IPv6 literals bare or bracketed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAddress {
    pub host: String,
    pub port: u16,
}

impl HostAddress {
    pub fn parse(raw: &str, default_port: u16) -> Result<Self, SessionError> {
        let raw = raw.trim();
        let invalid = || SessionError::InvalidAddress(raw.to_string());
        if raw.is_empty() || raw.contains(char::is_whitespace) {
            return Err(invalid());
        }
        if let Some(rest) = raw.strip_prefix('[') {
            let (host, after) = rest.split_once(']').ok_or_else(invalid)?;
            host.parse::<Ipv6Addr>().map_err(|_| invalid())?;
            let port = match after.strip_prefix(':') {
                Some(p) => p.parse().map_err(|_| invalid())?,
                None if after.is_empty() => default_port,
                None => return Err(invalid()),
            };
            return Ok(Self { host: host.to_string(), port });
        }
        if raw.parse::<Ipv6Addr>().is_ok() {
            return Ok(Self { host: raw.to_string(), port: default_port });
        }
        match raw.split_once(':') {
            Some((host, port)) if !host.is_empty() => Ok(Self {
                host: host.to_string(),
                port: port.parse().map_err(|_| invalid())?,
            }),
            Some(_) => Err(invalid()),
            None => Ok(Self { host: raw.to_string(), port: default_port }),
        }
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Opens authenticated sessions. The russh implementation lives in
/// `ssh_configuration`; tests provide scripted ones.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: RemoteSession;

    async fn connect(
        &self,
        host: &str,
        credential: &Credential,
    ) -> Result<Self::Session, SessionError>;
}

/// A live session able to run one command at a time, streaming output
/// through the responders and writing their answers back to stdin.
#[async_trait]
pub trait RemoteSession: Send {
    async fn run(
        &mut self,
        command: &str,
        responders: &mut Responders,
    ) -> Result<CommandOutput, SessionError>;

    async fn close(self);
}
