use crate::domain::ssh_configuration::RusshConnector;
use crate::repository::ssh::ExecOptions;
use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub port: u16,
    pub ssh_port: u16,
    pub connect_timeout: Duration,
    pub auth_timeout: Duration,
    pub disconnect_timeout: Duration,
    pub request_pty: bool,
    pub catalogue_path: Option<PathBuf>,
    pub gcloud_bin: String,
    pub vm_name_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            ssh_port: 22,
            connect_timeout: Duration::from_secs(5),
            auth_timeout: Duration::from_secs(5),
            disconnect_timeout: Duration::from_secs(10),
            request_pty: true,
            catalogue_path: None,
            gcloud_bin: "gcloud".to_string(),
            vm_name_filter: "name~^sru-fstudio-faz".to_string(),
        }
    }
}

impl Settings {
    /// Reads the process environment; call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let d = Self::default();
        let secs = |key: &str, default: Duration| -> Result<Duration> {
            parse_var(&lookup, key, default.as_secs()).map(Duration::from_secs)
        };
        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(d.bind_addr),
            port: parse_var(&lookup, "PORT", d.port)?,
            ssh_port: parse_var(&lookup, "SSH_PORT", d.ssh_port)?,
            connect_timeout: secs("CONNECT_TIMEOUT_SECS", d.connect_timeout)?,
            auth_timeout: secs("AUTH_TIMEOUT_SECS", d.auth_timeout)?,
            disconnect_timeout: secs("DISCONNECT_TIMEOUT_SECS", d.disconnect_timeout)?,
            request_pty: parse_var(&lookup, "REQUEST_PTY", d.request_pty)?,
            catalogue_path: lookup("CATALOGUE_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            gcloud_bin: lookup("GCLOUD_BIN").unwrap_or(d.gcloud_bin),
            vm_name_filter: lookup("VM_NAME_FILTER").unwrap_or(d.vm_name_filter),
        })
    }

    pub fn connector(&self) -> RusshConnector {
        RusshConnector::new(self.ssh_port, self.connect_timeout, self.auth_timeout, self.request_pty)
    }

    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            disconnect_timeout: self.disconnect_timeout,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has an invalid value '{}': {}", key, raw, e)),
        None => Ok(default),
    }
}
