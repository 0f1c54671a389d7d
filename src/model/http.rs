use crate::domain::catalogue::CommandTemplate;
use crate::repository::gcloud::VmRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub ips: Option<String>,       // one host per line
    pub username: Option<String>,
    pub password: Option<String>,
    pub command: Option<String>,   // template pattern as listed by /commands
    pub extra_input: Option<String>,
}

impl ExecuteRequest {
    pub fn hosts(&self) -> Vec<String> {
        self.ips
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub output: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommandView {
    pub name: String,
    pub command: String,
    pub disconnect: bool,
    pub requires_extra_input: bool,
    pub prompt: Option<String>,
}

impl CommandView {
    pub fn new(name: &str, template: &CommandTemplate) -> Self {
        Self {
            name: name.to_string(),
            command: template.command.clone(),
            disconnect: template.disconnect,
            requires_extra_input: template.requires_extra_input,
            prompt: template.prompt.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StartVmsRequest {
    pub vms: Option<Vec<VmRef>>,
}
