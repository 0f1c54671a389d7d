use crate::error::GcloudError;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{error, info};

const LIST_TIMEOUT: Duration = Duration::from_secs(30);
const START_TIMEOUT: Duration = Duration::from_secs(60);
const LIST_FORMAT: &str = "--format=json(name,zone,status,networkInterfaces[0].accessConfigs[0].natIP)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vm {
    pub name: String,
    pub zone: String,
    pub status: String,
    pub external_ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmRef {
    pub name: String,
    pub zone: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInstance {
    name: String,
    #[serde(default)]
    zone: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    network_interfaces: Vec<RawInterface>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInterface {
    #[serde(default)]
    access_configs: Vec<RawAccessConfig>,
}

#[derive(Deserialize)]
struct RawAccessConfig {
    #[serde(rename = "natIP")]
    nat_ip: Option<String>,
}

/// gcloud prints zones as resource URLs; `--zone` wants the last segment.
fn short_zone(zone: &str) -> &str {
    zone.rsplit('/').next().unwrap_or(zone)
}

pub fn parse_instances(json: &str) -> Result<Vec<Vm>, GcloudError> {
    let raw: Vec<RawInstance> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|i| Vm {
            external_ip: i
                .network_interfaces
                .into_iter()
                .flat_map(|n| n.access_configs)
                .find_map(|a| a.nat_ip),
            zone: short_zone(&i.zone).to_string(),
            name: i.name,
            status: i.status,
        })
        .collect())
}

/// Thin proxy to the Google Cloud CLI.
#[derive(Debug, Clone)]
pub struct Gcloud {
    pub bin: String,
    pub name_filter: String,
}

impl Gcloud {
    pub fn new(bin: impl Into<String>, name_filter: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            name_filter: name_filter.into(),
        }
    }

    pub async fn list_vms(&self) -> Result<Vec<Vm>, GcloudError> {
        let filter = format!("--filter={}", self.name_filter);
        let stdout = self
            .run(&["compute", "instances", "list", &filter, LIST_FORMAT], LIST_TIMEOUT)
            .await?;
        let vms = parse_instances(&stdout)?;
        info!("listed {} vm(s)", vms.len());
        Ok(vms)
    }

    /// Fires an async start per VM; failures are collected, not short-circuited.
    pub async fn start_vms(&self, vms: &[VmRef]) -> Result<usize, GcloudError> {
        let mut errors = Vec::new();
        for vm in vms {
            let zone = format!("--zone={}", short_zone(&vm.zone));
            let args = ["compute", "instances", "start", vm.name.as_str(), zone.as_str(), "--async"];
            if let Err(e) = self.run(&args, START_TIMEOUT).await {
                error!("Could not start VM {}: {}", vm.name, e);
                errors.push(format!("Could not start VM {}: {}", vm.name, e));
            } else {
                info!("start requested for {}", vm.name);
            }
        }
        if errors.is_empty() {
            Ok(vms.len())
        } else {
            Err(GcloudError::StartFailed(errors))
        }
    }

    async fn run(&self, args: &[&str], limit: Duration) -> Result<String, GcloudError> {
        let mut cmd = Command::new(&self.bin);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let output = match timeout(limit, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(GcloudError::NotFound(self.bin.clone()))
            }
            Ok(Err(e)) => return Err(GcloudError::Spawn(e)),
            Err(_) => return Err(GcloudError::Timeout(limit)),
        };
        if !output.status.success() {
            return Err(GcloudError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
