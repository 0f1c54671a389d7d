//! Operator console for Fabric Studio hosts: runs catalogued admin commands
//! over SSH on a batch of hosts and proxies VM listing/start to the cloud CLI.

pub mod config;
pub mod domain;
pub mod error;
pub mod handler;
pub mod model;
pub mod repository;

pub use domain::catalogue::{Catalogue, CatalogueStore, CommandTemplate};
pub use domain::report::{ExecutionReport, ExecutionRequest, HostOutcome, SectionKind};
pub use domain::session::{CommandOutput, Connector, Credential, RemoteSession};
pub use repository::ssh::{execute_remote_command, ExecOptions};
