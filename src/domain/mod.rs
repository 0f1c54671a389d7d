pub mod catalogue;
pub mod report;
pub mod responder;
pub mod session;
pub mod ssh_configuration;
