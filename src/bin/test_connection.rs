//! Connects to a single host with password auth and runs one command.
//!
//! HOST is required; SSH_USER defaults to `admin` and COMMAND to
//! `system log list`. The password is prompted for.

use anyhow::{bail, Context};
use dotenvy::dotenv;
use fabric_console::config::Settings;
use fabric_console::domain::responder::Responders;
use fabric_console::{Connector, Credential, RemoteSession};
use inquire::Password;

fn print_error(e: &dyn std::error::Error) {
    eprintln!("\n--- ERROR ---");
    eprintln!("{}", e);
    let mut source = e.source();
    while let Some(cause) = source {
        eprintln!("caused by: {}", cause);
        source = cause.source();
    }
    eprintln!("-------------\n");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env()?;
    let host = std::env::var("HOST").context("set HOST to the address to test")?;
    let user = std::env::var("SSH_USER").unwrap_or_else(|_| "admin".to_string());
    let command = std::env::var("COMMAND").unwrap_or_else(|_| "system log list".to_string());

    let password = Password::new(&format!("Password for {}@{}:", user, host))
        .without_confirmation()
        .prompt()?;

    println!("\nConnecting...");
    let connector = settings.connector();
    let mut session = match connector.connect(&host, &Credential::new(user, password)).await {
        Ok(session) => session,
        Err(e) => {
            print_error(&e);
            bail!("connection to {} failed", host);
        }
    };
    println!("Connected to {}!", host);
    println!("Running: '{}'", command);

    let result = session.run(&command, &mut Responders::default()).await;
    session.close().await;
    match result {
        Ok(output) => {
            println!("\n--- RESULT ---");
            println!("{}", output.stdout);
            if !output.stderr.is_empty() {
                println!("--- STDERR ---\n{}", output.stderr);
            }
            println!("--------------\n");
            Ok(())
        }
        Err(e) => {
            print_error(&e);
            bail!("command failed on {}", host)
        }
    }
}
