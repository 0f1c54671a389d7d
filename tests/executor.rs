use async_trait::async_trait;
use fabric_console::domain::responder::Responders;
use fabric_console::error::{ExecError, SessionError};
use fabric_console::{
    execute_remote_command, Catalogue, CommandOutput, CommandTemplate, Connector, Credential, ExecOptions,
    ExecutionRequest, HostOutcome, RemoteSession, SectionKind,
};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
enum Script {
    Output(&'static str, &'static str),
    RunFails(ErrorKind),
    DropsConnection,
    Hangs,
    /// Emits the prompt and records what the responders answered.
    Prompts(&'static str),
    ConnectFails,
}

#[derive(Default)]
struct Calls {
    connects: Vec<String>,
    runs: Vec<String>,
    closes: Vec<String>,
    answers: Vec<String>,
}

#[derive(Clone, Default)]
struct ScriptedConnector {
    scripts: HashMap<String, Script>,
    calls: Arc<Mutex<Calls>>,
}

impl ScriptedConnector {
    fn new(scripts: &[(&str, Script)]) -> Self {
        Self {
            scripts: scripts.iter().map(|(h, s)| (h.to_string(), s.clone())).collect(),
            calls: Arc::default(),
        }
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().unwrap()
    }
}

struct ScriptedSession {
    host: String,
    script: Script,
    calls: Arc<Mutex<Calls>>,
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Session = ScriptedSession;

    async fn connect(&self, host: &str, _credential: &Credential) -> Result<ScriptedSession, SessionError> {
        self.calls().connects.push(host.to_string());
        let script = self.scripts.get(host).cloned().unwrap_or(Script::Output("", ""));
        if let Script::ConnectFails = script {
            return Err(SessionError::AuthRejected("admin".into()));
        }
        Ok(ScriptedSession {
            host: host.to_string(),
            script,
            calls: self.calls.clone(),
        })
    }
}

#[async_trait]
impl RemoteSession for ScriptedSession {
    async fn run(&mut self, command: &str, responders: &mut Responders) -> Result<CommandOutput, SessionError> {
        self.calls.lock().unwrap().runs.push(format!("{}: {}", self.host, command));
        match self.script.clone() {
            Script::Output(stdout, stderr) => Ok(CommandOutput {
                stdout: stdout.into(),
                stderr: stderr.into(),
                exit_code: Some(0),
            }),
            Script::RunFails(kind) => Err(std::io::Error::from(kind).into()),
            Script::DropsConnection => Err(SessionError::Disconnected),
            Script::Hangs => std::future::pending().await,
            Script::Prompts(prompt) => {
                let answers = responders.submit(prompt.as_bytes());
                self.calls.lock().unwrap().answers.extend(answers);
                Ok(CommandOutput {
                    stdout: prompt.into(),
                    ..CommandOutput::default()
                })
            }
            Script::ConnectFails => unreachable!("never connected"),
        }
    }

    async fn close(self) {
        self.calls.lock().unwrap().closes.push(self.host);
    }
}

fn catalogue(entries: &[(&str, CommandTemplate)]) -> Catalogue {
    let templates: IndexMap<String, CommandTemplate> = entries
        .iter()
        .map(|(name, t)| (name.to_string(), t.clone()))
        .collect();
    Catalogue::new(templates).unwrap()
}

fn stop_catalogue() -> Catalogue {
    catalogue(&[
        ("Stop", CommandTemplate::new("runtime fabric uninstall")),
        ("Upgrade", CommandTemplate::new("system execute upgrade --no-interactive").expect_disconnect()),
    ])
}

fn request(hosts: &[&str], command: &str) -> ExecutionRequest {
    ExecutionRequest {
        hosts: hosts.iter().map(|h| h.to_string()).collect(),
        credential: Credential::new("admin", "pw"),
        command: command.to_string(),
    }
}

fn options() -> ExecOptions {
    ExecOptions {
        disconnect_timeout: Duration::from_millis(50),
    }
}

#[tokio::test]
async fn test_mixed_batch_reports_each_host() {
    let connector = ScriptedConnector::new(&[
        ("10.0.0.1", Script::Output("done\n", "")),
        ("10.0.0.2", Script::RunFails(ErrorKind::ConnectionRefused)),
    ]);
    let report = execute_remote_command(
        &connector,
        &stop_catalogue(),
        &request(&["10.0.0.1", "10.0.0.2"], "runtime fabric uninstall"),
        &options(),
    )
    .await;

    let text = report.to_string();
    let first = text.find("Host: 10.0.0.1").unwrap();
    let second = text.find("Host: 10.0.0.2").unwrap();
    assert!(first < second);
    assert!(text[first..second].contains("Output:\ndone\n"));
    assert!(text[second..].contains("Error on 10.0.0.2: ConnectionRefused"));
    assert!(report.has_failures());
    assert_eq!(connector.calls().closes, vec!["10.0.0.1", "10.0.0.2"]);
}

#[tokio::test]
async fn test_unknown_command_touches_no_host() {
    let connector = ScriptedConnector::new(&[]);
    let report = execute_remote_command(
        &connector,
        &stop_catalogue(),
        &request(&["10.0.0.1", "10.0.0.2"], "shutdown -r now"),
        &options(),
    )
    .await;

    assert!(matches!(report.general_error, Some(ExecError::CommandNotFound(_))));
    assert!(report.sections.is_empty());
    assert_eq!(
        report.to_string(),
        "Error: The selected command 'shutdown -r now' could not be found."
    );
    let calls = connector.calls();
    assert!(calls.connects.is_empty());
    assert!(calls.runs.is_empty());
}

#[tokio::test]
async fn test_failure_isolation_is_order_independent() {
    let connector = ScriptedConnector::new(&[
        ("a", Script::RunFails(ErrorKind::BrokenPipe)),
        ("b", Script::Output("ok", "")),
    ]);
    let cat = stop_catalogue();
    for hosts in [["a", "b"], ["b", "a"]] {
        let report =
            execute_remote_command(&connector, &cat, &request(&hosts, "runtime fabric uninstall"), &options()).await;
        let order: Vec<_> = report.sections.iter().map(|s| s.host.as_str()).collect();
        assert_eq!(order, hosts);
        assert_eq!(report.section("a").unwrap().kind(), SectionKind::HostError);
        assert_eq!(report.section("b").unwrap().kind(), SectionKind::SuccessWithOutput);
        // each section renders the same whatever its position
        assert!(report.section("b").unwrap().to_string().contains("Output:\nok\n"));
    }
}

#[tokio::test]
async fn test_timeout_on_disconnect_command_is_success() {
    let connector = ScriptedConnector::new(&[
        ("10.0.0.1", Script::Hangs),
        ("10.0.0.2", Script::DropsConnection),
        ("10.0.0.3", Script::Output("upgrade scheduled", "")),
    ]);
    let report = execute_remote_command(
        &connector,
        &stop_catalogue(),
        &request(&["10.0.0.1", "10.0.0.2", "10.0.0.3"], "system execute upgrade --no-interactive"),
        &options(),
    )
    .await;

    assert_eq!(report.section("10.0.0.1").unwrap().kind(), SectionKind::ExpectedDisconnect);
    assert_eq!(report.section("10.0.0.2").unwrap().kind(), SectionKind::ExpectedDisconnect);
    assert_eq!(report.section("10.0.0.3").unwrap().kind(), SectionKind::SuccessWithOutput);
    assert!(!report.has_failures());
    assert!(report
        .to_string()
        .contains("Command successfully started. Server rebooted, connection dropped as expected."));
}

#[tokio::test]
async fn test_dropped_connection_on_normal_command_is_an_error() {
    let connector = ScriptedConnector::new(&[("10.0.0.1", Script::DropsConnection)]);
    let report = execute_remote_command(
        &connector,
        &stop_catalogue(),
        &request(&["10.0.0.1"], "runtime fabric uninstall"),
        &options(),
    )
    .await;
    assert!(matches!(
        report.sections[0].outcome,
        HostOutcome::Failed(SessionError::Disconnected)
    ));
}

#[tokio::test]
async fn test_empty_output_is_labeled() {
    let connector = ScriptedConnector::new(&[("10.0.0.1", Script::Output(" \n", "\n"))]);
    let report = execute_remote_command(
        &connector,
        &stop_catalogue(),
        &request(&["10.0.0.1"], "runtime fabric uninstall"),
        &options(),
    )
    .await;
    assert_eq!(report.sections[0].kind(), SectionKind::SuccessNoOutput);
    assert!(report.to_string().contains("No output received.\n"));
}

#[tokio::test]
async fn test_group_failure_aborts_before_any_run() {
    let connector = ScriptedConnector::new(&[
        ("10.0.0.1", Script::Output("done", "")),
        ("10.0.0.2", Script::ConnectFails),
        ("10.0.0.3", Script::Output("done", "")),
    ]);
    let report = execute_remote_command(
        &connector,
        &stop_catalogue(),
        &request(&["10.0.0.1", "10.0.0.2", "10.0.0.3"], "runtime fabric uninstall"),
        &options(),
    )
    .await;

    match &report.general_error {
        Some(ExecError::GroupEstablishment { host, .. }) => assert_eq!(host, "10.0.0.2"),
        other => panic!("unexpected {:?}", other),
    }
    assert!(report.to_string().starts_with("General error:\nType: GroupEstablishment\n"));
    let calls = connector.calls();
    assert_eq!(calls.connects, vec!["10.0.0.1", "10.0.0.2"]);
    assert!(calls.runs.is_empty());
    // the session opened before the failure is released
    assert_eq!(calls.closes, vec!["10.0.0.1"]);
}

#[tokio::test]
async fn test_empty_host_list_is_a_general_error() {
    let connector = ScriptedConnector::new(&[]);
    let report = execute_remote_command(
        &connector,
        &stop_catalogue(),
        &request(&[], "runtime fabric uninstall"),
        &options(),
    )
    .await;
    assert!(matches!(report.general_error, Some(ExecError::NoHosts)));
}

#[tokio::test]
async fn test_responders_answer_prompts_per_host() {
    let cat = catalogue(&[(
        "Change guest user password",
        CommandTemplate::new("execute password guest {extra_input}")
            .with_extra_input("New password for guest user:")
            .with_response("Confirm \\(y/n\\)", "y"),
    )]);
    let connector = ScriptedConnector::new(&[
        ("10.0.0.1", Script::Prompts("Confirm (y/n)")),
        ("10.0.0.2", Script::Prompts("Confirm (y/n)")),
    ]);
    let command = cat
        .prepare_command("execute password guest {extra_input}", Some("n3w"))
        .unwrap();
    let report = execute_remote_command(&connector, &cat, &request(&["10.0.0.1", "10.0.0.2"], &command), &options()).await;

    assert!(!report.has_failures());
    let calls = connector.calls();
    assert_eq!(
        calls.runs,
        vec!["10.0.0.1: execute password guest n3w", "10.0.0.2: execute password guest n3w"]
    );
    // fresh watchers for every host
    assert_eq!(calls.answers, vec!["y\n", "y\n"]);
}
