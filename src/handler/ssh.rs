use crate::domain::report::ExecutionRequest;
use crate::domain::session::Credential;
use crate::model::http::{ExecuteRequest, ExecuteResponse};
use crate::model::state::AppState;
use crate::repository::ssh::execute_remote_command;
use actix_web::{web, HttpResponse};
use tracing::{info, warn};

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn execute_handler(
    data: web::Data<AppState>,
    body: web::Json<ExecuteRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let body = body.into_inner();
    let hosts = body.hosts();
    let catalogue = data.catalogue.snapshot();

    let (Some(username), Some(password), Some(pattern)) = (
        present(body.username),
        present(body.password),
        present(body.command),
    ) else {
        return Ok(bad_request("Error: Please fill in all fields."));
    };
    let command = match catalogue.prepare_command(&pattern, body.extra_input.as_deref()) {
        Ok(command) => command,
        Err(e) => {
            warn!("rejected '{}': {}", pattern, e);
            return Ok(bad_request(&format!("Error: {}", e)));
        }
    };
    if hosts.is_empty() {
        return Ok(bad_request("Error: Please fill in all fields."));
    }

    info!("execute request for {} host(s) as {}", hosts.len(), username);
    let request = ExecutionRequest {
        hosts,
        credential: Credential::new(username, password),
        command,
    };
    let report = execute_remote_command(&data.connector, &catalogue, &request, &data.options).await;
    Ok(HttpResponse::Ok().json(ExecuteResponse {
        output: report.to_string(),
    }))
}
