use crate::model::http::StartVmsRequest;
use crate::model::state::AppState;
use actix_web::{web, HttpResponse};
use tracing::error;

pub async fn get_vms(data: web::Data<AppState>) -> HttpResponse {
    match data.gcloud.list_vms().await {
        Ok(vms) => HttpResponse::Ok().json(vms),
        Err(e) => {
            error!("Failed to list vms: {:?}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

pub async fn start_vms(data: web::Data<AppState>, body: web::Json<StartVmsRequest>) -> HttpResponse {
    let vms = body.into_inner().vms.unwrap_or_default();
    if vms.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "No VMs provided to start." }));
    }
    match data.gcloud.start_vms(&vms).await {
        Ok(count) => HttpResponse::Ok().json(serde_json::json!({
            "success": format!("Start command for {} VM(s) sent.", count)
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() })),
    }
}
