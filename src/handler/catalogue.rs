use crate::error::CatalogueError;
use crate::model::http::CommandView;
use crate::model::state::AppState;
use actix_web::{web, HttpResponse};
use tracing::error;

pub async fn get_all_commands(data: web::Data<AppState>) -> HttpResponse {
    let catalogue = data.catalogue.snapshot();
    let commands: Vec<CommandView> = catalogue
        .iter()
        .map(|(name, template)| CommandView::new(name, template))
        .collect();
    HttpResponse::Ok().json(commands)
}

pub async fn reload_commands(data: web::Data<AppState>) -> Result<HttpResponse, actix_web::Error> {
    match data.catalogue.reload() {
        Ok(count) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": format!("Reloaded {} command(s).", count)
        }))),
        Err(CatalogueError::NoSource) => Err(actix_web::error::ErrorConflict(
            "No catalogue file is configured, the built-in commands are in use",
        )),
        Err(e) => {
            error!("Failed to reload catalogue: {:?}", e);
            Err(actix_web::error::ErrorInternalServerError(format!(
                "Failed to reload catalogue: {}",
                e
            )))
        }
    }
}
