use actix_web::{HttpRequest, HttpResponse};

pub async fn not_found_handler(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "message": "Route not found",
        "path": req.path(),
        "method": req.method().as_str()
    }))
}
