// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Unauthenticated liveness probe

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{call_and_read_body_json, init_service, TestRequest};
    use actix_web::App;
    use serde_json::Value;

    #[actix_web::test]
    async fn test_health_check() {
        let app = init_service(App::new().configure(config)).await;

        let req = TestRequest::get().uri("/health").to_request();
        let body: Value = call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "hungries-places");
    }
}
