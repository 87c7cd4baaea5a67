use crate::models::HealthResponse;
use actix_web::{HttpResponse, Responder, get};

/// # Health Check Endpoint
///
/// Liveness probe for load balancers and operators. Always answers, never
/// touches the database.
///
/// ## Response
///
/// - **200 OK**: `{"status": "ok"}`
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    ),
    tag = "Health Check"
)]
#[get("/health")]
pub async fn health() -> impl Responder {
    tracing::debug!(event = "health_check", status = "ok", "Health check requested");
    HttpResponse::Ok().json(HealthResponse::ok())
}

/// Registers `GET /health`.
pub fn configure_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(health);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(App::new().configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200, "Status code should be 200 OK");
        let content_type = resp
            .headers()
            .get("content-type")
            .expect("Content-Type header should be present");
        assert_eq!(content_type, "application/json");

        let body = test::read_body(resp).await;
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            r#"{"status":"ok"}"#,
            "Body should be exactly the liveness payload"
        );
    }

    #[actix_web::test]
    async fn test_health_is_stable_across_requests() {
        let app = test::init_service(App::new().configure(configure_routes)).await;

        for _ in 0..3 {
            let req = test::TestRequest::get().uri("/health").to_request();
            let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body, HealthResponse::ok());
        }
    }

    #[actix_web::test]
    async fn test_health_rejects_post() {
        let app = test::init_service(App::new().configure(configure_routes)).await;

        let req = test::TestRequest::post().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }
}
