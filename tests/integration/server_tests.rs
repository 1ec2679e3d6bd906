//! Middleware layering around the API

use crate::common::fixtures::TestContext;
use crate::test_app;
use actix_web::http::{StatusCode, header};
use actix_web::test::{TestRequest, call_service};

const ORIGIN: &str = "http://localhost:5173";

#[actix_web::test]
async fn test_cors_preflight_is_answered_outermost() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let preflight = TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/health")
        .insert_header((header::ORIGIN, ORIGIN))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
        .to_request();
    let resp = call_service(&app, preflight).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        ORIGIN
    );
    // Inner layers never ran
    assert!(resp.headers().get("x-request-id").is_none());
    assert!(resp.headers().get(header::SERVER).is_none());
}

#[actix_web::test]
async fn test_regular_requests_pass_every_layer() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let req = TestRequest::get()
        .uri("/api/health")
        .insert_header((header::ORIGIN, ORIGIN))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        ORIGIN
    );
    assert!(resp.headers().get("x-request-id").is_some());
    assert_eq!(resp.headers().get(header::SERVER).unwrap(), "TaskHub");
}
