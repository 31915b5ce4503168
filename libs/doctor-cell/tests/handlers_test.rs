use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Datelike, Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::router::doctor_routes;
use doctor_cell::DayOfWeek;
use shared_utils::test_utils::{MockBackendResponses, TestConfig};

fn create_test_app(server: &MockServer) -> Router {
    doctor_routes(TestConfig::with_api(&server.uri()).to_arc())
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn send(app: Router, uri: &str) -> axum::response::Response {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_search_doctors_by_city() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctors"))
        .and(query_param("city", "Rabat"))
        .and(query_param("specialty", "cardiology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::doctor_response("d1", "Rabat", "cardiology"),
            MockBackendResponses::doctor_response("d2", "Rabat", "cardiology"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = send(create_test_app(&mock_server), "/?city=Rabat&specialty=cardiology").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json_response = body_json(response).await;
    assert_eq!(json_response["total"], 2);
    assert_eq!(json_response["doctors"][0]["city"], "Rabat");
}

#[tokio::test]
async fn test_get_doctor_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctors/unknown"))
        .respond_with(ResponseTemplate::new(404).set_body_json(
            MockBackendResponses::error_response("Doctor not found"),
        ))
        .mount(&mock_server)
        .await;

    let response = send(create_test_app(&mock_server), "/unknown").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json_response = body_json(response).await;
    assert_eq!(json_response["error"], "Doctor not found");
}

#[tokio::test]
async fn test_doctor_id_stays_one_backend_segment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctors/d1%2F..%2Fadmin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::doctor_response("d1", "Lyon", "cardiology"),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = send(create_test_app(&mock_server), "/d1%2F..%2Fadmin").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_dot_segment_doctor_id_is_rejected() {
    let mock_server = MockServer::start().await;

    let response = send(create_test_app(&mock_server), "/%2E%2E/availability").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_availability_windows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctors/d1/availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::availability_window("Monday", "09:00:00", "12:00:00"),
            MockBackendResponses::availability_window("Thursday", "14:00:00", "17:00:00"),
        ])))
        .mount(&mock_server)
        .await;

    let response = send(create_test_app(&mock_server), "/d1/availability").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json_response = body_json(response).await;
    assert_eq!(json_response.as_array().unwrap().len(), 2);
    assert_eq!(json_response[1]["day_of_week"], "Thursday");
}

#[tokio::test]
async fn test_slots_for_future_date() {
    let mock_server = MockServer::start().await;
    let date = Utc::now().date_naive() + Duration::days(7);
    let day = DayOfWeek::from(date.weekday()).name();

    Mock::given(method("GET"))
        .and(path("/api/doctors/d1/availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::availability_window(day, "08:00:00", "10:00:00"),
            MockBackendResponses::availability_window(day, "09:00:00", "10:30:00"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/doctors/d1/booked-slots"))
        .and(query_param("date", date.format("%Y-%m-%d").to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::booked_slot("09:00:00"),
        ])))
        .mount(&mock_server)
        .await;

    let uri = format!("/d1/slots?date={}", date.format("%Y-%m-%d"));
    let response = send(create_test_app(&mock_server), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json_response = body_json(response).await;
    assert_eq!(
        json_response["slots"],
        json!([
            {"time": "08:00", "available": true},
            {"time": "08:30", "available": true},
            {"time": "09:00", "available": false, "reason": "booked"},
            {"time": "09:30", "available": true},
            {"time": "10:00", "available": true},
        ])
    );
    assert_eq!(json_response["utc_offset"], "+00:00");
}

#[tokio::test]
async fn test_slots_reject_past_date() {
    let mock_server = MockServer::start().await;
    let date = Utc::now().date_naive() - Duration::days(2);

    let uri = format!("/d1/slots?date={}", date.format("%Y-%m-%d"));
    let response = send(create_test_app(&mock_server), &uri).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_slots_require_valid_date() {
    let mock_server = MockServer::start().await;

    let response = send(create_test_app(&mock_server), "/d1/slots?date=tomorrow").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_outage_is_bad_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/doctors"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = Arc::new(TestConfig::with_api(&mock_server.uri()).to_app_config());
    let response = send(doctor_routes(config), "/").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
