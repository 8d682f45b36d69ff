use crate::ApiError;

use gsm_auth::AuthError;
use gsm_core::{LifecycleError, TimeoutStage};

use std::panic::Location;
use std::time::Duration;

use axum::response::{IntoResponse, Response};
use error_location::ErrorLocation;
use http::StatusCode;
use http_body_util::BodyExt;

fn here() -> ErrorLocation {
    ErrorLocation::from(Location::caller())
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_not_found_returns_404_with_json_body() {
    let response = ApiError::not_found("Log file not found").into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(json["error"]["message"], "Log file not found");
    assert!(json["error"].get("details").is_none());
}

#[tokio::test]
async fn test_busy_maps_to_409_with_in_flight_operation() {
    let error: ApiError = LifecycleError::busy("update", Some("restart")).into();
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "LIFECYCLE_BUSY");
    assert_eq!(json["error"]["details"]["in_flight"], "restart");
    assert_eq!(json["error"]["details"]["retryable"], true);
}

#[tokio::test]
async fn test_shutdown_timeout_maps_to_504() {
    let error: ApiError = LifecycleError::Timeout {
        stage: TimeoutStage::Shutdown,
        after: Duration::from_secs(40),
        relaunched_pid: None,
        output_tail: Vec::new(),
        location: here(),
    }
    .into();
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "TIMEOUT");
    assert_eq!(json["error"]["details"]["stage"], "shutdown");
    assert!(json["error"]["details"]["relaunched_pid"].is_null());
}

#[tokio::test]
async fn test_provisioning_timeout_maps_to_504_with_output_tail() {
    let error: ApiError = LifecycleError::Timeout {
        stage: TimeoutStage::Provisioning,
        after: Duration::from_secs(600),
        relaunched_pid: Some(4242),
        output_tail: vec![String::from(" Update state (0x61) downloading, progress: 12.50")],
        location: here(),
    }
    .into();
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let json = json_body(response).await;
    assert_eq!(json["error"]["details"]["stage"], "provisioning");
    assert_eq!(json["error"]["details"]["relaunched_pid"], 4242);
    assert_eq!(
        json["error"]["details"]["output_tail"][0],
        " Update state (0x61) downloading, progress: 12.50"
    );
}

#[tokio::test]
async fn test_provisioning_failure_maps_to_502_with_output_tail() {
    let error: ApiError = LifecycleError::ProvisioningFailed {
        exit_code: Some(8),
        output_tail: vec![String::from("ERROR! Failed to install app '2131400' (No subscription)")],
        relaunched_pid: Some(4242),
        location: here(),
    }
    .into();
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "PROVISIONING_FAILED");
    assert_eq!(json["error"]["details"]["exit_code"], 8);
    assert_eq!(json["error"]["details"]["relaunched_pid"], 4242);
    assert!(
        json["error"]["details"]["output_tail"][0]
            .as_str()
            .unwrap()
            .contains("No subscription")
    );
}

#[tokio::test]
async fn test_missing_executable_maps_to_500_with_candidates() {
    let error: ApiError = LifecycleError::MissingExecutable {
        install_dir: "/srv/vein".into(),
        candidates: vec![String::from("VeinServer.sh"), String::from("VeinServer")],
        location: here(),
    }
    .into();
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "MISSING_EXECUTABLE");
    assert!(
        json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("VeinServer.sh, VeinServer")
    );
}

#[tokio::test]
async fn test_configuration_error_maps_to_503() {
    let error: ApiError = LifecycleError::configuration("provisioning.app_id is not set").into();
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "CONFIGURATION_ERROR");
}

#[tokio::test]
async fn test_io_error_hides_details() {
    let error: ApiError = LifecycleError::from(std::io::Error::other("disk on fire")).into();
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "IO_ERROR");
    assert!(!json["error"]["message"].as_str().unwrap().contains("fire"));
}

#[tokio::test]
async fn test_auth_errors_map_to_401_and_429() {
    let missing: ApiError = AuthError::MissingApiKey { location: here() }.into();
    let limited: ApiError = AuthError::RateLimitExceeded {
        limit: 10,
        window_secs: 60,
        location: here(),
    }
    .into();

    let missing = missing.into_response();
    let limited = limited.into_response();

    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(missing).await["error"]["code"], "MISSING_API_KEY");
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_body(limited).await["error"]["code"], "RATE_LIMIT_EXCEEDED");
}

#[test]
fn test_error_message_never_contains_source_location() {
    let body = ApiError::internal("boom").into_body();

    assert_eq!(body.code, "INTERNAL_ERROR");
    assert!(!body.message.contains(".rs"));
}
