use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use shared::domain::Floor;
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Clone, Default)]
struct ServerState {
    presses: Arc<Mutex<Vec<FloorRequest>>>,
    status_queries: Arc<Mutex<Vec<String>>>,
}

async fn handle_press(
    State(state): State<ServerState>,
    Json(payload): Json<FloorRequest>,
) -> Json<serde_json::Value> {
    let accepted = payload.floor.number() % 2 == 0;
    state.presses.lock().await.push(payload);
    if accepted {
        Json(serde_json::json!({"success": true}))
    } else {
        Json(serde_json::json!({"success": false, "message": "Invalid floor for this elevator."}))
    }
}

async fn handle_status(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    let elevator = query.get("elevator_id").cloned().unwrap_or_default();
    state.status_queries.lock().await.push(elevator.clone());
    if elevator != "E1" {
        return Json(serde_json::json!({"error": "Invalid elevator id"}));
    }
    Json(serde_json::json!({
        "current_floor": 2,
        "door_open": false,
        "moving": true,
        "direction": "up",
        "queue": [6],
        "log": ["Floor 6 requested.", "Moving up to floor 2."],
        "dfa_trace": "q0>q2"
    }))
}

async fn handle_validate(Json(payload): Json<FloorRequest>) -> Json<ValidateButtonResponse> {
    Json(ValidateButtonResponse {
        valid: payload.floor.number() % 2 == 0,
    })
}

async fn spawn_controller(mount: Option<&str>) -> anyhow::Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let routes = Router::new()
        .route("/press_button", post(handle_press))
        .route("/get_status", get(handle_status))
        .route("/validate_button", post(handle_validate))
        .with_state(state.clone());
    let (app, base) = match mount {
        Some(prefix) => (
            Router::new().nest(prefix, routes),
            format!("http://{addr}{prefix}"),
        ),
        None => (routes, format!("http://{addr}")),
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((base, state))
}

fn request(elevator: &str, floor: i64) -> FloorRequest {
    FloorRequest {
        elevator_id: ElevatorId::new(elevator),
        floor: Floor::new(floor).expect("floor"),
    }
}

#[test]
fn base_url_gains_trailing_slash() {
    let url = normalize_base_url("http://lift.local:5000/panel").expect("url");
    assert_eq!(url.as_str(), "http://lift.local:5000/panel/");
    assert_eq!(
        url.join("get_status").expect("join").as_str(),
        "http://lift.local:5000/panel/get_status"
    );
}

#[test]
fn rejects_non_http_controller_url() {
    let err = normalize_base_url("ftp://lift.local").expect_err("must fail");
    assert!(matches!(
        err.downcast_ref::<ClientError>(),
        Some(ClientError::InvalidControllerUrl { .. })
    ));
    assert!(normalize_base_url("not a url").is_err());
}

#[tokio::test]
async fn press_button_posts_wire_body() {
    let (base, state) = spawn_controller(None).await.expect("spawn server");
    let controller = HttpElevatorController::new(&base, None).expect("controller");

    let accepted = controller
        .press_button(&request("E1", 4))
        .await
        .expect("press");
    let rejected = controller
        .press_button(&request("E1", 5))
        .await
        .expect("press");

    assert!(accepted.success);
    assert_eq!(accepted.message, None);
    assert!(!rejected.success);
    assert_eq!(
        rejected.message.as_deref(),
        Some("Invalid floor for this elevator.")
    );
    assert_eq!(
        state.presses.lock().await.as_slice(),
        &[request("E1", 4), request("E1", 5)]
    );
}

#[tokio::test]
async fn get_status_sends_elevator_query_under_mount_path() {
    let (base, state) = spawn_controller(Some("/lift")).await.expect("spawn server");
    let controller = HttpElevatorController::new(&base, None).expect("controller");

    let status = controller
        .get_status(&ElevatorId::new("E1"))
        .await
        .expect("status");

    assert_eq!(status.current_floor, Some(Floor::new(2).expect("floor")));
    assert_eq!(status.door_open, Some(false));
    assert_eq!(status.dfa_trace.as_deref(), Some("q0>q2"));
    assert_eq!(status.log.as_ref().map(Vec::len), Some(2));
    assert_eq!(state.status_queries.lock().await.as_slice(), &["E1".to_string()]);
}

#[tokio::test]
async fn get_status_passes_controller_error_through() {
    let (base, _state) = spawn_controller(None).await.expect("spawn server");
    let controller = HttpElevatorController::new(&base, None).expect("controller");

    let status = controller
        .get_status(&ElevatorId::new("E9"))
        .await
        .expect("status");

    assert_eq!(status.error.as_deref(), Some("Invalid elevator id"));
    assert_eq!(status.current_floor, None);
}

#[tokio::test]
async fn validate_button_reads_verdict() {
    let (base, _state) = spawn_controller(None).await.expect("spawn server");
    let controller = HttpElevatorController::new(&base, None).expect("controller");

    assert!(controller
        .validate_button(&request("E1", 2))
        .await
        .expect("validate")
        .valid);
    assert!(!controller
        .validate_button(&request("E1", 3))
        .await
        .expect("validate")
        .valid);
}

#[tokio::test]
async fn missing_endpoint_surfaces_http_error() {
    let (base, _state) = spawn_controller(Some("/lift")).await.expect("spawn server");
    let controller =
        HttpElevatorController::new(&format!("{base}/broken-mount"), None).expect("controller");

    assert!(controller.get_status(&ElevatorId::new("E1")).await.is_err());
}

#[tokio::test]
async fn unreachable_controller_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let controller = HttpElevatorController::new(
        &format!("http://{addr}"),
        Some(std::time::Duration::from_secs(2)),
    )
    .expect("controller");

    let err = controller
        .press_button(&request("E1", 2))
        .await
        .expect_err("must fail");
    assert!(format!("{err:#}").contains("press_button request failed"));
}

#[tokio::test]
async fn stalled_controller_is_cut_off_by_request_timeout() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route(
        "/get_status",
        get(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Json(serde_json::json!({"current_floor": 0, "door_open": false}))
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let controller = HttpElevatorController::new(
        &format!("http://{addr}"),
        Some(std::time::Duration::from_millis(200)),
    )
    .expect("controller");

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        controller.get_status(&ElevatorId::new("E1")),
    )
    .await
    .expect("request must not outlive its timeout");
    assert!(result.is_err());
}
