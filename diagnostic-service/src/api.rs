use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use motor_client::{
    domain::MotorRecord,
    registry::{ClientSummary, MotorRegistry, MotorSummary},
};
use serde::Serialize;

use crate::{analysis::DiagnosticBundle, report, sources::MeasurementCsvSource};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<MotorRegistry>,
    pub default_nominal_voltage: f64,
    pub delimiter: u8,
}

#[derive(Serialize)]
struct Liveness {
    message: &'static str,
}

type ApiError = (StatusCode, String);

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/api/clients", get(list_clients))
        .route("/api/clients/:client_id/motors", get(list_client_motors))
        .route("/api/records", get(list_records))
        .route("/api/diagnostics/:motor_id", post(run_diagnostics))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn liveness() -> Json<Liveness> {
    Json(Liveness {
        message: "diagnostic service is online",
    })
}

async fn list_clients(State(state): State<AppState>) -> Json<Vec<ClientSummary>> {
    Json(state.registry.clients())
}

async fn list_client_motors(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Json<Vec<MotorSummary>> {
    Json(state.registry.motors_for_client(client_id))
}

async fn list_records(State(state): State<AppState>) -> Json<Vec<MotorRecord>> {
    Json(state.registry.records().to_vec())
}

/// Body is the raw measurement export for the motor.
async fn run_diagnostics(
    State(state): State<AppState>,
    Path(motor_id): Path<String>,
    body: Bytes,
) -> Result<Json<DiagnosticBundle>, ApiError> {
    metrics::counter!("http_diagnostic_requests_total").increment(1);

    let motor = state
        .registry
        .find_motor(&motor_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("motor {motor_id} not found")))?;
    let ratings = motor.ratings(state.default_nominal_voltage);

    let source = MeasurementCsvSource::from_bytes(body.to_vec()).with_delimiter(state.delimiter);
    let bundle = report::diagnose(source, ratings).await.map_err(|e| {
        tracing::warn!(error = %e, motor_id = %motor_id, "measurement upload rejected");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    Ok(Json(bundle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::util::ServiceExt;

    const REGISTRY_CSV: &str = "\
client_id,client_name,motor_id,motor_description,install_location,nominal_current,power_cv,connection_type,nominal_voltage_v,tariff_group,contact_phone,contact_email,installed_on,device_id,notes
7,Cooperativa Vale,m-01,Bomba principal,,25,20,,,,,,,,
";

    fn app() -> Router {
        let registry = MotorRegistry::from_reader(REGISTRY_CSV.as_bytes()).unwrap();
        router(
            AppState {
                registry: Arc::new(registry),
                default_nominal_voltage: 380.0,
                delimiter: b';',
            },
            64 * 1024,
        )
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn lists_clients_and_motors() {
        let resp = app()
            .oneshot(Request::builder().uri("/api/clients").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!([{ "client_id": 7, "client_name": "Cooperativa Vale" }])
        );

        let resp = app()
            .oneshot(Request::builder().uri("/api/clients/7/motors").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(resp).await[0]["motor_id"], "m-01");
    }

    #[tokio::test]
    async fn diagnostics_for_registered_motor() {
        let csv = "Time;AVRMS;BVRMS;CVRMS;AIRMS;BIRMS;CIRMS\n\
                   01/05/2024 00:00:00;380;381;379;20;20;20\n\
                   01/05/2024 01:00:00;381;380;380;20.5;20;20\n";
        let resp = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/diagnostics/m-01")
                    .header("content-type", "text/csv")
                    .body(Body::from(csv))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["nominal_voltage"], "380");
        assert!(json["final_conclusion"].as_str().unwrap().contains("CONFORMANT"));
        assert!(json["current"].as_str().unwrap().contains("CONFORMANT"));
    }

    #[tokio::test]
    async fn unknown_motor_is_not_found() {
        let resp = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/diagnostics/nope")
                    .body(Body::from("Time;AVRMS\n"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unreadable_csv_is_bad_request() {
        let mut body = b"Time;AVR".to_vec();
        body.extend_from_slice(&[0xff, 0xfe]);
        body.extend_from_slice(b"MS\n01/05/2024 00:00:00;380\n");

        let resp = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/diagnostics/m-01")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let body = vec![b'x'; 64 * 1024 + 1];

        let resp = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/diagnostics/m-01")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
