// HTTP surface of the connector
// Thin routing only: decode the body, call the engine, render the reply.
// Status mapping: decode failures and illegal transitions are client errors
// (400), unaddressable processes are 404, lost write races are 409.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use catalog::CatalogStore;
use negotiation::{NegotiationEngine, NegotiationError};
use process_store::{NegotiationProcess, ProcessId, ProcessStore, TransferProcess};
use protocol_messages::discovery::ProtocolVersions;
use protocol_messages::negotiation::{ContractNegotiation, ContractNegotiationError};
use protocol_messages::transfer::{TransferError as TransferErrorReply, TransferProcessAck};
use protocol_messages::{
    MessageError, NegotiationMessage, TransferMessage, DSPACE_CONTEXT,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use transfer::TransferEngine;

use crate::metrics::METRICS;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub negotiation: Arc<NegotiationEngine>,
    pub transfer: Arc<TransferEngine>,
    pub store: Arc<dyn ProcessStore>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/.well-known/dspace-version", get(version_discovery))
        .route("/catalog/request", post(catalog_request))
        .route("/catalog/datasets/:id", get(get_dataset))
        .route("/negotiations/request", post(negotiation_request))
        .route(
            "/negotiations/:consumer_pid/:provider_pid",
            get(get_negotiation),
        )
        .route(
            "/negotiations/:consumer_pid/:provider_pid/messages",
            post(negotiation_message),
        )
        .route("/transfers/request", post(transfer_request))
        .route("/transfers/:consumer_pid/:provider_pid", get(get_transfer))
        .route(
            "/transfers/:consumer_pid/:provider_pid/messages",
            post(transfer_message),
        )
        .route("/healthz", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Error handling

pub enum ApiError {
    NegotiationDecode(MessageError),
    Negotiation(NegotiationError),
    TransferDecode(MessageError),
    Transfer(transfer::Error),
    CatalogDecode(MessageError),
    DatasetNotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NegotiationDecode(err) => {
                METRICS.decode_errors_total.inc();
                negotiation_error_reply(StatusCode::BAD_REQUEST, "MALFORMED_MESSAGE", err.to_string())
            }
            ApiError::Negotiation(err) => {
                let (status, code) = match &err {
                    NegotiationError::InvalidOffer(_) => (StatusCode::BAD_REQUEST, "INVALID_OFFER"),
                    NegotiationError::InvalidTransition { .. } => {
                        METRICS.invalid_transitions_total.inc();
                        (StatusCode::BAD_REQUEST, "INVALID_TRANSITION")
                    }
                    NegotiationError::ProcessMismatch(_) => {
                        (StatusCode::NOT_FOUND, "PROCESS_MISMATCH")
                    }
                    NegotiationError::Conflict(_) => {
                        METRICS.store_conflicts_total.inc();
                        (StatusCode::CONFLICT, "CONFLICT")
                    }
                    NegotiationError::Store(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
                    }
                };
                negotiation_error_reply(status, code, err.to_string())
            }
            ApiError::TransferDecode(err) => {
                METRICS.decode_errors_total.inc();
                transfer_error_reply(StatusCode::BAD_REQUEST, "MALFORMED_MESSAGE", err.to_string())
            }
            ApiError::Transfer(err) => {
                let (status, code) = match &err {
                    transfer::Error::AgreementNotFound(_) => {
                        (StatusCode::NOT_FOUND, "AGREEMENT_NOT_FOUND")
                    }
                    transfer::Error::AgreementNotFinalized { .. } => {
                        (StatusCode::CONFLICT, "AGREEMENT_NOT_FINALIZED")
                    }
                    transfer::Error::InvalidTransition { .. } => {
                        METRICS.invalid_transitions_total.inc();
                        (StatusCode::BAD_REQUEST, "INVALID_TRANSITION")
                    }
                    transfer::Error::ProcessMismatch(_) => {
                        (StatusCode::NOT_FOUND, "PROCESS_MISMATCH")
                    }
                    transfer::Error::Conflict(_) => {
                        METRICS.store_conflicts_total.inc();
                        (StatusCode::CONFLICT, "CONFLICT")
                    }
                    transfer::Error::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
                };
                transfer_error_reply(status, code, err.to_string())
            }
            ApiError::CatalogDecode(err) => {
                METRICS.decode_errors_total.inc();
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": err.to_string()})),
                )
                    .into_response()
            }
            ApiError::DatasetNotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(json!({"error": format!("dataset not found: {}", id)})),
            )
                .into_response(),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": message})),
            )
                .into_response(),
        }
    }
}

fn negotiation_error_reply(status: StatusCode, code: &str, detail: String) -> Response {
    let body = ContractNegotiationError {
        context: vec![DSPACE_CONTEXT.to_string()],
        consumer_pid: None,
        provider_pid: None,
        code: Some(code.to_string()),
        reason: vec![json!({"value": detail})],
    };
    (status, Json(body)).into_response()
}

fn transfer_error_reply(status: StatusCode, code: &str, detail: String) -> Response {
    let body = TransferErrorReply {
        context: vec![DSPACE_CONTEXT.to_string()],
        consumer_pid: None,
        provider_pid: None,
        code: Some(code.to_string()),
        reason: vec![json!({"value": detail})],
    };
    (status, Json(body)).into_response()
}

// Reply rendering

fn negotiation_reply(process: &NegotiationProcess) -> ContractNegotiation {
    ContractNegotiation {
        context: vec![DSPACE_CONTEXT.to_string()],
        id: process.process_id.provider_pid.clone(),
        consumer_pid: process.process_id.consumer_pid.clone(),
        provider_pid: process.process_id.provider_pid.clone(),
        state: process.state,
    }
}

fn transfer_reply(process: &TransferProcess) -> TransferProcessAck {
    TransferProcessAck {
        context: vec![DSPACE_CONTEXT.to_string()],
        id: process.process_id.provider_pid.clone(),
        consumer_pid: process.process_id.consumer_pid.clone(),
        provider_pid: process.process_id.provider_pid.clone(),
        state: process.state,
    }
}

// Version discovery

async fn version_discovery() -> Json<ProtocolVersions> {
    METRICS.http_requests_total.inc();
    Json(ProtocolVersions::current())
}

// Catalog endpoints

async fn catalog_request(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    METRICS.http_requests_total.inc();

    let message = match protocol_messages::decode(&body) {
        Ok(protocol_messages::ProtocolMessage::CatalogRequest(message)) => message,
        Ok(_) => {
            return Err(ApiError::CatalogDecode(MessageError::UnknownType(
                "expected dspace:CatalogRequestMessage".to_string(),
            )))
        }
        Err(err) => return Err(ApiError::CatalogDecode(err)),
    };
    debug!(filters = message.filter.len(), "catalog requested");

    let catalog = state.catalog.catalog();
    serde_json::to_value(&catalog)
        .map(Json)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

async fn get_dataset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    METRICS.http_requests_total.inc();

    let dataset = state
        .catalog
        .dataset(&id)
        .ok_or_else(|| ApiError::DatasetNotFound(id.clone()))?;

    let mut value =
        serde_json::to_value(&dataset).map_err(|e| ApiError::Internal(e.to_string()))?;
    value["@context"] = json!([DSPACE_CONTEXT]);
    Ok(Json(value))
}

// Negotiation endpoints

async fn negotiation_request(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ContractNegotiation>), ApiError> {
    METRICS.http_requests_total.inc();

    let message = NegotiationMessage::decode(&body).map_err(ApiError::NegotiationDecode)?;
    let NegotiationMessage::Request(request) = message else {
        return Err(ApiError::NegotiationDecode(MessageError::UnknownType(
            "expected dspace:ContractRequestMessage".to_string(),
        )));
    };
    let creating = request.provider_pid.is_none();

    let process = state
        .negotiation
        .submit(NegotiationMessage::Request(request))
        .map_err(ApiError::Negotiation)?;

    if creating {
        METRICS.negotiations_created_total.inc();
        info!(process = %process.process_id, "negotiation opened");
        Ok((StatusCode::CREATED, Json(negotiation_reply(&process))))
    } else {
        METRICS.negotiation_transitions_total.inc();
        Ok((StatusCode::OK, Json(negotiation_reply(&process))))
    }
}

async fn negotiation_message(
    State(state): State<AppState>,
    Path((consumer_pid, provider_pid)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<ContractNegotiation>, ApiError> {
    METRICS.http_requests_total.inc();

    let message = NegotiationMessage::decode(&body).map_err(ApiError::NegotiationDecode)?;
    check_pids(
        &consumer_pid,
        &provider_pid,
        message.consumer_pid(),
        message.provider_pid(),
    )
    .map_err(|detail| ApiError::Negotiation(NegotiationError::ProcessMismatch(detail)))?;

    let process = state
        .negotiation
        .submit(message)
        .map_err(ApiError::Negotiation)?;
    METRICS.negotiation_transitions_total.inc();

    Ok(Json(negotiation_reply(&process)))
}

async fn get_negotiation(
    State(state): State<AppState>,
    Path((consumer_pid, provider_pid)): Path<(String, String)>,
) -> Result<Json<ContractNegotiation>, ApiError> {
    METRICS.http_requests_total.inc();

    let id = ProcessId::new(consumer_pid, provider_pid);
    let process = state
        .negotiation
        .get(&id)
        .map_err(ApiError::Negotiation)?
        .ok_or_else(|| {
            ApiError::Negotiation(NegotiationError::ProcessMismatch(format!(
                "no negotiation for process {}",
                id
            )))
        })?;

    Ok(Json(negotiation_reply(&process)))
}

// Transfer endpoints

async fn transfer_request(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<TransferProcessAck>), ApiError> {
    METRICS.http_requests_total.inc();

    let message = TransferMessage::decode(&body).map_err(ApiError::TransferDecode)?;
    let TransferMessage::Request(request) = message else {
        return Err(ApiError::TransferDecode(MessageError::UnknownType(
            "expected dspace:TransferRequestMessage".to_string(),
        )));
    };

    let process = state
        .transfer
        .submit(TransferMessage::Request(request))
        .map_err(ApiError::Transfer)?;
    METRICS.transfers_created_total.inc();
    info!(process = %process.process_id, agreement = %process.agreement_id, "transfer opened");

    Ok((StatusCode::CREATED, Json(transfer_reply(&process))))
}

async fn transfer_message(
    State(state): State<AppState>,
    Path((consumer_pid, provider_pid)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<TransferProcessAck>, ApiError> {
    METRICS.http_requests_total.inc();

    let message = TransferMessage::decode(&body).map_err(ApiError::TransferDecode)?;
    check_pids(
        &consumer_pid,
        &provider_pid,
        Some(message.consumer_pid()),
        message.provider_pid(),
    )
    .map_err(|detail| ApiError::Transfer(transfer::Error::ProcessMismatch(detail)))?;

    let process = state.transfer.submit(message).map_err(ApiError::Transfer)?;
    METRICS.transfer_transitions_total.inc();

    Ok(Json(transfer_reply(&process)))
}

async fn get_transfer(
    State(state): State<AppState>,
    Path((consumer_pid, provider_pid)): Path<(String, String)>,
) -> Result<Json<TransferProcessAck>, ApiError> {
    METRICS.http_requests_total.inc();

    let id = ProcessId::new(consumer_pid, provider_pid);
    let process = state
        .transfer
        .get(&id)
        .map_err(ApiError::Transfer)?
        .ok_or_else(|| {
            ApiError::Transfer(transfer::Error::ProcessMismatch(format!(
                "no transfer for process {}",
                id
            )))
        })?;

    Ok(Json(transfer_reply(&process)))
}

// Body pids, when present, must agree with the path
fn check_pids(
    path_consumer: &str,
    path_provider: &str,
    body_consumer: Option<&str>,
    body_provider: Option<&str>,
) -> Result<(), String> {
    if let Some(consumer) = body_consumer {
        if consumer != path_consumer {
            return Err(format!(
                "body consumerPid {} does not match path {}",
                consumer, path_consumer
            ));
        }
    }
    if let Some(provider) = body_provider {
        if provider != path_provider {
            return Err(format!(
                "body providerPid {} does not match path {}",
                provider, path_provider
            ));
        }
    }
    Ok(())
}

// Operational endpoints

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    store_reachable: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let probe = ProcessId::new("urn:uuid:health-probe", "urn:uuid:health-probe");
    let store_reachable = state.store.get_negotiation(&probe).is_ok();

    Json(HealthResponse {
        status: if store_reachable { "healthy" } else { "degraded" },
        service: "connector-gateway",
        version: env!("CARGO_PKG_VERSION"),
        store_reachable,
    })
}

async fn metrics_handler() -> Result<String, ApiError> {
    METRICS
        .export()
        .map_err(|e| ApiError::Internal(format!("Failed to export metrics: {}", e)))
}
