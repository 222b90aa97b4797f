use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;

use super::types::{
    CommandRequest, CommandResponse, ENDPOINT_COMMAND, ENDPOINT_STATUS, StatusResponse,
};
use crate::routing::packet::PacketBody;
use crate::routing::router::RingRouter;

pub fn router(ring: Arc<RingRouter>) -> Router {
    Router::new()
        .route(ENDPOINT_COMMAND, post(handle_command))
        .route(ENDPOINT_STATUS, get(handle_status))
        .layer(Extension(ring))
}

/// Hands an external command to every current neighbor, from where it travels
/// around the ring.
pub async fn handle_command(
    Extension(ring): Extension<Arc<RingRouter>>,
    Json(req): Json<CommandRequest>,
) -> (StatusCode, Json<CommandResponse>) {
    if req.command.is_empty() {
        tracing::warn!("Rejected command request without a command");
        return (
            StatusCode::BAD_REQUEST,
            Json(CommandResponse { sent_to: 0 }),
        );
    }

    let body = PacketBody::Command {
        command: req.command,
        message: req.message,
    };
    let sent_to = ring.broadcast(body).await;

    if sent_to == 0 {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(CommandResponse { sent_to }),
        );
    }

    (StatusCode::ACCEPTED, Json(CommandResponse { sent_to }))
}

pub async fn handle_status(
    Extension(ring): Extension<Arc<RingRouter>>,
) -> (StatusCode, Json<StatusResponse>) {
    let state = ring.state();
    let all_nodes = state.snapshot().await;
    let neighbors = state.neighbors().await;

    (
        StatusCode::OK,
        Json(StatusResponse {
            node: state.self_id,
            address: state.own_addr,
            neighbors: neighbors.addresses().to_vec(),
            all_nodes,
            unroutable: ring.unroutable_count(),
            outstanding_broadcasts: ring.tracker().outstanding(),
        }),
    )
}
