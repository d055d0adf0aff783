//! Queue service: flush and list over HTTP.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::queue::ReloadQueue;

use super::error::RpcError;
use super::types::{ErrorResponse, FlushOpts, FlushResponse, ListResponse};

pub const FLUSH_PATH: &str = "/flush";
pub const LIST_PATH: &str = "/list";

/// Request handlers over the shared queue.
///
/// Adds no locking of its own; every call maps onto one queue operation.
#[derive(Clone)]
pub struct QueueService {
    queue: Arc<ReloadQueue>,
    queue_enabled: bool,
}

impl QueueService {
    pub fn new(queue: Arc<ReloadQueue>, queue_enabled: bool) -> Self {
        Self {
            queue,
            queue_enabled,
        }
    }

    /// Execute or clear queued keys. Empty `keys` acts on the whole queue.
    ///
    /// Commands run on the blocking pool so other requests keep being served.
    pub async fn flush(&self, opts: FlushOpts) -> Result<Vec<String>, RpcError> {
        if !self.queue_enabled {
            return Err(RpcError::QueueDisabled);
        }

        let queue = self.queue.clone();
        let FlushOpts { keys, clear } = opts;
        let processed = tokio::task::spawn_blocking(move || queue.flush(&keys, clear))
            .await
            .map_err(|e| RpcError::Internal(format!("flush task failed: {e}")))?;

        let action = if clear { "cleared" } else { "executed" };
        crate::log_event!("rpc", action, "{}", processed.join(", "));
        Ok(processed)
    }

    /// Snapshot of the queue.
    pub fn list(&self) -> Result<Vec<String>, RpcError> {
        if !self.queue_enabled {
            return Err(RpcError::QueueDisabled);
        }
        Ok(self.queue.list())
    }

    pub fn router(self) -> Router {
        Router::new()
            .route(FLUSH_PATH, post(flush_handler))
            .route(LIST_PATH, get(list_handler))
            .with_state(self)
    }
}

async fn flush_handler(State(service): State<QueueService>, Json(opts): Json<FlushOpts>) -> Response {
    crate::debug_event!("rpc", "flush", "{opts:?}");
    match service.flush(opts).await {
        Ok(processed) => Json(FlushResponse { processed }).into_response(),
        Err(e) => error_response(e),
    }
}

async fn list_handler(State(service): State<QueueService>) -> Response {
    crate::debug_event!("rpc", "list");
    match service.list() {
        Ok(config_keys) => Json(ListResponse { config_keys }).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: RpcError) -> Response {
    let status = match err {
        RpcError::QueueDisabled => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Serve the queue service on `listener` until `cancel` fires.
pub async fn serve(
    listener: TcpListener,
    service: QueueService,
    cancel: CancellationToken,
    span: Span,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    async move {
        crate::log_event!("rpc", "listening", "{addr}");
        axum::serve(listener, service.router())
            .with_graceful_shutdown(cancel.cancelled_owned())
            .await?;
        crate::log_event!("rpc", "stopped");
        Ok(())
    }
    .instrument(span)
    .await
}
