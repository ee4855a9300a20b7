//! HTTP routes for trigger intake.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};
use trigger::{
    handle_trigger_body, submit, ExecutionHost, ExecutionId, JobCatalog, TriggerOutcome,
};

use crate::{FaultSignal, ListenerError, TokenVerifier};

/// Path of the trigger endpoint. `{job}` is the job name.
pub const TRIGGER_PATH: &str = "/job/{job}/jji/build";

/// Shared state of the trigger endpoint. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<dyn JobCatalog>,
    host: Arc<dyn ExecutionHost>,
    verifier: Arc<dyn TokenVerifier>,
    fault: FaultSignal,
}

impl AppState {
    /// Wires the endpoint to its collaborators.
    pub fn new(
        catalog: Arc<dyn JobCatalog>,
        host: Arc<dyn ExecutionHost>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            catalog,
            host,
            verifier,
            fault: FaultSignal::new(),
        }
    }

    /// The signal raised when the execution host turns out to be unavailable.
    pub fn fault(&self) -> &FaultSignal {
        &self.fault
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Created {
    execution_id: ExecutionId,
}

/// Builds the router for the trigger endpoint and the health check.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(TRIGGER_PATH, post(trigger_build))
        .route("/health", get(health))
        .with_state(state)
}

/// Serves `state` on `listener` until `shutdown` completes or a fault is raised.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let fault = state.fault.clone();
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Trigger listener accepting requests");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            tokio::select! {
                () = shutdown => info!("Shutdown requested"),
                message = fault.raised() => error!(fault = %message, "Stopping after unrecoverable fault"),
            }
        })
        .await
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip_all, fields(job = %job))]
async fn trigger_build(
    State(state): State<AppState>,
    Path(job): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ListenerError> {
    if let Err(err) = state.verifier.verify(&headers) {
        warn!(error = %err, "Rejected unauthenticated trigger");
        return Err(err);
    }

    let target = state
        .catalog
        .find_job(&job)
        .ok_or_else(|| ListenerError::UnknownJob(job.clone()))?;

    let request = match handle_trigger_body(target.as_ref(), &body) {
        Ok(TriggerOutcome::Accepted(request)) => request,
        Ok(TriggerOutcome::Rejected(rejection)) => {
            info!(reason = %rejection, "Trigger not accepted");
            let status =
                StatusCode::from_u16(rejection.status_code()).unwrap_or(StatusCode::NOT_ACCEPTABLE);
            return Ok((status, "Not Acceptable").into_response());
        }
        Err(err) => {
            info!(error = %err, "Trigger payload rejected");
            return Err(err.into());
        }
    };

    match submit(state.host.as_ref(), request) {
        Ok(execution_id) => Ok((StatusCode::CREATED, Json(Created { execution_id })).into_response()),
        Err(err) => {
            if err.is_unrecoverable() {
                state.fault.raise(err.to_string());
            }
            Err(ListenerError::Trigger(err))
        }
    }
}

