//! Axum middleware running the edge gate in front of a router.
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use std::sync::Arc;
//! use worldgate::{integrations::axum::protect, EdgeGate, GateConfig};
//!
//! # fn build() -> Result<Router, worldgate::GateError> {
//! let gate = Arc::new(EdgeGate::new(GateConfig::from_env())?);
//! let app = protect(Router::new().route("/api/data", get(|| async { "ok" })), gate);
//! # Ok(app)
//! # }
//! ```

use crate::edge::gate::{EdgeGate, Verdict};
use ::axum::{
    body::Body,
    extract::{Request, State},
    middleware::{from_fn_with_state, Next},
    response::Response,
    Router,
};
use std::sync::Arc;

/// Middleware function: answer denials here, pass everything else on.
pub async fn edge_gate_middleware(
    State(gate): State<Arc<EdgeGate>>,
    request: Request,
    next: Next,
) -> Response {
    match gate.evaluate(&request) {
        Verdict::Pass => next.run(request).await,
        Verdict::Deny(denial) => denial.into_response().map(Body::from),
    }
}

/// Wrap every route of `router` with the edge gate.
pub fn protect<S>(router: Router<S>, gate: Arc<EdgeGate>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(gate, edge_gate_middleware))
}
