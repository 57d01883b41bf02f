//! 紧急停止：开启后 `/api/parking/*` 一律返回 503。

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use parking_telemetry::record_kill_switch_rejection;
use tracing::warn;

use crate::AppState;
use crate::utils::response::kill_switch_error;

pub async fn kill_switch_guard(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if state.kill_switch {
        record_kill_switch_rejection();
        warn!(
            target: "parking.api",
            event = "kill_switch_rejected",
            method = %req.method(),
            path = %req.uri().path()
        );
        return kill_switch_error();
    }
    next.run(req).await
}
