use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "mindcheck-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Ready once the pool answers and the check-ins schema is in place.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let schema = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'check_ins'",
    )
    .fetch_one(&state.db)
    .await;

    let (database, check_ins) = match schema {
        Ok(tables) => ("ok", if tables > 0 { "ok" } else { "missing" }),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe could not reach the database");
            ("failed", "unknown")
        }
    };

    let ready = database == "ok" && check_ins == "ok";
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if ready { "ready" } else { "not_ready" },
            "checks": { "database": database, "check_ins_table": check_ins },
        })),
    )
}
