use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::ui::web::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) async fn api_status(State(state): State<AppState>) -> Json<Value> {
    let binds: Vec<String> = state.bind_addrs.iter().map(|a| a.to_string()).collect();
    Json(json!({
        "version": VERSION,
        "bind_addrs": binds,
        "debug": state.debug,
    }))
}
