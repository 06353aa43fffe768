//! In-process stand-in for the NSE landing page and option-chain API.

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Copy)]
pub enum Behaviour {
    /// Always answer the API with this status.
    Status(StatusCode),
    /// Answer with a chain for the requested symbol.
    Chain,
    /// Fail with 503 this many times, then answer with a chain.
    FailThenChain(usize),
    /// 200 with an HTML body.
    Html,
    /// 503 for this symbol, a chain for every other one.
    FailSymbol(&'static str),
}

#[derive(Default)]
pub struct Hits {
    pub landing: AtomicUsize,
    pub api: AtomicUsize,
}

impl Hits {
    pub fn landing(&self) -> usize {
        self.landing.load(Ordering::SeqCst)
    }

    pub fn api(&self) -> usize {
        self.api.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct MockState {
    behaviour: Behaviour,
    hits: Arc<Hits>,
}

/// Spot prices the mock reports per symbol.
pub fn spot_for(symbol: &str) -> f64 {
    match symbol {
        "BANKNIFTY" => 45020.0,
        "FINNIFTY" => 21000.0,
        _ => 20010.0,
    }
}

/// Chain where the ATM strike sits below both OI pins.
pub fn sample_chain(symbol: &str) -> Value {
    let spot = spot_for(symbol);
    let step = if symbol == "BANKNIFTY" { 100.0 } else { 50.0 };
    let atm = (spot / step).round() * step;

    json!({
        "records": {
            "timestamp": "16-Oct-2026 15:30:00",
            "underlyingValue": spot,
            "data": [
                {
                    "strikePrice": atm,
                    "CE": { "openInterest": 300, "lastPrice": 110.0 },
                    "PE": { "openInterest": 400, "lastPrice": 35.0 }
                },
                {
                    "strikePrice": atm + step,
                    "CE": { "openInterest": 500, "lastPrice": 80.0 },
                    "PE": { "openInterest": 600, "lastPrice": 60.0 }
                },
                {
                    "strikePrice": atm + 2.0 * step,
                    "CE": { "openInterest": 9000, "lastPrice": 40.0 },
                    "PE": { "openInterest": 8000, "lastPrice": 95.0 }
                }
            ]
        }
    })
}

async fn landing(State(state): State<MockState>) -> impl IntoResponse {
    state.hits.landing.fetch_add(1, Ordering::SeqCst);
    (
        [(header::SET_COOKIE, "nsit=session-token; Path=/")],
        "<html><body>NSE</body></html>",
    )
}

async fn option_chain(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let hit = state.hits.api.fetch_add(1, Ordering::SeqCst) + 1;

    let has_session = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.contains("nsit="));
    if !has_session {
        return (StatusCode::UNAUTHORIZED, "missing session").into_response();
    }

    let symbol = query.get("symbol").cloned().unwrap_or_default();
    match state.behaviour {
        Behaviour::Status(code) => (code, "upstream unavailable").into_response(),
        Behaviour::Chain => Json(sample_chain(&symbol)).into_response(),
        Behaviour::FailThenChain(n) if hit <= n => {
            (StatusCode::SERVICE_UNAVAILABLE, "busy").into_response()
        }
        Behaviour::FailThenChain(_) => Json(sample_chain(&symbol)).into_response(),
        Behaviour::Html => "<html>Access Denied</html>".into_response(),
        Behaviour::FailSymbol(failing) if symbol == failing => {
            (StatusCode::SERVICE_UNAVAILABLE, "upstream unavailable").into_response()
        }
        Behaviour::FailSymbol(_) => Json(sample_chain(&symbol)).into_response(),
    }
}

/// Start the mock on an ephemeral port; returns its base URL and hit counters.
pub async fn spawn_mock(behaviour: Behaviour) -> (String, Arc<Hits>) {
    let hits = Arc::new(Hits::default());
    let state = MockState {
        behaviour,
        hits: Arc::clone(&hits),
    };

    let app = Router::new()
        .route("/", get(landing))
        .route("/api/option-chain-indices", get(option_chain))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), hits)
}
