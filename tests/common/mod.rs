//! In-process fake of the recommendation service for integration tests.
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::Notify;

/// Canned reply for one route
#[derive(Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, String),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(status, body) => (status, Json(body)).into_response(),
            Reply::Text(status, body) => (status, body).into_response(),
        }
    }
}

pub struct FakeState {
    pub stats: Mutex<Reply>,
    pub catalog: Mutex<Reply>,
    pub recommend: Mutex<Reply>,
    pub classify: Mutex<Reply>,
    /// Bodies received on /recomendar and /clasificar, in arrival order
    pub requests: Mutex<Vec<Value>>,
    /// Request ids received on any route
    pub request_ids: Mutex<Vec<String>>,
    pub recommend_calls: AtomicUsize,
    /// When set, /recomendar waits for a notification before replying
    pub gate: Option<Arc<Notify>>,
}

impl FakeState {
    pub fn new(songs: &[&str]) -> Self {
        Self {
            stats: Mutex::new(Reply::Json(
                StatusCode::OK,
                json!({
                    "total_usuarios": 5000,
                    "total_canciones": songs.len(),
                    "evaluaciones_totales": 81234,
                    "evaluaciones_posibles": 5000 * songs.len(),
                    "densidad_porcentaje": 13.54,
                    "rating_promedio_global": 3.62,
                    "rating_mediana_global": 4.0,
                    "rating_desviacion_global": 1.21,
                    "distribucion_ratings": {
                        "1_estrella": 5000,
                        "2_estrellas": 9000,
                        "3_estrellas": 20000,
                        "4_estrellas": 27234,
                        "5_estrellas": 20000
                    }
                }),
            )),
            catalog: Mutex::new(Reply::Json(
                StatusCode::OK,
                json!({
                    "total": songs.len(),
                    "offset": 0,
                    "limit": songs.len(),
                    "count": songs.len(),
                    "canciones": songs
                }),
            )),
            recommend: Mutex::new(Reply::Json(StatusCode::OK, recommend_body(&["Clocks", "Yellow"]))),
            classify: Mutex::new(Reply::Json(
                StatusCode::OK,
                json!({
                    "exito": true,
                    "clasificacion": classification_body(),
                    "parametros": { "k_vecinos_usado": 10, "canciones_evaluadas": 10 }
                }),
            )),
            requests: Mutex::new(Vec::new()),
            request_ids: Mutex::new(Vec::new()),
            recommend_calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_recommend(&self, reply: Reply) {
        *self.recommend.lock().unwrap() = reply;
    }

    pub fn set_catalog(&self, reply: Reply) {
        *self.catalog.lock().unwrap() = reply;
    }

    pub fn set_stats(&self, reply: Reply) {
        *self.stats.lock().unwrap() = reply;
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    pub fn recommend_calls(&self) -> usize {
        self.recommend_calls.load(Ordering::SeqCst)
    }

    fn record_id(&self, headers: &axum::http::HeaderMap) {
        if let Some(id) = headers.get("x-request-id").and_then(|h| h.to_str().ok()) {
            self.request_ids.lock().unwrap().push(id.to_string());
        }
    }
}

pub fn classification_body() -> Value {
    json!({
        "categoria": "Moderados Activos",
        "indices_vecinos": [12, 40, 7],
        "similitudes": [0.93, 0.9, 0.88],
        "promedio_rating_vecindario": 3.58,
        "desviacion_rating_vecindario": 1.02,
        "canciones_evaluadas_vecindario": 118.7,
        "similitud_promedio": 0.9033
    })
}

pub fn recommend_body(songs: &[&str]) -> Value {
    let recommendations: Vec<Value> = songs
        .iter()
        .enumerate()
        .map(|(i, song)| {
            json!({
                "cancion": song,
                "score_predicho": 4.9 - i as f64 * 0.1,
                "vecinos_que_evaluaron": 8 - i,
                "rating_promedio_vecinos": 4.5
            })
        })
        .collect();

    json!({
        "exito": true,
        "clasificacion": classification_body(),
        "recomendaciones": recommendations,
        "total_recomendaciones": songs.len(),
        "parametros": {
            "k_vecinos_usado": 10,
            "n_recomendaciones_solicitadas": 20
        }
    })
}

pub struct FakeBackend {
    pub url: String,
    pub state: Arc<FakeState>,
}

impl FakeBackend {
    /// Waits until /recomendar has been hit `count` times
    pub async fn wait_for_recommend_calls(&self, count: usize) {
        for _ in 0..200 {
            if self.state.recommend_calls() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("/recomendar was not called {} times", count);
    }
}

/// Starts the fake service on an ephemeral local port
pub async fn spawn(state: FakeState) -> FakeBackend {
    let state = Arc::new(state);

    let app = Router::new()
        .route("/stats", get(stats))
        .route("/canciones", get(canciones))
        .route("/health", get(health))
        .route("/recomendar", post(recomendar))
        .route("/clasificar", post(clasificar))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeBackend {
        url: format!("http://{}", addr),
        state,
    }
}

async fn stats(State(state): State<Arc<FakeState>>, headers: axum::http::HeaderMap) -> Reply {
    state.record_id(&headers);
    state.stats.lock().unwrap().clone()
}

async fn canciones(State(state): State<Arc<FakeState>>, headers: axum::http::HeaderMap) -> Reply {
    state.record_id(&headers);
    state.catalog.lock().unwrap().clone()
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "music-recommender-api",
        "dataset_loaded": true,
        "dataset_shape": { "usuarios": 5000, "canciones": 12 }
    }))
}

async fn recomendar(
    State(state): State<Arc<FakeState>>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    state.record_id(&headers);
    state.requests.lock().unwrap().push(body);
    state.recommend_calls.fetch_add(1, Ordering::SeqCst);

    if let Some(gate) = &state.gate {
        gate.notified().await;
    }

    state.recommend.lock().unwrap().clone()
}

async fn clasificar(
    State(state): State<Arc<FakeState>>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    state.record_id(&headers);
    state.requests.lock().unwrap().push(body);
    state.classify.lock().unwrap().clone()
}
