//! HTTP surface of the node. Handlers delegate to the engine and carry no
//! ledger logic of their own.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use forge_core::consensus;
use forge_core::{Block, ChainSnapshot, Ledger, PeerRegistry, ProofOfWork};

use crate::fetch::HttpFetch;

/// Shared handles behind the HTTP handlers. Ledger and registry mutations
/// serialize on the write locks; chain reads take the read lock and observe
/// only completed mutations.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<Ledger>>,
    pub peers: Arc<RwLock<PeerRegistry>>,
    pub pow: ProofOfWork,
    pub fetch: HttpFetch,
}

impl AppState {
    pub fn new(ledger: Ledger, peers: PeerRegistry, pow: ProofOfWork, fetch: HttpFetch) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            peers: Arc::new(RwLock::new(peers)),
            pow,
            fetch,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mine", get(mine))
        .route("/transactions/new", post(new_transaction))
        .route("/chain", get(chain))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(resolve))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

enum ApiError {
    InvalidInput(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Deserialize)]
struct TxRequest {
    sender: String,
    recipient: String,
    amount: i64,
}

#[derive(Serialize)]
struct TxResponse {
    message: String,
    index: u64,
}

#[derive(Serialize)]
struct MineResponse {
    message: &'static str,
    #[serde(flatten)]
    block: Block,
}

#[derive(Serialize)]
struct RegisterResponse {
    message: &'static str,
    total_nodes: Vec<String>,
}

#[derive(Serialize)]
struct ResolveResponse {
    message: &'static str,
    replaced: bool,
    chain: Vec<Block>,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn chain(State(state): State<AppState>) -> Json<ChainSnapshot> {
    Json(state.ledger.read().await.snapshot())
}

async fn new_transaction(
    State(state): State<AppState>,
    Json(tx): Json<TxRequest>,
) -> (StatusCode, Json<TxResponse>) {
    let index = state
        .ledger
        .write()
        .await
        .new_transaction(tx.sender, tx.recipient, tx.amount);
    (
        StatusCode::CREATED,
        Json(TxResponse {
            message: format!("Transaction will be added to Block {index}"),
            index,
        }),
    )
}

/// The proof search runs on the blocking pool with no lock held; only the
/// seal takes the write lock. If the chain advanced while searching, the
/// stale proof would break the hash link, so the search is redone against
/// the new tip.
async fn mine(State(state): State<AppState>) -> Result<Json<MineResponse>, ApiError> {
    let pow = state.pow;
    loop {
        let last_proof = state.ledger.read().await.last_block().proof;
        let proof = tokio::task::spawn_blocking(move || pow.search(last_proof))
            .await
            .map_err(|err| ApiError::Internal(format!("proof search aborted: {err}")))?;

        let mut ledger = state.ledger.write().await;
        if ledger.last_block().proof != last_proof {
            warn!("chain advanced during proof search, retrying");
            continue;
        }
        let block = ledger.seal(proof);
        return Ok(Json(MineResponse {
            message: "New Block Forged",
            block,
        }));
    }
}

async fn register_nodes(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let nodes = body
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::InvalidInput("please supply a valid list of nodes".to_string()))?;

    let mut peers = state.peers.write().await;
    for node in nodes {
        let Some(address) = node.as_str() else {
            warn!(?node, "ignoring non-string peer entry");
            continue;
        };
        match peers.register(address) {
            Ok(true) => info!(address, "registered peer"),
            Ok(false) => {}
            Err(err) => warn!(%err, "ignoring peer"),
        }
    }
    let total_nodes = peers.list().into_iter().map(str::to_string).collect();
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "New nodes have been added",
            total_nodes,
        }),
    ))
}

/// The peer scan runs against a snapshot of the registry with no ledger
/// lock held. The replacement re-checks strict length superiority under the
/// write lock, since the local chain may have grown during the fetches.
async fn resolve(State(state): State<AppState>) -> Json<ResolveResponse> {
    let local_len = state.ledger.read().await.len();
    let peers = state.peers.read().await.clone();

    let candidate =
        consensus::fetch_longest_valid(local_len, &peers, &state.fetch, &state.pow).await;

    let mut ledger = state.ledger.write().await;
    let replaced = match candidate {
        Some(chain) if chain.len() > ledger.len() => {
            ledger.replace_chain(chain);
            true
        }
        _ => false,
    };
    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };
    Json(ResolveResponse {
        message,
        replaced,
        chain: ledger.chain().to_vec(),
    })
}
