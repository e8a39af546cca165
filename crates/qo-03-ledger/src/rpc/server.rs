//! axum HTTP server exposing the ledger over JSON-RPC.

use super::types::{parse_param, RpcError};
use crate::service::LedgerNode;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use qo_02_aggregation::OracleQueries;
use serde_json::{json, Value};
use shared_types::{format_address, format_hash, parse_address, parse_hash, Address, SignedTransaction};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Builds the JSON-RPC router for `node`.
pub fn router(node: Arc<LedgerNode>) -> Router {
    Router::new()
        .route("/", post(handle_json_rpc))
        .route("/health", get(health_check))
        .with_state(node)
}

/// Binds `addr` and serves the router until `shutdown` flips to true.
///
/// Returns the bound address, which differs from `addr` when port 0 was
/// requested.
pub async fn spawn_rpc_server(
    node: Arc<LedgerNode>,
    addr: SocketAddr,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "Ledger JSON-RPC listening");

    let app = router(node);
    let handle = tokio::spawn(async move {
        let graceful = async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(graceful)
            .await
        {
            error!(error = %e, "Ledger JSON-RPC server error");
        }
    });
    Ok((local, handle))
}

async fn handle_json_rpc(State(node): State<Arc<LedgerNode>>, body: String) -> impl IntoResponse {
    let request: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_response(Value::Null, RpcError::parse_error(e))),
            );
        }
    };

    let response = match request {
        Value::Array(requests) => {
            if requests.is_empty() {
                error_response(Value::Null, RpcError::invalid_request("empty batch"))
            } else {
                Value::Array(
                    requests
                        .iter()
                        .map(|req| process_single_request(&node, req))
                        .collect(),
                )
            }
        }
        single => process_single_request(&node, &single),
    };

    (StatusCode::OK, Json(response))
}

fn process_single_request(node: &LedgerNode, request: &Value) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    if !(id.is_string() || id.is_number()) {
        return error_response(
            Value::Null,
            RpcError::invalid_request("id must be a string or number"),
        );
    }

    let Some(method) = request.get("method").and_then(Value::as_str) else {
        return error_response(id, RpcError::invalid_request("missing method"));
    };
    let params = request.get("params");

    match route_method(node, method, params) {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(e) => error_response(id, e),
    }
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": error })
}

fn route_method(node: &LedgerNode, method: &str, params: Option<&Value>) -> Result<Value, RpcError> {
    match method {
        // Chain
        "oracle_chainId" => Ok(json!(node.chain_id())),
        "oracle_blockNumber" => Ok(json!(node.block_number())),
        "oracle_gasPrice" => Ok(json!(node.gas_price())),
        "oracle_getBlockByNumber" => {
            let number: u64 = parse_param(params, 0)?;
            to_value(node.block(number))
        }

        // Transactions
        "oracle_getTransactionCount" => {
            let address = address_param(params, 0)?;
            Ok(json!(node.pending_nonce(&address)))
        }
        "oracle_sendTransaction" => {
            let signed: SignedTransaction = parse_param(params, 0)?;
            let hash = node.send_transaction(signed)?;
            Ok(json!(format_hash(&hash)))
        }
        "oracle_getTransactionReceipt" => {
            let text: String = parse_param(params, 0)?;
            let hash = parse_hash(&text).map_err(RpcError::invalid_params)?;
            to_value(node.receipt(&hash))
        }

        // Oracle reads
        "oracle_isReporter" => {
            let address = address_param(params, 0)?;
            Ok(json!(node.is_reporter(&address)))
        }
        "oracle_reporterCount" => Ok(json!(node.reporter_count())),
        "oracle_reporterAt" => {
            let index: usize = parse_param(params, 0)?;
            Ok(json!(node.reporter_at(index).map(|a| format_address(&a))))
        }
        "oracle_quorum" => Ok(json!(node.quorum())),
        "oracle_round" => {
            let asset: String = parse_param(params, 0)?;
            to_value(node.round(&asset))
        }
        "oracle_submission" => {
            let asset: String = parse_param(params, 0)?;
            let round_id: u64 = parse_param(params, 1)?;
            let reporter = address_param(params, 2)?;
            to_value(node.submission(&asset, round_id, &reporter))
        }
        "oracle_price" => {
            let asset: String = parse_param(params, 0)?;
            to_value(node.price(&asset))
        }
        "oracle_published" => {
            let asset: String = parse_param(params, 0)?;
            to_value(node.published(&asset))
        }
        "oracle_assets" => Ok(json!(node.assets())),

        _ => Err(RpcError::method_not_found(method)),
    }
}

fn address_param(params: Option<&Value>, index: usize) -> Result<Address, RpcError> {
    let text: String = parse_param(params, index)?;
    parse_address(&text).map_err(RpcError::invalid_params)
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::new(-32603, e.to_string()))
}

async fn health_check(State(node): State<Arc<LedgerNode>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "ledger",
        "chain_id": node.chain_id(),
        "block_number": node.block_number(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
