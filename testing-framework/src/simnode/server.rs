//! HTTP transport for the simulated node
//!
//! JSON RPC 2.0 over `POST /`, single and batch requests.

use super::SimulatedNode;
use actix_web::{
    dev::Server,
    get,
    web::{self, Bytes, Data},
    App, HttpResponse, HttpServer, Responder,
};
use evmctl_common::rpc::{
    RpcErrorObject, RpcRequest, RpcResponse, INVALID_REQUEST, PARSE_ERROR,
};
use log::{info, trace};
use serde_json::Value;
use std::{io, net::SocketAddr, sync::Arc};

fn error_response(id: Value, code: i64, message: impl Into<String>) -> RpcResponse {
    RpcResponse::failure(
        id,
        RpcErrorObject {
            code,
            message: message.into(),
            data: None,
        },
    )
}

fn handle_value(node: &SimulatedNode, value: Value) -> RpcResponse {
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    match serde_json::from_value::<RpcRequest>(value) {
        Ok(request) => node.handle_request(request),
        Err(e) => error_response(id, INVALID_REQUEST, format!("Invalid request: {}", e)),
    }
}

/// JSON RPC endpoint
pub async fn json_rpc(node: Data<SimulatedNode>, body: Bytes) -> impl Responder {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            return HttpResponse::Ok().json(error_response(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            ))
        }
    };
    trace!("simnode HTTP request: {}", value);

    match value {
        Value::Array(batch) if batch.is_empty() => HttpResponse::Ok().json(error_response(
            Value::Null,
            INVALID_REQUEST,
            "Empty batch",
        )),
        Value::Array(batch) => {
            let responses: Vec<RpcResponse> = batch
                .into_iter()
                .map(|value| handle_value(&node, value))
                .collect();
            HttpResponse::Ok().json(responses)
        }
        value => HttpResponse::Ok().json(handle_value(&node, value)),
    }
}

#[get("/")]
async fn index(node: Data<SimulatedNode>) -> impl Responder {
    HttpResponse::Ok().body(format!(
        "Simulated node\nChain id: {}\nBlock: {}",
        node.chain_id(),
        node.block_number()
    ))
}

/// Bind `node` on `bind_address` and return the server with its local address
///
/// The server is not running until awaited (or spawned). Binding to port 0
/// picks a free port, which is reported in the returned address.
pub fn bind_server(
    node: Arc<SimulatedNode>,
    bind_address: &str,
) -> io::Result<(Server, SocketAddr)> {
    let builder = HttpServer::new(move || {
        App::new()
            .app_data(Data::from(Arc::clone(&node)))
            .service(index)
            .route("/", web::post().to(json_rpc))
    })
    .disable_signals()
    .workers(1)
    .bind(bind_address)?;

    let addr = builder
        .addrs()
        .first()
        .copied()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no bound address"))?;
    info!("Simulated node listening on {}", addr);
    Ok((builder.run(), addr))
}
