use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Get,
    Post,
    Delete,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicIpAddress {
    pub name: String,
    pub id: String,
    pub location_name: String,
    pub ip_address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub allocation: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ip_version: String,
    pub domain_name_label: String,
    pub reverse_fqdn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<serde_json::Value>,
}

#[derive(Deserialize)]
pub struct InvokeRequest {
    #[serde(rename = "operationType")]
    pub operation_type: Operation,
    #[serde(rename = "publicIPAddresses", default)]
    pub public_ip_addresses: Vec<PublicIpAddress>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvokeResponse {
    #[serde(rename = "publicIPAddresses")]
    pub public_ip_addresses: Vec<PublicIpAddress>,
    pub error: String,
}

#[derive(Deserialize)]
pub struct PrecheckRequest {
    #[serde(rename = "publicIPAddresses", default)]
    pub public_ip_addresses: Vec<PublicIpAddress>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BoolValue {
    pub value: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrecheckResponse {
    pub result: BoolValue,
    pub error: String,
}

/// Records keyed by `(location, name)`.
pub type Db = Arc<RwLock<HashMap<(String, String), PublicIpAddress>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/PublicIPAddressAgent/Invoke", post(invoke))
        .route("/PublicIPAddressAgent/Precheck", post(precheck))
        .with_state(db)
}

/// Same as [`app`] but every call must carry `authorization: Bearer <token>`.
pub fn app_with_token(token: &str) -> Router {
    let expected = Arc::new(format!("Bearer {token}"));
    app().layer(middleware::from_fn(move |request: Request, next: Next| {
        let expected = Arc::clone(&expected);
        async move {
            let authorized = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value == expected.as_str());
            if !authorized {
                return StatusCode::UNAUTHORIZED.into_response();
            }
            next.run(request).await
        }
    }))
}

pub async fn run(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn invoke(State(db): State<Db>, Json(input): Json<InvokeRequest>) -> Response {
    match input.operation_type {
        Operation::Get => get_pips(&db, input.public_ip_addresses).await,
        Operation::Post => upsert_pips(&db, input.public_ip_addresses).await,
        Operation::Delete => delete_pips(&db, input.public_ip_addresses).await,
    }
}

async fn get_pips(db: &Db, requested: Vec<PublicIpAddress>) -> Response {
    let pips = db.read().await;
    let mut found = Vec::new();
    for wanted in &requested {
        let mut matches: Vec<_> = pips
            .values()
            .filter(|p| p.location_name == wanted.location_name)
            .filter(|p| wanted.name.is_empty() || p.name == wanted.name)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        found.extend(matches);
    }
    info!(count = found.len(), "get");
    reply(found)
}

async fn upsert_pips(db: &Db, requested: Vec<PublicIpAddress>) -> Response {
    if let Some(pip) = requested.iter().find(|p| p.location_name.is_empty() || p.name.is_empty()) {
        let message = format!("public IP address [{}] needs a name and a location", pip.name);
        return (StatusCode::BAD_REQUEST, message).into_response();
    }

    let mut pips = db.write().await;
    let mut stored = Vec::with_capacity(requested.len());
    for mut pip in requested {
        let key = (pip.location_name.clone(), pip.name.clone());
        let state = match pips.get(&key) {
            Some(existing) => {
                pip.id = existing.id.clone();
                "UPDATED"
            }
            None => {
                pip.id = Uuid::new_v4().to_string();
                "CREATED"
            }
        };
        pip.status = Some(serde_json::json!({
            "health": { "currentState": "OK" },
            "provisioningStatus": { "currentState": state },
        }));
        info!(name = %pip.name, location = %pip.location_name, state, "upsert");
        pips.insert(key, pip.clone());
        stored.push(pip);
    }
    reply(stored)
}

async fn delete_pips(db: &Db, requested: Vec<PublicIpAddress>) -> Response {
    let mut pips = db.write().await;
    for pip in &requested {
        let key = (pip.location_name.clone(), pip.name.clone());
        if pips.remove(&key).is_none() {
            let message = format!("public IP address [{}] not found", pip.name);
            return (StatusCode::NOT_FOUND, message).into_response();
        }
        info!(name = %pip.name, location = %pip.location_name, "delete");
    }
    reply(Vec::new())
}

/// Rejects empty locations and IP addresses already held by a differently
/// named record at the same location. Never mutates state.
async fn precheck(State(db): State<Db>, Json(input): Json<PrecheckRequest>) -> Json<PrecheckResponse> {
    let pips = db.read().await;
    let mut error = String::new();
    for wanted in &input.public_ip_addresses {
        if wanted.location_name.is_empty() {
            error = format!("public IP address [{}] has no location", wanted.name);
            break;
        }
        if wanted.ip_address.is_empty() {
            continue;
        }
        let conflict = pips.values().find(|p| {
            p.location_name == wanted.location_name
                && p.ip_address == wanted.ip_address
                && p.name != wanted.name
        });
        if let Some(holder) = conflict {
            error = format!(
                "IP address {} is already assigned to [{}]",
                wanted.ip_address, holder.name
            );
            break;
        }
    }
    info!(count = input.public_ip_addresses.len(), ok = error.is_empty(), "precheck");
    Json(PrecheckResponse {
        result: BoolValue {
            value: error.is_empty(),
        },
        error,
    })
}

fn reply(public_ip_addresses: Vec<PublicIpAddress>) -> Response {
    Json(InvokeResponse {
        public_ip_addresses,
        error: String::new(),
    })
    .into_response()
}
