//! Cosma Daemon - universe simulation backend
//!
//! Holds the universe registry in memory and serves UI clients over a
//! newline-delimited JSON request/response protocol:
//! - one request object per line, `{"method": ..., "params": ...}`
//! - one reply envelope per line, `{"status": ..., ...}`
//!
//! The registry is intentionally not persisted across restarts; exports are
//! produced on request and shipped to the client as strings.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio::time;
use tracing::{error, info, warn};

use cosma::params::UniverseParameters;
use cosma::registry::UniverseRegistry;
use cosma::universe::SimulatedUniverse;

mod error;
mod snapshot;

use error::ClientError;
use snapshot::UniverseSnapshot;

const LISTEN_ADDR: &str = "127.0.0.1:9741";

// ═══════════════════════════════════════════════════════════════════════════
// Protocol Messages
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", content = "params")]
enum Request {
    #[serde(rename = "getUniverses")]
    GetUniverses,
    #[serde(rename = "createUniverse")]
    CreateUniverse(CreateParams),
    #[serde(rename = "deleteUniverse")]
    DeleteUniverse { id: u32 },
    #[serde(rename = "searchUniverses")]
    SearchUniverses { term: String },
    #[serde(rename = "exportUniverse")]
    ExportUniverse { id: u32, format: ExportFormat },
    #[serde(rename = "exportAllUniverses")]
    ExportAllUniverses { format: ExportFormat },
    #[serde(rename = "shutdown")]
    Shutdown,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateParams {
    name: String,
    #[serde(flatten)]
    params: UniverseParameters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ExportFormat {
    Json,
    Csv,
}

/// Reply envelope, shaped for the universe-list UI: `status` is always
/// present, the payload fields only when they apply.
#[derive(Debug, Clone, Serialize)]
struct Reply {
    status: ReplyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    universes: Option<Vec<UniverseSnapshot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum ReplyStatus {
    Success,
    Error,
}

impl Reply {
    fn universes(universes: Vec<UniverseSnapshot>) -> Self {
        Self {
            status: ReplyStatus::Success,
            universes: Some(universes),
            data: None,
            message: None,
        }
    }

    fn data(data: String) -> Self {
        Self {
            status: ReplyStatus::Success,
            universes: None,
            data: Some(data),
            message: None,
        }
    }

    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Success,
            universes: None,
            data: None,
            message: Some(message.into()),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Error,
            universes: None,
            data: None,
            message: Some(message.into()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Daemon State
// ═══════════════════════════════════════════════════════════════════════════

struct DaemonState {
    registry: UniverseRegistry,
}

impl DaemonState {
    fn new() -> Self {
        Self {
            registry: UniverseRegistry::new(),
        }
    }

    fn snapshots(&self) -> Vec<UniverseSnapshot> {
        self.registry
            .all()
            .into_iter()
            .map(|(id, u)| UniverseSnapshot::capture(id, u))
            .collect()
    }
}

type SharedState = Arc<RwLock<DaemonState>>;

async fn handle_request(state: &SharedState, request: Request) -> Reply {
    match request {
        Request::GetUniverses => {
            let s = state.read().await;
            Reply::universes(s.snapshots())
        }

        Request::CreateUniverse(CreateParams { name, params }) => {
            if name.trim().is_empty() {
                return Reply::error("Universe name must not be empty");
            }
            if let Err(e) = params.validate() {
                return Reply::error(e.to_string());
            }

            let mut s = state.write().await;
            let id = s.registry.add(SimulatedUniverse::new(name.clone(), params));
            info!("Universe '{}' created with id {}", name, id);
            Reply::ok(format!("Universe '{name}' created with id {id}"))
        }

        Request::DeleteUniverse { id } => {
            let mut s = state.write().await;
            if s.registry.remove(id) {
                info!("Universe {} deleted", id);
                Reply::ok(format!("Universe {id} deleted"))
            } else {
                Reply::error(format!("No such universe: {id}"))
            }
        }

        Request::SearchUniverses { term } => {
            let s = state.read().await;
            let matches = s
                .registry
                .search(&term)
                .into_iter()
                .map(|(id, u)| UniverseSnapshot::capture(id, u))
                .collect();
            Reply::universes(matches)
        }

        Request::ExportUniverse { id, format } => {
            let s = state.read().await;
            let payload = match format {
                ExportFormat::Json => s.registry.export_json(id),
                ExportFormat::Csv => s.registry.export_csv(id),
            };
            match payload {
                Some(data) => Reply::data(data),
                None => Reply::error(format!("No such universe: {id}")),
            }
        }

        Request::ExportAllUniverses { format } => {
            let s = state.read().await;
            let data = match format {
                ExportFormat::Json => s.registry.export_all_json(),
                ExportFormat::Csv => s.registry.export_all_csv(),
            };
            Reply::data(data)
        }

        Request::Shutdown => {
            info!("Shutdown requested");
            tokio::spawn(async {
                // Give the reply a moment to flush before exiting.
                time::sleep(Duration::from_millis(50)).await;
                std::process::exit(0);
            });
            Reply::ok("Shutting down")
        }
    }
}

/// Parse one request line and dispatch it. Malformed input becomes an error
/// reply instead of tearing the connection down.
async fn process_line(state: &SharedState, line: &str) -> Reply {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle_request(state, request).await,
        Err(e) => {
            warn!("Invalid request line: {}", e);
            Reply::error(format!("Invalid request: {e}"))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Client Handler
// ═══════════════════════════════════════════════════════════════════════════

async fn handle_client(stream: TcpStream, state: SharedState) -> Result<(), ClientError> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let reply = process_line(&state, &line).await;
        writer
            .write_all(serde_json::to_string(&reply)?.as_bytes())
            .await?;
        writer.write_all(b"\n").await?;
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let state: SharedState = Arc::new(RwLock::new(DaemonState::new()));

    // Exit cleanly on Ctrl-C. The registry is memory-only, so there is
    // nothing to flush beyond the log line.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C: shutting down");
            std::process::exit(0);
        }
    });

    let listener = TcpListener::bind(LISTEN_ADDR).await?;
    info!("Cosma daemon listening on {}", LISTEN_ADDR);

    loop {
        let (stream, addr) = listener.accept().await?;
        info!("Client connected: {}", addr);
        let state = Arc::clone(&state);

        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, state).await {
                error!("Client handler error: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_state() -> SharedState {
        Arc::new(RwLock::new(DaemonState::new()))
    }

    fn reply_json(reply: &Reply) -> serde_json::Value {
        serde_json::to_value(reply).unwrap()
    }

    #[test]
    fn requests_parse_from_bridge_method_names() {
        let get: Request = serde_json::from_str(r#"{"method":"getUniverses"}"#).unwrap();
        assert!(matches!(get, Request::GetUniverses));

        let del: Request =
            serde_json::from_str(r#"{"method":"deleteUniverse","params":{"id":3}}"#).unwrap();
        assert!(matches!(del, Request::DeleteUniverse { id: 3 }));

        let exp: Request = serde_json::from_str(
            r#"{"method":"exportUniverse","params":{"id":0,"format":"csv"}}"#,
        )
        .unwrap();
        assert!(matches!(
            exp,
            Request::ExportUniverse {
                id: 0,
                format: ExportFormat::Csv
            }
        ));
    }

    #[test]
    fn create_request_accepts_the_form_payload() {
        let req: Request = serde_json::from_str(
            r#"{"method":"createUniverse","params":{"name":"Alpha","matterDensity":0.27,
                "darkEnergyDensity":0.68,"hubbleConstant":67.4,
                "matterAntimatterRatio":1e-10,"darkEnergyW":-1.0}}"#,
        )
        .unwrap();

        match req {
            Request::CreateUniverse(CreateParams { name, params }) => {
                assert_eq!(name, "Alpha");
                assert_eq!(params.matter_density, 0.27);
                assert_eq!(params.dark_matter_ratio, 0.25, "unset fields default");
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_then_list_round_trip() {
        let state = shared_state();

        let reply = process_line(
            &state,
            r#"{"method":"createUniverse","params":{"name":"Alpha","matterDensity":0.3,
                "darkEnergyDensity":0.7,"hubbleConstant":70.0,
                "matterAntimatterRatio":1e-9,"darkEnergyW":-1.0}}"#,
        )
        .await;
        assert_eq!(reply.status, ReplyStatus::Success);

        let reply = handle_request(&state, Request::GetUniverses).await;
        let universes = reply.universes.expect("list reply carries universes");
        assert_eq!(universes.len(), 1);
        assert_eq!(universes[0].name, "Alpha");
        assert!(!universes[0].milestones.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_invalid_parameters_with_the_validator_message() {
        let state = shared_state();

        let reply = process_line(
            &state,
            r#"{"method":"createUniverse","params":{"name":"Broken","matterDensity":5.0,
                "darkEnergyDensity":0.7,"hubbleConstant":70.0,
                "matterAntimatterRatio":1e-9,"darkEnergyW":-1.0}}"#,
        )
        .await;

        assert_eq!(reply.status, ReplyStatus::Error);
        assert_eq!(
            reply.message.as_deref(),
            Some("Matter density must be between 0.1 and 2.0")
        );

        let s = state.read().await;
        assert!(s.registry.is_empty(), "rejected universe must not be stored");
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_an_error_reply() {
        let state = shared_state();
        let reply = handle_request(&state, Request::DeleteUniverse { id: 42 }).await;
        assert_eq!(reply.status, ReplyStatus::Error);
        assert_eq!(reply.message.as_deref(), Some("No such universe: 42"));
    }

    #[tokio::test]
    async fn malformed_line_yields_an_error_envelope() {
        let state = shared_state();
        let reply = process_line(&state, "this is not json").await;
        assert_eq!(reply.status, ReplyStatus::Error);
        assert!(reply
            .message
            .as_deref()
            .unwrap_or_default()
            .starts_with("Invalid request:"));
    }

    #[tokio::test]
    async fn export_round_trips_both_formats() {
        let state = shared_state();
        handle_request(
            &state,
            Request::CreateUniverse(CreateParams {
                name: "Exportable".to_string(),
                params: UniverseParameters::default(),
            }),
        )
        .await;

        let json = handle_request(
            &state,
            Request::ExportUniverse {
                id: 0,
                format: ExportFormat::Json,
            },
        )
        .await;
        assert_eq!(json.status, ReplyStatus::Success);
        assert!(json.data.unwrap().contains("\"Exportable\""));

        let csv = handle_request(
            &state,
            Request::ExportUniverse {
                id: 0,
                format: ExportFormat::Csv,
            },
        )
        .await;
        assert!(csv.data.unwrap().starts_with("name,matter_density"));

        let missing = handle_request(
            &state,
            Request::ExportUniverse {
                id: 9,
                format: ExportFormat::Json,
            },
        )
        .await;
        assert_eq!(missing.status, ReplyStatus::Error);
    }

    #[tokio::test]
    async fn reply_envelope_omits_empty_fields() {
        let state = shared_state();
        let reply = handle_request(&state, Request::GetUniverses).await;
        let v = reply_json(&reply);

        assert_eq!(v["status"], "success");
        assert!(v.get("message").is_none());
        assert!(v.get("data").is_none());
        assert_eq!(v["universes"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn search_matches_by_name_substring() {
        let state = shared_state();
        for name in ["Milky Way Prime", "Phantom Test", "milky dwarf"] {
            handle_request(
                &state,
                Request::CreateUniverse(CreateParams {
                    name: name.to_string(),
                    params: UniverseParameters::default(),
                }),
            )
            .await;
        }

        let reply = handle_request(
            &state,
            Request::SearchUniverses {
                term: "MILKY".to_string(),
            },
        )
        .await;
        let names: Vec<_> = reply
            .universes
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Milky Way Prime", "milky dwarf"]);
    }
}
