//! CLI client for the `cosmad` daemon.
//!
//! Examples:
//!   cosma-cli list
//!   cosma-cli show 0
//!   cosma-cli create --name "Phantom Test" --w -1.2
//!   cosma-cli delete 0
//!   cosma-cli export 0 csv universe.csv
//!   cosma-cli search milky
//!
//! By default it talks to 127.0.0.1:9741; override with `--addr host:port`.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::process;
use std::thread;
use std::time::Duration;

use cosma::milestone::{milestone_title, timestamp_occurs};
use cosma::params::UniverseParameters;
use cosma::timefmt::format_timestamp;

// Connection policy: a fixed number of attempts with a fixed backoff, then
// give up loudly. Replaces open-ended readiness polling.
const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_BACKOFF: Duration = Duration::from_millis(500);
const IO_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize)]
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
    ExportUniverse { id: u32, format: String },
    #[serde(rename = "exportAllUniverses")]
    ExportAllUniverses { format: String },
    #[serde(rename = "shutdown")]
    Shutdown,
}

#[derive(Debug, Clone, Serialize)]
struct CreateParams {
    name: String,
    #[serde(flatten)]
    params: UniverseParameters,
}

#[derive(Debug, Clone, Deserialize)]
struct Reply {
    status: String,
    #[serde(default)]
    universes: Option<Vec<UniverseSnapshot>>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UniverseSnapshot {
    id: u32,
    name: String,
    matter_density: f64,
    dark_energy_density: f64,
    hubble_constant: f64,
    matter_antimatter_ratio: f64,
    dark_energy_w: f64,
    #[serde(default)]
    created_at: u64,
    #[serde(default)]
    milestones: Vec<MilestoneSnapshot>,
}

// The milestone tag stays a plain string here so unknown types coming off
// the wire render as "Unknown Milestone" instead of failing to parse.
#[derive(Debug, Clone, Deserialize)]
struct MilestoneSnapshot {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    description: Option<String>,
}

fn usage() -> ! {
    eprintln!("cosma-cli (talks to cosmad @ 127.0.0.1:9741 by default)");
    eprintln!("Usage: cosma-cli [--addr host:port] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  list                         List universes");
    eprintln!("  show <id>                    Show parameters and timeline");
    eprintln!("  create --name <name> [--matter f] [--dark-energy f]");
    eprintln!("         [--hubble f] [--ratio f] [--w f]");
    eprintln!("                               Create a universe (defaults: ΛCDM)");
    eprintln!("  delete <id>                  Delete a universe");
    eprintln!("  search <term>                Search universes by name");
    eprintln!("  export <id> <json|csv> [path]       Export one universe");
    eprintln!("  export-all <json|csv> [path]        Export every universe");
    eprintln!("  shutdown                     Stop the daemon");
    process::exit(1);
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    let mut addr = "127.0.0.1:9741".to_string();
    if args.len() >= 2 && args[0] == "--addr" {
        addr = args[1].clone();
        args.drain(0..2);
    }

    if args.is_empty() {
        usage();
    }

    (addr, args)
}

fn connect(addr: &str) -> Result<TcpStream, String> {
    let mut last_err = String::new();
    for attempt in 1..=CONNECT_ATTEMPTS {
        match TcpStream::connect(addr) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = e.to_string(),
        }
        if attempt < CONNECT_ATTEMPTS {
            thread::sleep(CONNECT_BACKOFF);
        }
    }
    Err(format!(
        "connect to {addr} failed after {CONNECT_ATTEMPTS} attempts: {last_err}"
    ))
}

fn send_request(addr: &str, req: &Request) -> Result<Reply, String> {
    let mut stream = connect(addr)?;
    stream
        .set_read_timeout(Some(IO_TIMEOUT))
        .map_err(|e| format!("set_read_timeout: {e}"))?;
    stream
        .set_write_timeout(Some(IO_TIMEOUT))
        .map_err(|e| format!("set_write_timeout: {e}"))?;
    let mut reader = BufReader::new(stream.try_clone().map_err(|e| format!("clone: {e}"))?);

    let line = serde_json::to_string(req).map_err(|e| format!("serialize: {e}"))?;
    stream
        .write_all(line.as_bytes())
        .and_then(|_| stream.write_all(b"\n"))
        .map_err(|e| format!("send: {e}"))?;

    let mut resp_line = String::new();
    reader
        .read_line(&mut resp_line)
        .map_err(|e| format!("recv: {e}"))?;
    serde_json::from_str(&resp_line).map_err(|e| format!("parse response: {e}"))
}

fn print_universe_line(u: &UniverseSnapshot) {
    println!(
        "[{}] {:<24} Ω_m={} Ω_Λ={} H₀={} η={} w={}",
        u.id,
        u.name,
        u.matter_density,
        u.dark_energy_density,
        u.hubble_constant,
        u.matter_antimatter_ratio,
        u.dark_energy_w,
    );
}

fn print_universe_detail(u: &UniverseSnapshot) {
    print_universe_line(u);
    println!("created_at_ms={}", u.created_at);
    println!();

    let valid: Vec<_> = u
        .milestones
        .iter()
        .filter(|m| timestamp_occurs(m.timestamp))
        .collect();

    if valid.is_empty() {
        println!("No timeline events occur in this universe configuration.");
        return;
    }

    for m in valid {
        println!(
            "{:<24} {:<28} {}",
            milestone_title(&m.kind),
            format_timestamp(m.timestamp),
            m.description.as_deref().unwrap_or(""),
        );
    }
}

fn parse_flag_f64(args: &[String], i: usize, flag: &str) -> f64 {
    match args.get(i + 1).map(|v| v.parse::<f64>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("{flag} needs a numeric value");
            process::exit(1);
        }
    }
}

fn parse_create(args: &[String]) -> CreateParams {
    let mut name: Option<String> = None;
    let mut params = UniverseParameters::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--name" => {
                name = args.get(i + 1).cloned();
                i += 2;
            }
            "--matter" => {
                params.matter_density = parse_flag_f64(args, i, "--matter");
                i += 2;
            }
            "--dark-energy" => {
                params.dark_energy_density = parse_flag_f64(args, i, "--dark-energy");
                i += 2;
            }
            "--hubble" => {
                params.hubble_constant = parse_flag_f64(args, i, "--hubble");
                i += 2;
            }
            "--ratio" => {
                params.matter_antimatter_ratio = parse_flag_f64(args, i, "--ratio");
                i += 2;
            }
            "--w" => {
                params.dark_energy_w = parse_flag_f64(args, i, "--w");
                i += 2;
            }
            other => {
                eprintln!("Unknown create flag: {other}");
                usage();
            }
        }
    }

    let name = match name {
        Some(n) if !n.is_empty() => n,
        _ => {
            eprintln!("create requires --name");
            process::exit(1);
        }
    };

    CreateParams { name, params }
}

fn parse_export_format(arg: Option<&String>) -> String {
    match arg.map(String::as_str) {
        Some("json") => "json".to_string(),
        Some("csv") => "csv".to_string(),
        _ => {
            eprintln!("format must be 'json' or 'csv'");
            process::exit(1);
        }
    }
}

fn write_export(data: &str, path: Option<&String>, fallback: &str) {
    let path = path.map(String::as_str).unwrap_or(fallback);
    match std::fs::write(path, data) {
        Ok(()) => println!("Exported to {path}"),
        Err(e) => {
            eprintln!("Failed to write {path}: {e}");
            process::exit(1);
        }
    }
}

fn parse_id(arg: Option<&String>) -> u32 {
    match arg.map(|v| v.parse::<u32>()) {
        Some(Ok(id)) => id,
        _ => {
            eprintln!("expected a numeric universe id");
            process::exit(1);
        }
    }
}

fn main() {
    let (addr, args) = parse_args();
    let cmd = args[0].as_str();

    match cmd {
        "list" => match send_request(&addr, &Request::GetUniverses) {
            Ok(reply) if reply.status == "success" => {
                let universes = reply.universes.unwrap_or_default();
                if universes.is_empty() {
                    println!("No universes created yet.");
                    return;
                }
                for u in &universes {
                    print_universe_line(u);
                }
                println!("{} universe(s)", universes.len());
            }
            Ok(reply) => fail(&reply),
            Err(e) => transport_fail(&e),
        },

        "show" => {
            let id = parse_id(args.get(1));
            match send_request(&addr, &Request::GetUniverses) {
                Ok(reply) if reply.status == "success" => {
                    let universes = reply.universes.unwrap_or_default();
                    match universes.iter().find(|u| u.id == id) {
                        Some(u) => print_universe_detail(u),
                        None => {
                            eprintln!("Universe not found: {id}");
                            process::exit(1);
                        }
                    }
                }
                Ok(reply) => fail(&reply),
                Err(e) => transport_fail(&e),
            }
        }

        "create" => {
            let create = parse_create(&args);
            match send_request(&addr, &Request::CreateUniverse(create)) {
                Ok(reply) if reply.status == "success" => {
                    println!("{}", reply.message.as_deref().unwrap_or("Universe created"));
                }
                Ok(reply) => fail(&reply),
                Err(e) => transport_fail(&e),
            }
        }

        "delete" => {
            let id = parse_id(args.get(1));
            match send_request(&addr, &Request::DeleteUniverse { id }) {
                Ok(reply) if reply.status == "success" => {
                    println!("{}", reply.message.as_deref().unwrap_or("Universe deleted"));
                }
                Ok(reply) => fail(&reply),
                Err(e) => transport_fail(&e),
            }
        }

        "search" => {
            let term = match args.get(1) {
                Some(t) => t.clone(),
                None => usage(),
            };
            match send_request(&addr, &Request::SearchUniverses { term }) {
                Ok(reply) if reply.status == "success" => {
                    let universes = reply.universes.unwrap_or_default();
                    if universes.is_empty() {
                        println!("No matches.");
                        return;
                    }
                    for u in &universes {
                        print_universe_line(u);
                    }
                }
                Ok(reply) => fail(&reply),
                Err(e) => transport_fail(&e),
            }
        }

        "export" => {
            let id = parse_id(args.get(1));
            let format = parse_export_format(args.get(2));
            let fallback = format!("universe_{id}.{format}");
            match send_request(&addr, &Request::ExportUniverse { id, format }) {
                Ok(reply) if reply.status == "success" => match reply.data {
                    Some(data) => write_export(&data, args.get(3), &fallback),
                    None => {
                        eprintln!("daemon returned no export payload");
                        process::exit(1);
                    }
                },
                Ok(reply) => fail(&reply),
                Err(e) => transport_fail(&e),
            }
        }

        "export-all" => {
            let format = parse_export_format(args.get(1));
            let fallback = format!("all_universes.{format}");
            match send_request(&addr, &Request::ExportAllUniverses { format }) {
                Ok(reply) if reply.status == "success" => match reply.data {
                    Some(data) => write_export(&data, args.get(2), &fallback),
                    None => {
                        eprintln!("daemon returned no export payload");
                        process::exit(1);
                    }
                },
                Ok(reply) => fail(&reply),
                Err(e) => transport_fail(&e),
            }
        }

        "shutdown" => match send_request(&addr, &Request::Shutdown) {
            Ok(reply) if reply.status == "success" => {
                println!("{}", reply.message.as_deref().unwrap_or("Shutting down"));
            }
            Ok(reply) => fail(&reply),
            Err(e) => transport_fail(&e),
        },

        _ => usage(),
    }
}

fn fail(reply: &Reply) -> ! {
    eprintln!(
        "Error: {}",
        reply.message.as_deref().unwrap_or("request failed")
    );
    process::exit(1);
}

fn transport_fail(err: &str) -> ! {
    eprintln!("Failed: {err}");
    process::exit(1);
}
