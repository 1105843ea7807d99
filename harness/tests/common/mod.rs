#![allow(dead_code)]
// A stand-in for the pipeline under test: accepts a result connection, reads
// one raw message from its producer port, and pushes back whatever the
// responder makes of it.

use chrono::{NaiveDateTime, Utc};
use logcheck::{Coordinator, HarnessConfig, MessageTypeInfo, Registry};
use logcheck_network::Transport;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

pub const LOCALHOST: &str = "127.0.0.1";

/// Maps one raw message to the bytes pushed on the result connection.
/// `None` keeps the result connection open without ever writing to it.
pub type Responder = Arc<dyn Fn(&str) -> Option<Vec<u8>> + Send + Sync>;

enum Input {
    Tcp(TcpListener),
    Udp(UdpSocket),
}

pub struct FakePipeline {
    pub info: MessageTypeInfo,
    received: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl Drop for FakePipeline {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl FakePipeline {
    pub async fn start(name: &str, transport: Transport, responder: Responder) -> Self {
        let results = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let result_port = results.local_addr().unwrap().port();
        let (input, destination_port) = match transport {
            Transport::Tcp => {
                let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                let port = listener.local_addr().unwrap().port();
                (Input::Tcp(listener), port)
            }
            Transport::Udp => {
                let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
                let port = socket.local_addr().unwrap().port();
                (Input::Udp(socket), port)
            }
        };

        let received = Arc::new(Mutex::new(Vec::new()));
        let task = tokio::spawn({
            let received = received.clone();
            async move {
                let mut silent = Vec::new();
                loop {
                    let Ok((mut result_conn, _)) = results.accept().await else {
                        return;
                    };
                    let Some(raw) = read_one(&input).await else {
                        return;
                    };
                    received.lock().unwrap().push(raw.clone());

                    let line = raw.strip_suffix('\n').unwrap_or(&raw);
                    match responder(line) {
                        Some(bytes) => {
                            let _ = result_conn.write_all(&bytes).await;
                        }
                        None => silent.push(result_conn),
                    }
                }
            }
        });

        Self {
            info: MessageTypeInfo::new(name, transport, destination_port, result_port),
            received,
            task,
        }
    }

    /// A pipeline answering TCP input with `normalize`'s JSON.
    pub async fn json_tcp(name: &str, normalize: fn(&str) -> Value) -> Self {
        Self::start(name, Transport::Tcp, json_responder(normalize)).await
    }

    /// A pipeline answering UDP input with `normalize`'s JSON.
    pub async fn json_udp(name: &str, normalize: fn(&str) -> Value) -> Self {
        Self::start(name, Transport::Udp, json_responder(normalize)).await
    }

    /// Raw messages as they arrived on the wire, terminators included.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

async fn read_one(input: &Input) -> Option<String> {
    match input {
        Input::Tcp(listener) => {
            let (stream, _) = listener.accept().await.ok()?;
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).await.ok()?;
            Some(line)
        }
        Input::Udp(socket) => {
            let mut buf = vec![0u8; 65536];
            let (len, _) = socket.recv_from(&mut buf).await.ok()?;
            Some(String::from_utf8_lossy(&buf[..len]).into_owned())
        }
    }
}

pub fn json_responder(normalize: fn(&str) -> Value) -> Responder {
    Arc::new(move |line: &str| Some(serde_json::to_vec(&normalize(line)).unwrap()))
}

pub fn silent_responder() -> Responder {
    Arc::new(|_: &str| None)
}

pub fn raw_responder(bytes: &'static [u8]) -> Responder {
    Arc::new(move |_: &str| Some(bytes.to_vec()))
}

pub async fn coordinator_for(pipelines: &[&FakePipeline]) -> Coordinator {
    coordinator_with_timeout(pipelines, Duration::from_secs(5)).await
}

pub async fn coordinator_with_timeout(
    pipelines: &[&FakePipeline],
    timeout: Duration,
) -> Coordinator {
    let registry = Registry::from_entries(pipelines.iter().map(|p| p.info.clone()));
    let config = HarnessConfig::default()
        .with_host(LOCALHOST)
        .with_receive_timeout(timeout);
    Coordinator::new(registry, config).await.unwrap()
}

fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// `IOC=<name> sevr=<severity> <message>`
pub fn normalize_errlog(line: &str) -> Value {
    let mut parts = line.splitn(3, ' ');
    let iocname = parts.next().unwrap_or("").trim_start_matches("IOC=");
    let severity = parts.next().unwrap_or("").trim_start_matches("sevr=");
    let message = parts.next().unwrap_or("");
    json!({
        "log": {
            "iocname": iocname,
            "severity": severity,
            "message": message,
            "timestamp": now_timestamp(),
        }
    })
}

/// `[IOC=<name>] <dd-Mon-yy> <HH:MM:SS> <host> <user> <pv> new=.. old=.. [min=.. max=..]`
pub fn normalize_caputlog(line: &str) -> Value {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    let mut log = serde_json::Map::new();
    if let Some(ioc) = tokens.first().and_then(|t| t.strip_prefix("IOC=")) {
        log.insert("iocname".into(), ioc.into());
        tokens.remove(0);
    }

    let stamp = format!("{} {}", tokens[0], tokens[1]);
    let timestamp = NaiveDateTime::parse_from_str(&stamp, "%d-%b-%y %H:%M:%S").unwrap();
    log.insert(
        "timestamp".into(),
        timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string().into(),
    );
    log.insert("client_hostname".into(), tokens[2].into());
    log.insert("client_username".into(), tokens[3].into());
    log.insert("pvname".into(), tokens[4].into());
    for pair in &tokens[5..] {
        if let Some((key, value)) = pair.split_once('=') {
            log.insert(format!("{key}_value"), value.into());
        }
    }
    json!({ "log": log })
}

/// Wraps a JSON event under `log` and stamps it.
pub fn normalize_json_event(line: &str) -> Value {
    let mut event: Value = serde_json::from_str(line).unwrap();
    event["timestamp"] = now_timestamp().into();
    json!({ "log": event })
}

/// Echoes the raw message back under `log.raw`.
pub fn normalize_echo(line: &str) -> Value {
    json!({ "log": { "raw": line, "timestamp": now_timestamp() } })
}
