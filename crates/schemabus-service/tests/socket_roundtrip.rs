#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use schemabus_service::{
    ClientConfig, Reply, SchemaClient, SchemaServer, SchemaService, ServerConfig,
};
use schemabus_wire::{connect, FrameConfig, FrameReader, FrameWriter};
use serde_json::{json, Value};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "schemabus-svc-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

struct RunningServer {
    path: PathBuf,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RunningServer {
    fn start(path: PathBuf) -> Self {
        Self::start_with_config(path, ServerConfig::default())
    }

    fn start_with_config(path: PathBuf, config: ServerConfig) -> Self {
        let server = SchemaServer::bind(&path, Arc::new(SchemaService::new()))
            .expect("server should bind")
            .with_config(config);
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::spawn(move || {
            server.serve(&flag).expect("serve loop should not fail");
        });
        wait_for_connect(&path, Duration::from_secs(3));
        Self {
            path,
            running,
            handle: Some(handle),
        }
    }

    fn client(&self) -> SchemaClient {
        SchemaClient::connect(&self.path).expect("client should connect")
    }

    fn stop(mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.join().expect("server thread should exit");
        }
    }
}

fn wait_for_connect(path: &Path, timeout: Duration) {
    let start = Instant::now();
    loop {
        if connect(path).is_ok() {
            return;
        }
        if start.elapsed() >= timeout {
            panic!("connect timeout");
        }
        thread::sleep(Duration::from_millis(25));
    }
}

fn person_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": { "name": { "type": "string" } }
    })
}

#[test]
fn add_validate_and_list_over_socket() {
    let dir = unique_temp_dir("roundtrip");
    let server = RunningServer::start(dir.join("validator.sock"));
    let mut client = server.client();

    assert_eq!(
        client.add_schema("person", person_schema(), false).unwrap(),
        Reply::ok()
    );
    assert_eq!(
        client.add_schema("person", person_schema(), false).unwrap(),
        Reply::error("key.already.exists")
    );
    assert_eq!(
        client.validate("person", json!({ "name": "Ann" })).unwrap(),
        Reply::ok()
    );

    let reply = client.validate("person", json!({ "name": 7 })).unwrap();
    assert!(reply.is_non_conforming());
    assert_eq!(reply.violations.as_ref().map(Vec::len), Some(1));

    assert_eq!(
        client.validate("ghost", json!({})).unwrap(),
        Reply::error("invalid.schema.key")
    );
    assert_eq!(client.schema_keys().unwrap(), vec!["person".to_string()]);

    drop(client);
    server.stop();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn raw_bodies_get_error_replies() {
    let dir = unique_temp_dir("raw");
    let server = RunningServer::start(dir.join("validator.sock"));
    let mut client = server.client();

    assert_eq!(
        client.call_value(&json!({ "action": "purge" })).unwrap(),
        Reply::error("invalid.action")
    );
    assert_eq!(
        client.call_value(&json!({ "action": "validate", "key": "k" })).unwrap(),
        Reply::error("invalid.schema.key")
    );

    // A body that is not JSON at all still gets exactly one reply.
    let stream = connect(&server.path).unwrap();
    let mut writer = FrameWriter::new(stream.try_clone().unwrap());
    let mut reader = FrameReader::new(stream);
    writer.send(41, b"{ not json").unwrap();
    let frame = reader.read_frame().unwrap();
    assert_eq!(frame.id, 41);
    let reply: Reply = serde_json::from_slice(&frame.payload).unwrap();
    assert_eq!(reply, Reply::error("invalid.action"));

    drop(client);
    server.stop();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn oversized_request_is_answered_before_close() {
    let dir = unique_temp_dir("oversize");
    let server = RunningServer::start_with_config(
        dir.join("validator.sock"),
        ServerConfig {
            frame: FrameConfig {
                max_payload_size: 64,
                ..FrameConfig::default()
            },
            ..ServerConfig::default()
        },
    );

    let stream = connect(&server.path).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut writer = FrameWriter::new(stream.try_clone().unwrap());
    let mut reader = FrameReader::new(stream);
    writer.send(7, &[b' '; 200]).unwrap();

    let frame = reader.read_frame().unwrap();
    assert_eq!(frame.id, 7);
    let reply: Reply = serde_json::from_slice(&frame.payload).unwrap();
    assert_eq!(reply, Reply::error("request.too.large"));
    assert!(reader.read_frame().is_err());

    // The listener keeps serving other clients.
    let mut client = server.client();
    assert_eq!(client.schema_keys().unwrap(), Vec::<String>::new());

    drop(client);
    server.stop();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn clients_share_one_registry() {
    let dir = unique_temp_dir("shared");
    let server = RunningServer::start(dir.join("validator.sock"));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let path = server.path.clone();
            thread::spawn(move || {
                let mut client = SchemaClient::connect_with_config(
                    &path,
                    ClientConfig {
                        timeout: Some(Duration::from_secs(5)),
                        ..ClientConfig::default()
                    },
                )
                .unwrap();
                let key = format!("schema-{i}");
                assert!(client.add_schema(&key, person_schema(), false).unwrap().is_ok());
                assert!(client.validate(&key, json!({ "name": "x" })).unwrap().is_ok());
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let keys = server.client().schema_keys().unwrap();
    assert_eq!(
        keys,
        vec!["schema-0", "schema-1", "schema-2", "schema-3"]
    );

    server.stop();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn stopping_the_server_removes_its_socket() {
    let dir = unique_temp_dir("stop");
    let path = dir.join("validator.sock");
    let server = RunningServer::start(path.clone());
    assert!(path.exists());

    server.stop();
    assert!(!path.exists());
    assert!(SchemaClient::connect(&path).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
