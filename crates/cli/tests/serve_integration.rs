//! Integration tests for the `proof run` HTTP form server.
//!
//! Each test starts the server as a child process on a unique port,
//! drives the JSON API with raw HTTP requests, and verifies the
//! reactive visibility behavior end to end.

use std::io::Read;
use std::net::TcpStream;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use tempfile::TempDir;

/// Atomic port counter to avoid conflicts between parallel tests. Base
/// port derives from the process ID so separate test binaries don't
/// collide on the same range.
static NEXT_PORT: AtomicU16 = AtomicU16::new(0);
static PORT_INIT: std::sync::Once = std::sync::Once::new();

fn next_port() -> u16 {
    PORT_INIT.call_once(|| {
        let base = 21000 + (std::process::id() as u16 % 20000);
        NEXT_PORT.store(base, Ordering::SeqCst);
    });
    NEXT_PORT.fetch_add(1, Ordering::SeqCst)
}

/// Server child that is killed when the test ends.
struct Server {
    child: Child,
    port: u16,
    // Kept alive for the lifetime of the server.
    _template: TempDir,
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn start_server(schema: &str) -> Server {
    let template = TempDir::new().expect("temp dir");
    std::fs::write(template.path().join("cookiecutter.json"), schema).expect("write schema");

    let port = next_port();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_proof"));
    cmd.arg("run")
        .arg(template.path())
        .arg("--port")
        .arg(port.to_string())
        .arg("--quiet");
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let child = cmd.spawn().expect("failed to start proof run");
    for _ in 0..50 {
        if TcpStream::connect(format!("127.0.0.1:{}", port)).is_ok() {
            return Server {
                child,
                port,
                _template: template,
            };
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    Server {
        child,
        port,
        _template: template,
    }
}

fn http_get(port: u16, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{}", port)).expect("failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost:{}\r\nConnection: close\r\n\r\n",
        path, port
    );
    std::io::Write::write_all(&mut stream, request.as_bytes()).expect("failed to write");

    let mut response = String::new();
    let _ = stream.read_to_string(&mut response);
    parse_http_response(&response)
}

fn http_post(port: u16, path: &str, body: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{}", port)).expect("failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();

    let request = format!(
        "POST {} HTTP/1.1\r\nHost: localhost:{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        path, port, body.len(), body
    );
    std::io::Write::write_all(&mut stream, request.as_bytes()).expect("failed to write");

    let mut response = String::new();
    let _ = stream.read_to_string(&mut response);
    parse_http_response(&response)
}

fn parse_http_response(response: &str) -> (u16, String) {
    let status = response
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_owned())
        .unwrap_or_default();
    (status, body)
}

fn field_names(view: &serde_json::Value) -> Vec<String> {
    view["fields"]
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|f| f["name"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

const SCHEMA: &str = r#"{
    "project_name": "My Project",
    "project_slug": "{{ cookiecutter.project_name | lower | replace(' ', '-') }}",
    "license": ["MIT", "Apache-2.0"],
    "attribution_text": "",
    "_viz_context": {
        "is_required": ["project_name"],
        "if": { "license": { "is": "MIT", "ask_for": ["attribution_text"] } }
    }
}"#;

#[test]
fn health_reports_the_template() {
    let server = start_server(SCHEMA);
    let (status, body) = http_get(server.port, "/health");
    assert_eq!(status, 200);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["status"], "ok");
}

#[test]
fn index_serves_the_form_page() {
    let server = start_server(SCHEMA);
    let (status, body) = http_get(server.port, "/");
    assert_eq!(status, 200);
    assert!(body.contains("<html"));
}

#[test]
fn unknown_routes_return_404() {
    let server = start_server(SCHEMA);
    let (status, _) = http_get(server.port, "/nope");
    assert_eq!(status, 404);
}

#[test]
fn value_change_toggles_dependent_visibility() {
    let server = start_server(SCHEMA);

    // MIT is the default, so attribution starts visible.
    let (status, body) = http_get(server.port, "/form");
    assert_eq!(status, 200);
    let view: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(field_names(&view).contains(&"attribution_text".to_owned()));

    // Switching the controlling value hides the dependent in the same
    // response.
    let (status, body) = http_post(
        server.port,
        "/values",
        r#"{"name": "license", "value": "Apache-2.0"}"#,
    );
    assert_eq!(status, 200);
    let view: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(!field_names(&view).contains(&"attribution_text".to_owned()));

    let (status, body) = http_post(
        server.port,
        "/values",
        r#"{"name": "license", "value": "MIT"}"#,
    );
    assert_eq!(status, 200);
    let view: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(field_names(&view).contains(&"attribution_text".to_owned()));
}

#[test]
fn computed_field_tracks_edits() {
    let server = start_server(SCHEMA);

    let (status, body) = http_post(
        server.port,
        "/values",
        r#"{"name": "project_name", "value": "Space Parrot"}"#,
    );
    assert_eq!(status, 200);
    let view: serde_json::Value = serde_json::from_str(&body).unwrap();
    let slug = view["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "project_slug")
        .unwrap();
    assert_eq!(slug["widget"]["value"], "space-parrot");
    assert_eq!(slug["editable"], false);
}

#[test]
fn unknown_parameter_is_a_404() {
    let server = start_server(SCHEMA);
    let (status, _) = http_post(
        server.port,
        "/values",
        r#"{"name": "ghost", "value": "x"}"#,
    );
    assert_eq!(status, 404);
}

#[test]
fn bake_refuses_while_required_values_are_missing() {
    let server = start_server(SCHEMA);
    let (status, body) = http_post(server.port, "/bake", "");
    assert_eq!(status, 422);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["missing"], serde_json::json!(["project_name"]));
    assert_eq!(
        response["messages"][0],
        "Parameter \"project_name\" is missing"
    );
}
