//! Mock Elasticsearch HTTP endpoint.
//!
//! Serves canned responses per path on a loopback port. Unknown paths get a
//! 404 with an Elasticsearch-style error body.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// One canned response
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub status_text: &'static str,
    pub body: String,
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        MockResponse {
            status: 200,
            status_text: "OK",
            body: body.into(),
        }
    }

    pub fn status(status: u16, status_text: &'static str, body: impl Into<String>) -> Self {
        MockResponse {
            status,
            status_text,
            body: body.into(),
        }
    }
}

/// Loopback HTTP server answering from a route table
pub struct MockCluster {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockCluster {
    /// Start serving `routes` (path -> response) on an ephemeral port.
    pub fn start(routes: HashMap<String, MockResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        let routes = Arc::new(routes);

        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&log);
                thread::spawn(move || serve(stream, &routes, &log));
            }
        });

        MockCluster { port, requests }
    }

    /// A healthy 1.7 cluster serving `snapshot` (the JSON of a snapshot
    /// file) from the metadata APIs
    pub fn healthy(snapshot: &serde_json::Value) -> HashMap<String, MockResponse> {
        let mut routes = HashMap::new();
        routes.insert(
            "/".to_string(),
            MockResponse::ok(r#"{"name":"node-1","version":{"number":"1.7.3","build_snapshot":false}}"#),
        );
        let body = |key: &str| snapshot.get(key).cloned().unwrap_or_else(|| serde_json::json!({})).to_string();
        routes.insert(
            "/_segments".to_string(),
            MockResponse::ok(serde_json::json!({ "indices": snapshot.get("segments").cloned().unwrap_or_default() }).to_string()),
        );
        routes.insert("/_settings".to_string(), MockResponse::ok(body("settings")));
        routes.insert("/_mappings".to_string(), MockResponse::ok(body("mappings")));
        routes.insert("/_warmers".to_string(), MockResponse::ok(body("warmers")));
        routes.insert("/_aliases".to_string(), MockResponse::ok(body("aliases")));
        routes.insert("/_cluster/settings".to_string(), MockResponse::ok(body("cluster_settings")));
        routes
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Request paths received so far, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn serve(mut stream: TcpStream, routes: &HashMap<String, MockResponse>, log: &Mutex<Vec<String>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    // Drain headers
    let mut line = String::new();
    while reader.read_line(&mut line).map(|n| n > 2).unwrap_or(false) {
        line.clear();
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
    log.lock().unwrap().push(path.clone());

    let response = routes.get(&path).cloned().unwrap_or_else(|| {
        MockResponse::status(
            404,
            "Not Found",
            format!(r#"{{"error":"no handler found for uri [{}]","status":404}}"#, path),
        )
    });

    let raw = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        response.status_text,
        response.body.len(),
        response.body
    );
    let _ = stream.write_all(raw.as_bytes());
    let _ = stream.flush();
}
