#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value};
use tiny_http::{Method, Response, Server, StatusCode};

use xroute_adapters::XrouteConfig;

/// A recorded request: method, url (with query) and body.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub url: String,
    pub body: Value,
}

pub type Calls = Arc<Mutex<Vec<Call>>>;

pub fn spawn_mock_server<F>(calls: Calls, handler: F) -> String
where
    F: Fn(&Method, &str, &Value) -> (u16, Value) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());

    thread::spawn(move || {
        for _ in 0..16 {
            let mut req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let method = req.method().clone();
            let url = req.url().to_owned();
            let mut raw = String::new();
            let _ = req.as_reader().read_to_string(&mut raw);
            let body = serde_json::from_str(&raw).unwrap_or(Value::Null);
            if let Ok(mut g) = calls.lock() {
                g.push(Call {
                    method: method.to_string(),
                    url: url.clone(),
                    body: body.clone(),
                });
            }

            let (code, payload) = handler(&method, &url, &body);
            let response = Response::from_string(payload.to_string())
                .with_status_code(StatusCode(code))
                .with_header(
                    "Content-Type: application/json"
                        .parse::<tiny_http::Header>()
                        .expect("header"),
                );
            let _ = req.respond(response);
        }
    });

    addr
}

pub fn not_found() -> (u16, Value) {
    (404, json!({"code": 5, "message": "not found"}))
}

/// Points a config at the mock server; `None` keeps the default client id.
pub fn config_for(base_url: &str, client_id: Option<&str>) -> XrouteConfig {
    let mut config = XrouteConfig {
        api_url: base_url.to_owned(),
        request_timeout_ms: 5_000,
        ..XrouteConfig::default()
    };
    if let Some(client_id) = client_id {
        config.client_id = client_id.to_owned();
    }
    config
}

pub fn calls_matching(calls: &Calls, needle: &str) -> Vec<Call> {
    calls
        .lock()
        .expect("calls lock")
        .iter()
        .filter(|c| c.url.contains(needle))
        .cloned()
        .collect()
}
