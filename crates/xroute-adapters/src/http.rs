use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use xroute_core::PortError;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, PortError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PortError::Transport(format!("failed to build http client: {e}")))
}

/// Decodes a JSON response, mapping error statuses onto [`PortError`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, PortError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| PortError::Transport(format!("{what} read failed: {e}")))?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or(text);
        let detail = format!("{what} status {status}: {message}");
        return Err(match status.as_u16() {
            404 => PortError::NotFound(detail),
            400..=499 => PortError::Rejected(detail),
            _ => PortError::Transport(detail),
        });
    }

    serde_json::from_str(&text)
        .map_err(|e| PortError::Transport(format!("{what} json decode failed: {e}")))
}

/// Reads an integer the Cosmos REST gateway may encode as a string or a number.
pub(crate) fn u64_field(value: &Value, key: &str) -> Result<u64, PortError> {
    match value.get(key) {
        Some(Value::String(raw)) => raw
            .parse()
            .map_err(|e| PortError::Validation(format!("invalid {key} {raw:?}: {e}"))),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| PortError::Validation(format!("invalid {key} {n}"))),
        Some(Value::Null) | None => Ok(0),
        Some(other) => Err(PortError::Validation(format!("invalid {key} {other}"))),
    }
}
