//! Shared handling of remote attester responses

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Outcome of reading a remote response body
pub(crate) enum Reply<T> {
    Ok(T),
    Rejected { status: u16, body: String },
    Invalid(String),
}

/// Read the whole body; anything other than 200 is a rejection.
pub(crate) async fn read_reply<T: DeserializeOwned>(response: reqwest::Response) -> Result<Reply<T>, reqwest::Error> {
    let status = response.status();
    let body = response.text().await?;
    if status != StatusCode::OK {
        return Ok(Reply::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    Ok(match serde_json::from_str(&body) {
        Ok(value) => Reply::Ok(value),
        Err(e) => Reply::Invalid(format!("invalid response body {:?}: {}", body, e)),
    })
}
