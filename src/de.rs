use async_trait::async_trait;
use hyper::body::Buf;
use hyper::{Body, Response};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Decode a JSON body into `T`.
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

#[async_trait]
pub trait FromJsonResponse {
    /// Reject non-2xx statuses, then aggregate and decode the body.
    async fn from_json<T: DeserializeOwned + Send>(self) -> Result<T>;
}

#[async_trait]
impl FromJsonResponse for Response<Body> {
    async fn from_json<T: DeserializeOwned + Send>(self) -> Result<T> {
        let status = self.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let buf = hyper::body::aggregate(self.into_body()).await?;
        Ok(serde_json::from_reader(buf.reader())?)
    }
}
