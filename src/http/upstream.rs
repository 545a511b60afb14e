//! Bounded reads of outbound response bodies.
//!
//! Fetched pages and markdown sources are pulled as a byte stream and never
//! read past `upstream.max_body_size`. A declared `Content-Length` over the cap
//! is refused before the first chunk.

use axum::body::Bytes;
use futures_util::stream::{BoxStream, Stream, StreamExt};

use crate::http::error::{AppError, AppResult};

/// An upstream body read chunk by chunk under a byte cap.
pub struct BoundedBody {
    stream: BoxStream<'static, reqwest::Result<Bytes>>,
    limit: usize,
    read: usize,
}

impl BoundedBody {
    pub fn new(response: reqwest::Response, limit: usize) -> AppResult<Self> {
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(too_large(limit));
        }
        Ok(Self {
            stream: response.bytes_stream().boxed(),
            limit,
            read: 0,
        })
    }

    /// Next chunk, or `None` at the end of the body.
    pub async fn next_chunk(&mut self) -> AppResult<Option<Bytes>> {
        let Some(chunk) = self.stream.next().await else {
            return Ok(None);
        };
        let chunk = chunk?;
        self.read += chunk.len();
        if self.read > self.limit {
            return Err(too_large(self.limit));
        }
        Ok(Some(chunk))
    }

    /// Buffer the rest of the body.
    pub async fn collect(mut self) -> AppResult<Bytes> {
        let mut out = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            out.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(out))
    }

    /// Relay the body as a stream that fails once the cap is crossed.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send {
        futures_util::stream::try_unfold(self, |mut body| async move {
            match body.next_chunk().await {
                Ok(Some(chunk)) => Ok(Some((chunk, body))),
                Ok(None) => Ok(None),
                Err(err) => Err(std::io::Error::other(err.to_string())),
            }
        })
    }
}

fn too_large(limit: usize) -> AppError {
    AppError::bad_request(format!("Upstream response exceeds {limit} bytes"))
}
