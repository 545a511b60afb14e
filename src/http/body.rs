//! Request body interpretation for the echo routes.
//!
//! The branch is picked from `Content-Type` (default `application/octet-stream`):
//!
//! | Content-Type                        | Output                          |
//! |-------------------------------------|---------------------------------|
//! | `application/json`                  | `json`                          |
//! | `text/*`                            | `data` (raw text)               |
//! | multipart / url-encoded form        | `form` + `files`                |
//! | anything else, non-empty            | `data` (base64 data URL)        |
//! | anything else, empty                | nothing                         |

use axum::extract::{FromRequest, Multipart};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::http::error::{AppError, AppResult};
use crate::http::params::fold_pairs;
use crate::http::request::RouteRequest;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An uploaded file as echoed back to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
    pub name: String,
    /// Inline text for text files, otherwise a base64 data URL.
    pub content: String,
}

/// `data:<type>;base64,<payload>`
pub fn data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

/// Describe the request body as JSON fields to merge into an echo response.
pub async fn describe_body(req: &mut RouteRequest) -> AppResult<Map<String, Value>> {
    let content_type = req
        .content_type()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();
    let mut out = Map::new();

    if content_type.contains("application/json") {
        let bytes = req.bytes().await?;
        let json: Value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::bad_request(format!("Invalid JSON body: {e}")))?;
        out.insert("json".into(), json);
    } else if content_type.contains("text") {
        out.insert("data".into(), Value::String(req.text().await?));
    } else if content_type.contains("multipart/form-data") {
        let (form, files) = read_multipart(req).await?;
        out.insert("form".into(), Value::Object(form));
        out.insert("files".into(), Value::Object(files));
    } else if content_type.contains("application/x-www-form-urlencoded") {
        let bytes = req.bytes().await?;
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(&bytes).into_owned().collect();
        let mut form = Map::new();
        fold_pairs(&mut form, pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        out.insert("form".into(), Value::Object(form));
        out.insert("files".into(), Value::Object(Map::new()));
    } else {
        tracing::debug!(content_type = %content_type, "Echoing opaque body");
        let bytes = req.bytes().await?;
        if !bytes.is_empty() {
            out.insert("data".into(), Value::String(data_url(&content_type, &bytes)));
        }
    }

    Ok(out)
}

async fn read_multipart(req: &mut RouteRequest) -> AppResult<(Map<String, Value>, Map<String, Value>)> {
    let mut multipart = Multipart::from_request(req.body_request(), &())
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?;

    let mut form = Map::new();
    let mut files = Map::new();

    while let Some(field) = multipart.next_field().await? {
        let key = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(name) => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                let content = if content_type.contains("text") {
                    String::from_utf8_lossy(&bytes).into_owned()
                } else {
                    data_url(&content_type, &bytes)
                };
                let info = FileInfo {
                    size: bytes.len(),
                    content_type,
                    name,
                    content,
                };
                files.insert(key, serde_json::to_value(info)?);
            }
            None => {
                let value = field.text().await?;
                fold_pairs(&mut form, [(key.as_str(), value.as_str())]);
            }
        }
    }

    Ok((form, files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;

    fn request(content_type: Option<&str>, body: impl Into<Body>) -> RouteRequest {
        let mut builder = Request::builder().method("POST").uri("/anything");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        RouteRequest::new(builder.body(body.into()).unwrap())
    }

    #[tokio::test]
    async fn test_json_body() {
        let mut req = request(Some("application/json"), r#"{"a":1,"b":2}"#);
        let out = describe_body(&mut req).await.unwrap();
        assert_eq!(out["json"], json!({"a": 1, "b": 2}));
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_declared_error() {
        let mut req = request(Some("application/json"), "{nope");
        let err = describe_body(&mut req).await.unwrap_err();
        assert_eq!(err.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn test_text_body() {
        let mut req = request(Some("text/plain; charset=utf-8"), "hi there");
        let out = describe_body(&mut req).await.unwrap();
        assert_eq!(out["data"], json!("hi there"));
    }

    #[tokio::test]
    async fn test_urlencoded_form() {
        let mut req = request(
            Some("application/x-www-form-urlencoded"),
            "name=John&tag=a&tag=b",
        );
        let out = describe_body(&mut req).await.unwrap();
        assert_eq!(out["form"], json!({"name": "John", "tag": ["a", "b"]}));
        assert_eq!(out["files"], json!({}));
    }

    #[tokio::test]
    async fn test_multipart_fields_and_files() {
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nJohn\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"file1\"; filename=\"test.txt\"\r\nContent-Type: text/plain\r\n\r\nfile content\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"bin\"; filename=\"a.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n\x01\x02\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let ct = format!("multipart/form-data; boundary={boundary}");
        let mut req = request(Some(&ct), body);
        let out = describe_body(&mut req).await.unwrap();

        assert_eq!(out["form"], json!({"name": "John"}));
        assert_eq!(
            out["files"]["file1"],
            json!({
                "size": 12,
                "type": "text/plain",
                "name": "test.txt",
                "content": "file content",
            })
        );
        assert_eq!(out["files"]["bin"]["size"], json!(2));
        assert_eq!(
            out["files"]["bin"]["content"],
            json!("data:application/octet-stream;base64,AQI=")
        );
    }

    #[tokio::test]
    async fn test_binary_body_becomes_data_url() {
        let mut req = request(Some("image/png"), vec![0u8, 1, 2]);
        let out = describe_body(&mut req).await.unwrap();
        assert_eq!(out["data"], json!("data:image/png;base64,AAEC"));
    }

    #[tokio::test]
    async fn test_empty_opaque_body_is_omitted() {
        let mut req = request(None, Body::empty());
        let out = describe_body(&mut req).await.unwrap();
        assert!(out.is_empty());
    }
}
