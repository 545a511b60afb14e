//! Generated data: delays, random bytes, base64 decoding, UUIDs and dates.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use ::base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Locale, SecondsFormat, Utc};
use chrono_tz::Tz;
use rand::RngCore;
use serde_json::{json, Value};
use std::time::Duration;
use ::uuid::Uuid;

use crate::http::error::{AppError, AppResult};
use crate::http::params::parse_number;
use crate::http::request::RouteRequest;
use crate::http::response;
use crate::http::server::AppState;

/// Upper bound for `/delay` and the `/mix` delay.
pub const MAX_DELAY_SECS: u64 = 10;
pub const MAX_BYTES: i64 = 65_536;
pub const MAX_UUIDS: i64 = 100;
pub const BASE64_HINT: &str = "SFRUUEJJTiBpcyBhd2Vzb21l";

/// Seconds from user input, clamped to `[0, MAX_DELAY_SECS]`.
pub fn clamp_delay(raw: &str) -> AppResult<f64> {
    let secs: f64 = parse_number(raw)?;
    if !secs.is_finite() {
        return Err(AppError::bad_request(format!("Invalid delay: {raw}")));
    }
    Ok(secs.clamp(0.0, MAX_DELAY_SECS as f64))
}

pub async fn delay(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let raw = req
        .route
        .arg(0)
        .ok_or_else(|| AppError::bad_request("Delay seconds is required"))?;
    let secs = clamp_delay(raw)?;
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    response::json(json!({ "delay": secs }))
}

pub async fn bytes(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let raw = req
        .route
        .arg(0)
        .ok_or_else(|| AppError::bad_request("Byte count is required"))?;
    let count: i64 = parse_number(raw)?;
    if !(1..=MAX_BYTES).contains(&count) {
        return Err(AppError::bad_request(format!(
            "Byte count must be between 1 and {MAX_BYTES}, got {count}"
        )));
    }

    let mut buf = vec![0u8; count as usize];
    rand::thread_rng().fill_bytes(&mut buf);
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        buf,
    )
        .into_response())
}

pub async fn base64(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    // `/` belongs to the alphabet, so the data spans every remaining segment.
    let encoded = req.route.args().join("/");
    if encoded.is_empty() {
        return Err(AppError::bad_request("Base64 data is required"));
    }
    let decoded = STANDARD.decode(&encoded).map_err(|_| {
        AppError::bad_request(format!("Incorrect Base64 data, try: {BASE64_HINT}"))
    })?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        String::from_utf8_lossy(&decoded).into_owned(),
    )
        .into_response())
}

/// `/uuid` → `{uuid}`; `/uuid/n` → `{uuids: [..]}` with n clamped to `[1, 100]`.
pub async fn uuid(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let Some(raw) = req.route.arg(0) else {
        return response::json(json!({ "uuid": Uuid::new_v4() }));
    };
    let count = parse_number::<i64>(raw)?.clamp(1, MAX_UUIDS);
    let uuids: Vec<_> = (0..count).map(|_| Uuid::new_v4()).collect();
    response::json(json!({ "uuids": uuids }))
}

pub async fn date(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let format = DateFormat::parse(req.query.get("format"));
    let tz = match req.query.get_non_empty("timeZone") {
        Some(raw) => parse_time_zone(raw)?,
        None => Tz::UTC,
    };
    let locale = parse_locale(req.query.get_non_empty("locale"));
    response::json(json!({ "date": render_date(Utc::now(), format, tz, locale) }))
}

/// Output styles for `/date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// RFC 3339 with milliseconds in the requested zone.
    Iso,
    /// Locale-specific date and time representation.
    Locale,
    /// RFC 7231 HTTP date, always GMT.
    Utc,
    /// Milliseconds since the Unix epoch.
    Timestamp,
}

impl DateFormat {
    /// Unknown values fall back to ISO.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("locale") => DateFormat::Locale,
            Some("utc") => DateFormat::Utc,
            Some("ts") => DateFormat::Timestamp,
            _ => DateFormat::Iso,
        }
    }
}

pub fn parse_time_zone(raw: &str) -> AppResult<Tz> {
    raw.parse::<Tz>()
        .map_err(|_| AppError::bad_request(format!("Invalid time zone: {raw}")))
}

/// BCP 47 style (`en-US`) or POSIX style (`en_US`). Unknown locales fall back to `en_US`.
pub fn parse_locale(raw: Option<&str>) -> Locale {
    raw.map(|r| r.replace('-', "_"))
        .and_then(|r| r.parse::<Locale>().ok())
        .unwrap_or(Locale::en_US)
}

pub fn render_date(now: DateTime<Utc>, format: DateFormat, tz: Tz, locale: Locale) -> Value {
    let local = now.with_timezone(&tz);
    match format {
        DateFormat::Iso => json!(local.to_rfc3339_opts(SecondsFormat::Millis, true)),
        DateFormat::Locale => json!(local.format_localized("%c", locale).to_string()),
        DateFormat::Utc => json!(http_date(now)),
        DateFormat::Timestamp => json!(now.timestamp_millis()),
    }
}

/// `Tue, 02 Jan 2024 03:04:05 GMT`
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::get;
    use chrono::TimeZone;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_render_formats() {
        let now = fixed();
        assert_eq!(
            render_date(now, DateFormat::Iso, Tz::UTC, Locale::en_US),
            json!("2024-01-02T03:04:05.000Z")
        );
        assert_eq!(
            render_date(now, DateFormat::Iso, chrono_tz::Asia::Shanghai, Locale::en_US),
            json!("2024-01-02T11:04:05.000+08:00")
        );
        assert_eq!(
            render_date(now, DateFormat::Utc, chrono_tz::Asia::Shanghai, Locale::en_US),
            json!("Tue, 02 Jan 2024 03:04:05 GMT")
        );
        assert_eq!(
            render_date(now, DateFormat::Timestamp, Tz::UTC, Locale::en_US),
            json!(1_704_164_645_000i64)
        );
        let localized = render_date(now, DateFormat::Locale, Tz::UTC, Locale::de_DE);
        assert!(localized.as_str().unwrap().contains("2024"));
    }

    #[test]
    fn test_format_and_locale_parsing() {
        assert_eq!(DateFormat::parse(None), DateFormat::Iso);
        assert_eq!(DateFormat::parse(Some("bogus")), DateFormat::Iso);
        assert_eq!(DateFormat::parse(Some("TS")), DateFormat::Timestamp);
        assert_eq!(parse_locale(Some("de-DE")), Locale::de_DE);
        assert_eq!(parse_locale(Some("xx-nope")), Locale::en_US);
        assert!(parse_time_zone("Mars/Olympus").is_err());
    }

    #[test]
    fn test_clamp_delay() {
        assert_eq!(clamp_delay("3").unwrap(), 3.0);
        assert_eq!(clamp_delay("100").unwrap(), 10.0);
        assert_eq!(clamp_delay("-2").unwrap(), 0.0);
        assert!(clamp_delay("NaN").is_err());
        assert!(clamp_delay("soon").is_err());
    }

    #[tokio::test]
    async fn test_delay_route() {
        let response = get("/delay/0").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({ "delay": 0.0 }));
        assert_eq!(get("/delay").await.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bytes_lengths() {
        for n in [1usize, 10, 1000, 65_536] {
            let response = get(&format!("/bytes/{n}")).await;
            assert_eq!(response.status, StatusCode::OK);
            assert_eq!(response.body.len(), n);
            assert_eq!(response.header("content-type"), Some("application/octet-stream"));
        }
        for path in ["/bytes", "/bytes/0", "/bytes/-5", "/bytes/65537", "/bytes/lots"] {
            assert_eq!(get(path).await.status, StatusCode::BAD_REQUEST, "{path}");
        }
    }

    #[tokio::test]
    async fn test_base64_decode() {
        let response = get("/base64/SFRUUEJJTiBpcyBhd2Vzb21l").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.text(), "HTTPBIN is awesome");

        let response = get("/base64/@@@@").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json()["message"],
            json!("Incorrect Base64 data, try: SFRUUEJJTiBpcyBhd2Vzb21l")
        );
        assert_eq!(get("/base64").await.status, StatusCode::BAD_REQUEST);
        assert_eq!(get("/base64/").await.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_base64_data_may_contain_slashes() {
        let response = get("/base64/Pz8/Pw==").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.text(), "????");
    }

    #[tokio::test]
    async fn test_uuid_counts() {
        let single = get("/uuid").await.json();
        assert!(Uuid::parse_str(single["uuid"].as_str().unwrap()).is_ok());

        let many = get("/uuid/5").await.json();
        assert_eq!(many["uuids"].as_array().unwrap().len(), 5);

        let capped = get("/uuid/1000").await.json();
        assert_eq!(capped["uuids"].as_array().unwrap().len(), 100);

        assert_eq!(get("/uuid/x").await.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_date_route() {
        let response = get("/date?format=ts").await;
        assert!(response.json()["date"].is_i64());

        let response = get("/date?timeZone=Asia/Tokyo").await;
        assert!(response.json()["date"].as_str().unwrap().ends_with("+09:00"));

        assert_eq!(
            get("/date?timeZone=Nowhere/Land").await.status,
            StatusCode::BAD_REQUEST
        );
    }
}
