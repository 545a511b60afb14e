//! `/qrcode`: render query text as an SVG QR code.

use ::qrcode::{render::svg, EcLevel, QrCode};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::error::{AppError, AppResult};
use crate::http::params::{parse_number, QueryParams};
use crate::http::request::RouteRequest;
use crate::http::server::AppState;

pub const DEFAULT_TEXT: &str = "Edgebin is awesome!";
pub const DEFAULT_WIDTH: u32 = 350;
const MAX_WIDTH: u32 = 4096;

/// Rendering options, from query parameters named after the usual QR library options.
#[derive(Debug, Clone, PartialEq)]
pub struct QrOptions {
    pub text: String,
    pub level: EcLevel,
    pub width: u32,
    pub margin: u32,
    pub dark: String,
    pub light: String,
}

impl QrOptions {
    pub fn from_query(query: &QueryParams) -> AppResult<Self> {
        let kind = query.get_non_empty("type").unwrap_or("svg");
        if kind != "svg" {
            return Err(AppError::bad_request(format!("Unsupported QR code type: {kind}")));
        }

        let level = match query.get_non_empty("errorCorrectionLevel") {
            None => EcLevel::H,
            Some(raw) => parse_level(raw)?,
        };

        let width = match query.get_non_empty("width") {
            None => DEFAULT_WIDTH,
            Some(raw) => parse_number::<u32>(raw)?,
        };
        if width == 0 || width > MAX_WIDTH {
            return Err(AppError::bad_request(format!(
                "QR code width must be between 1 and {MAX_WIDTH}"
            )));
        }

        let margin = match query.get_non_empty("margin") {
            None => 4,
            Some(raw) => parse_number::<u32>(raw)?,
        };

        Ok(Self {
            text: query.get_non_empty("text").unwrap_or(DEFAULT_TEXT).to_string(),
            level,
            width,
            margin,
            dark: parse_color(query.get_non_empty("dark"), "#000000")?,
            light: parse_color(query.get_non_empty("light"), "#ffffff")?,
        })
    }

    pub fn render(&self) -> AppResult<String> {
        let code = QrCode::with_error_correction_level(self.text.as_bytes(), self.level)
            .map_err(|e| AppError::bad_request(format!("Cannot encode QR code: {e}")))?;
        Ok(code
            .render::<svg::Color>()
            .min_dimensions(self.width, self.width)
            .quiet_zone(self.margin > 0)
            .dark_color(svg::Color(&self.dark))
            .light_color(svg::Color(&self.light))
            .build())
    }
}

fn parse_level(raw: &str) -> AppResult<EcLevel> {
    match raw.to_ascii_uppercase().as_str() {
        "L" | "LOW" => Ok(EcLevel::L),
        "M" | "MEDIUM" => Ok(EcLevel::M),
        "Q" | "QUARTILE" => Ok(EcLevel::Q),
        "H" | "HIGH" => Ok(EcLevel::H),
        _ => Err(AppError::bad_request(format!(
            "Unsupported errorCorrectionLevel: {raw}"
        ))),
    }
}

/// `#rgb`, `#rrggbb` or `#rrggbbaa`; the leading `#` is optional.
fn parse_color(raw: Option<&str>, default: &str) -> AppResult<String> {
    let Some(raw) = raw else {
        return Ok(default.to_string());
    };
    let hex = raw.trim_start_matches('#');
    if matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(format!("#{hex}"))
    } else {
        Err(AppError::bad_request(format!("Invalid color: {raw}")))
    }
}

pub async fn qrcode(_state: AppState, req: RouteRequest) -> AppResult<Response> {
    let svg = QrOptions::from_query(&req.query)?.render()?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        svg,
    )
        .into_response())
}
