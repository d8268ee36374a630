use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};
use serde::{Deserialize, Serialize};

/// Geolocation headers set by the hosting platform / edge proxy.
pub const COUNTRY_HEADER: &str = "x-geo-country";
pub const REGION_HEADER: &str = "x-geo-region";
pub const CITY_HEADER: &str = "x-geo-city";
pub const LATLONG_HEADER: &str = "x-geo-latlong";

/// A coarse "lat,lon" coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Parse the platform's `"lat,lon"` header value. Malformed input is
    /// treated the same as an absent header.
    pub fn parse(value: &str) -> Option<Self> {
        let (lat, lon) = value.split_once(',')?;
        Some(Self {
            lat: lat.trim().parse().ok()?,
            lon: lon.trim().parse().ok()?,
        })
    }
}

/// Per-request network context: the caller's address plus the coarse
/// geolocation the platform attached to the request.
///
/// The address comes from the TCP peer via `ConnectInfo`; forwarding headers
/// are not trusted for it since any client can set them.
#[derive(Debug, Clone)]
pub struct GeoContext {
    pub ip_address: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub geo_point: Option<GeoPoint>,
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for GeoContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip_address = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let geo_point = header_value(&parts.headers, LATLONG_HEADER)
            .and_then(|value| GeoPoint::parse(&value));

        Ok(GeoContext {
            ip_address,
            country: header_value(&parts.headers, COUNTRY_HEADER),
            region: header_value(&parts.headers, REGION_HEADER),
            city: header_value(&parts.headers, CITY_HEADER),
            geo_point,
        })
    }
}
