use serde::Serialize;
use tracing::warn;

use crate::utilities::errors::AppError;

/// Mean earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const DEFAULT_RADIUS_KM: f64 = 10.0;

#[derive(Serialize, Clone, Copy, PartialEq, Debug)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BoundingBox {
    pub north_east: LatLng,
    pub south_west: LatLng,
}

impl BoundingBox {
    pub fn contains(&self, point: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }
}

/// Geo constraint of a search. Exactly one applies per request.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum GeoMode {
    None,
    /// Within `radius_km` of `center`, distance annotated.
    Radius { center: LatLng, radius_km: f64 },
    /// Inside the rectangle, no distance.
    Bounds(BoundingBox),
    /// Distance annotated, no cutoff.
    DistanceSort { center: LatLng },
}

impl GeoMode {
    /// Point distances are measured from, if the mode computes distances.
    pub fn reference_point(&self) -> Option<LatLng> {
        match self {
            Self::Radius { center, .. } | Self::DistanceSort { center } => Some(*center),
            Self::None | Self::Bounds(_) => None,
        }
    }
}

pub fn parse_latitude(field: &str, raw: Option<&str>) -> Result<f64, AppError> {
    parse_coordinate(field, raw, 90.0)
}

pub fn parse_longitude(field: &str, raw: Option<&str>) -> Result<f64, AppError> {
    parse_coordinate(field, raw, 180.0)
}

fn parse_coordinate(field: &str, raw: Option<&str>, bound: f64) -> Result<f64, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::ValidationError(format!("{field} is required")))?;

    let value: f64 = raw
        .parse()
        .map_err(|_| AppError::ValidationError(format!("{field} must be a number, got {raw:?}")))?;

    if !(-bound..=bound).contains(&value) {
        warn!("rejecting out of range {field}: {value}");
        return Err(AppError::ValidationError(format!(
            "{field} must be between {} and {bound}, got {value}",
            -bound
        )));
    }

    Ok(value)
}

/// Radius in kilometers, defaulting to `DEFAULT_RADIUS_KM`.
pub fn parse_radius(raw: Option<&str>) -> Result<f64, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_RADIUS_KM);
    };

    let radius: f64 = raw
        .parse()
        .map_err(|_| AppError::ValidationError(format!("radius must be a number, got {raw:?}")))?;

    if !radius.is_finite() || radius <= 0.0 {
        return Err(AppError::ValidationError(format!(
            "radius must be a positive number of kilometers, got {radius}"
        )));
    }

    Ok(radius)
}

pub fn parse_bounding_box(
    ne_lat: Option<&str>,
    ne_lng: Option<&str>,
    sw_lat: Option<&str>,
    sw_lng: Option<&str>,
) -> Result<BoundingBox, AppError> {
    let missing: Vec<&str> = [
        ("neLat", ne_lat),
        ("neLng", ne_lng),
        ("swLat", sw_lat),
        ("swLng", sw_lng),
    ]
    .into_iter()
    .filter(|(_, v)| v.is_none_or(|s| s.trim().is_empty()))
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(AppError::ValidationError(format!(
            "Bounding box requires neLat, neLng, swLat and swLng; missing {}",
            missing.join(", ")
        )));
    }

    let north_east = LatLng {
        lat: parse_latitude("neLat", ne_lat)?,
        lng: parse_longitude("neLng", ne_lng)?,
    };
    let south_west = LatLng {
        lat: parse_latitude("swLat", sw_lat)?,
        lng: parse_longitude("swLng", sw_lng)?,
    };

    if north_east.lat <= south_west.lat {
        return Err(AppError::ValidationError(format!(
            "neLat ({}) must be greater than swLat ({})",
            north_east.lat, south_west.lat
        )));
    }

    Ok(BoundingBox {
        north_east,
        south_west,
    })
}

/// Great-circle distance in kilometers (haversine).
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

pub fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}
