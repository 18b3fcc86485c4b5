use std::{fmt, str::FromStr};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Type, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "listing_type", rename_all = "lowercase")]
pub enum ListingType {
    #[default]
    Sale,
    Rent,
}

#[derive(Type, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "currency_code", rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Cdf,
    Eur,
}

#[derive(Type, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "property_status", rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Active,
    Pending,
    Sold,
    Rented,
    Inactive,
}

impl FromStr for ListingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "rent" => Ok(Self::Rent),
            other => Err(format!(
                "listingType must be one of sale, rent (got {other:?})"
            )),
        }
    }
}

impl FromStr for PropertyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "sold" => Ok(Self::Sold),
            "rented" => Ok(Self::Rented),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!(
                "status must be one of active, pending, sold, rented, inactive (got {other:?})"
            )),
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Sold => "sold",
            Self::Rented => "rented",
            Self::Inactive => "inactive",
        };
        f.write_str(s)
    }
}

/// Amenity vocabulary accepted on create/update.
pub const AMENITIES: &[&str] = &[
    "pool",
    "gym",
    "parking",
    "garden",
    "security",
    "elevator",
    "air_conditioning",
    "furnished",
    "balcony",
    "internet",
    "generator",
    "water_tank",
];

/// GeoJSON point. Coordinates are `[longitude, latitude]`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn from_lat_lng(latitude: f64, longitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
        }
    }
}

#[derive(FromRow, Clone, PartialEq, Debug)]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: BigDecimal,
    pub currency: Currency,
    pub listing_type: ListingType,
    pub property_type: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: f64,
    pub year_built: Option<i32>,

    pub address: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    // generated column, ARRAY[longitude, latitude]
    pub location: Vec<f64>,

    pub features: Vec<String>,
    pub amenities: Vec<String>,
    pub status: PropertyStatus,
    pub owner_id: Uuid,
    pub views: i64,
    pub favorites: Vec<Uuid>,
    pub is_premium: bool,
    pub premium_expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A property joined with the public owner columns, plus the distance to the
/// reference point when the query computed one.
#[derive(FromRow, Clone, Debug)]
pub struct PropertyJoined {
    #[sqlx(flatten)]
    pub property: Property,

    // owner
    pub owner_full_name: String,
    pub owner_email: String,
    pub owner_phone_number: Option<String>,
    pub owner_picture: Option<String>,

    pub distance_km: Option<f64>,
}
