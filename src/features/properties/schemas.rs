use crate::features::{
    properties::{
        geo::LatLng,
        models::{Currency, GeoPoint, ListingType, PropertyStatus},
    },
    schemas::PaginationOut,
    users::schemas::OwnerOut,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};
use uuid::Uuid;
use validator::Validate;

// -- =====================
// -- IN
// -- =====================

/// Raw query string shared by the list, nearby and bounds endpoints. Every
/// value is optional, and an empty value is the same as a missing one.
#[serde_as]
#[derive(Deserialize, Default, Debug)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertyQuery {
    // Filters
    #[serde_as(as = "NoneAsEmptyString")]
    pub listing_type: Option<ListingType>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub property_type: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub city: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub location: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub address: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub min_price: Option<BigDecimal>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub max_price: Option<BigDecimal>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub bedrooms: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub bathrooms: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub min_area: Option<f64>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub max_area: Option<f64>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub min_year_built: Option<i32>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub max_year_built: Option<i32>,
    #[serde(alias = "features[]")]
    pub features: Vec<String>,
    #[serde(alias = "amenities[]")]
    pub amenities: Vec<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub status: Option<PropertyStatus>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub is_premium: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub owner: Option<Uuid>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub search: Option<String>,

    // Pagination and sort
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub sort_by: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub sort_order: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub sort_by_distance: Option<String>,

    // Geo, parsed by `geo` so errors can name the field
    #[serde_as(as = "NoneAsEmptyString")]
    pub lat: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub lng: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub radius: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub ne_lat: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub ne_lng: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub sw_lat: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub sw_lng: Option<String>,
}

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PropertyIn {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    pub price: BigDecimal,
    #[serde(default)]
    pub currency: Currency,
    pub listing_type: ListingType,
    #[validate(length(min = 1, message = "Property type is required"))]
    pub property_type: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub bedrooms: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub bathrooms: i32,
    #[validate(range(exclusive_min = 0.0, message = "Area must be positive"))]
    pub area: f64,
    #[validate(range(min = 1800, max = 2100))]
    pub year_built: Option<i32>,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub country: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub is_premium: bool,
    pub premium_expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Validate, Default, Debug)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertyPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub currency: Option<Currency>,
    pub listing_type: Option<ListingType>,
    #[validate(length(min = 1))]
    pub property_type: Option<String>,
    #[validate(range(min = 0))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0))]
    pub bathrooms: Option<i32>,
    #[validate(range(exclusive_min = 0.0, message = "Area must be positive"))]
    pub area: Option<f64>,
    #[validate(range(min = 1800, max = 2100))]
    pub year_built: Option<i32>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    #[validate(length(min = 1))]
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub features: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub status: Option<PropertyStatus>,
    pub is_premium: Option<bool>,
    pub premium_expires_at: Option<DateTime<Utc>>,
}

// -- =====================
// -- OUT
// -- =====================
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOut {
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
    pub location: GeoPoint,
    pub features: Vec<String>,
    pub amenities: Vec<String>,
    pub status: PropertyStatus,
    pub owner: OwnerOut,
    pub views: i64,
    pub favorites: Vec<Uuid>,
    pub is_premium: bool,
    pub premium_expires_at: Option<DateTime<Utc>>,
    pub is_premium_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListResponse {
    pub properties: Vec<PropertyOut>,
    pub pagination: PaginationOut,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorted_by_distance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_point: Option<LatLng>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NearbyResponse {
    pub properties: Vec<PropertyOut>,
    pub pagination: PaginationOut,
    pub search_center: LatLng,
    pub radius_km: f64,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BoundsOut {
    pub north_east: LatLng,
    pub south_west: LatLng,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BoundsResponse {
    pub properties: Vec<PropertyOut>,
    pub pagination: PaginationOut,
    pub bounds: BoundsOut,
}
