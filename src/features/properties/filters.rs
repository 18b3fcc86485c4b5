//! Typed filter record built from the raw query string.
//!
//! Every predicate is optional and the present ones are AND-combined by the
//! repository. Empty values never reach this record.

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::{
    features::properties::{
        models::{ListingType, PropertyStatus},
        schemas::PropertyQuery,
    },
    utilities::errors::AppError,
};

/// Status applied when the request does not name one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StatusDefault {
    /// Plain list: every status is visible.
    Unconstrained,
    /// Geo endpoints: only active listings.
    Active,
}

#[derive(Clone, Default, PartialEq, Debug)]
pub struct PropertyFilter {
    pub listing_type: Option<ListingType>,
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub min_price: Option<BigDecimal>,
    pub max_price: Option<BigDecimal>,
    pub min_bedrooms: Option<i32>,
    pub min_bathrooms: Option<i32>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub min_year_built: Option<i32>,
    pub max_year_built: Option<i32>,
    /// Every listed feature must be present.
    pub features: Vec<String>,
    /// Every listed amenity must be present.
    pub amenities: Vec<String>,
    pub status: Option<PropertyStatus>,
    pub is_premium: Option<bool>,
    pub owner: Option<Uuid>,
    /// Substring of title, description, address or city.
    pub search: Option<String>,
}

impl PropertyFilter {
    pub fn from_query(
        query: &PropertyQuery,
        status_default: StatusDefault,
    ) -> Result<Self, AppError> {
        let status = query.status.or(match status_default {
            StatusDefault::Unconstrained => None,
            StatusDefault::Active => Some(PropertyStatus::Active),
        });

        Ok(Self {
            listing_type: query.listing_type,
            property_type: text(query.property_type.as_deref())
                .filter(|t| !t.eq_ignore_ascii_case("any")),
            city: text(query.city.as_deref()),
            address: text(query.location.as_deref())
                .or_else(|| text(query.address.as_deref())),
            min_price: query.min_price.clone(),
            max_price: query.max_price.clone(),
            min_bedrooms: parse_minimum("bedrooms", query.bedrooms.as_deref())?,
            min_bathrooms: parse_minimum("bathrooms", query.bathrooms.as_deref())?,
            min_area: query.min_area,
            max_area: query.max_area,
            min_year_built: query.min_year_built,
            max_year_built: query.max_year_built,
            features: split_list(&query.features),
            amenities: split_list(&query.amenities),
            status,
            is_premium: query.is_premium.as_deref().map(|v| v == "true"),
            owner: query.owner,
            search: text(query.search.as_deref()),
        })
    }
}

fn text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parses a "at least N" count: `"N"` and `"N+"` both mean `>= N`, `"any"`
/// means no constraint.
fn parse_minimum(field: &str, raw: Option<&str>) -> Result<Option<i32>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if raw.eq_ignore_ascii_case("any") {
        return Ok(None);
    }

    let digits = raw.strip_suffix('+').unwrap_or(raw);
    let value: u16 = digits.parse().map_err(|_| {
        AppError::ValidationError(format!(
            "{field} must be a non-negative whole number, \"N+\" or \"any\", got {raw:?}"
        ))
    })?;

    Ok(Some(i32::from(value)))
}

/// Accepts repeated keys, comma separated values, or both.
fn split_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
