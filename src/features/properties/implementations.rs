use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    features::{
        properties::{
            geo::round_km,
            models::{AMENITIES, GeoPoint, PropertyJoined},
            schemas::{PropertyIn, PropertyOut, PropertyPatch},
        },
        users::schemas::OwnerOut,
    },
    utilities::errors::AppError,
};

/// Flag set and expiry, if any, still ahead of `now`.
pub fn is_premium_active(
    is_premium: bool,
    premium_expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    is_premium && premium_expires_at.is_none_or(|expires_at| expires_at > now)
}

impl From<PropertyJoined> for PropertyOut {
    fn from(row: PropertyJoined) -> Self {
        let p = row.property;

        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            price: p.price,
            currency: p.currency,
            listing_type: p.listing_type,
            property_type: p.property_type,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            area: p.area,
            year_built: p.year_built,
            address: p.address,
            city: p.city,
            province: p.province,
            country: p.country,
            latitude: p.latitude,
            longitude: p.longitude,
            location: GeoPoint::from_lat_lng(p.latitude, p.longitude),
            features: p.features,
            amenities: p.amenities,
            status: p.status,
            owner: OwnerOut {
                id: p.owner_id,
                full_name: row.owner_full_name,
                email: row.owner_email,
                phone_number: row.owner_phone_number,
                picture: row.owner_picture,
            },
            views: p.views,
            favorites: p.favorites,
            is_premium: p.is_premium,
            premium_expires_at: p.premium_expires_at,
            is_premium_active: is_premium_active(p.is_premium, p.premium_expires_at, Utc::now()),
            distance_km: row.distance_km.map(round_km),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

fn check_price(price: Option<&BigDecimal>) -> Result<(), AppError> {
    if price.is_some_and(|p| p < &BigDecimal::from(0)) {
        return Err(AppError::ValidationError(
            "price must be zero or greater".to_string(),
        ));
    }
    Ok(())
}

fn check_amenities(amenities: &[String]) -> Result<(), AppError> {
    let unknown: Vec<&str> = amenities
        .iter()
        .map(String::as_str)
        .filter(|a| !AMENITIES.contains(a))
        .collect();

    if !unknown.is_empty() {
        return Err(AppError::ValidationError(format!(
            "unknown amenities: {}; allowed: {}",
            unknown.join(", "),
            AMENITIES.join(", ")
        )));
    }
    Ok(())
}

impl PropertyIn {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        check_price(Some(&self.price))?;
        check_amenities(&self.amenities)
    }
}

impl PropertyPatch {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        check_price(self.price.as_ref())?;
        check_amenities(self.amenities.as_deref().unwrap_or_default())
    }
}
