use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::{Query, WithRejection};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    features::{
        properties::{
            geo::GeoMode,
            repository::PropertyStore,
            schemas::{
                BoundsOut, BoundsResponse, NearbyResponse, PropertyIn, PropertyListResponse,
                PropertyOut, PropertyPatch, PropertyQuery,
            },
            search::SearchPlan,
        },
        schemas::{PaginationOut, Total},
    },
    utilities::{errors::AppError, jwt::Claims},
};

type PropertyQueryParams = WithRejection<Query<PropertyQuery>, AppError>;

fn not_found(id: Uuid) -> AppError {
    AppError::NotFoundError(format!("Property {id} not found"))
}

pub async fn get_many_properties_handler(
    State(store): State<Arc<dyn PropertyStore>>,
    WithRejection(Query(query), _): PropertyQueryParams,
) -> Result<impl IntoResponse, AppError> {
    let plan = SearchPlan::for_list(&query)?;
    debug!("list plan: {:?}", plan);

    let (rows, total) = store.search(&plan).await?;

    let reference_point = match plan.geo {
        GeoMode::DistanceSort { center } => Some(center),
        _ => None,
    };

    Ok(Json(PropertyListResponse {
        properties: rows.into_iter().map(PropertyOut::from).collect(),
        pagination: PaginationOut::new(&plan.pagination, Total::Items(total)),
        sorted_by_distance: reference_point.map(|_| true),
        reference_point,
    }))
}

pub async fn get_nearby_properties_handler(
    State(store): State<Arc<dyn PropertyStore>>,
    WithRejection(Query(query), _): PropertyQueryParams,
) -> Result<impl IntoResponse, AppError> {
    let plan = SearchPlan::for_nearby(&query)?;
    debug!("nearby plan: {:?}", plan);

    let GeoMode::Radius { center, radius_km } = plan.geo else {
        return Err(AppError::InternalError(
            "nearby search planned without a radius".to_string(),
        ));
    };

    let (rows, total) = store.search(&plan).await?;

    Ok(Json(NearbyResponse {
        properties: rows.into_iter().map(PropertyOut::from).collect(),
        pagination: PaginationOut::new(&plan.pagination, Total::Properties(total)),
        search_center: center,
        radius_km,
    }))
}

pub async fn get_properties_in_bounds_handler(
    State(store): State<Arc<dyn PropertyStore>>,
    WithRejection(Query(query), _): PropertyQueryParams,
) -> Result<impl IntoResponse, AppError> {
    let plan = SearchPlan::for_bounds(&query)?;
    debug!("bounds plan: {:?}", plan);

    let GeoMode::Bounds(bbox) = plan.geo else {
        return Err(AppError::InternalError(
            "bounds search planned without a bounding box".to_string(),
        ));
    };

    let (rows, total) = store.search(&plan).await?;

    Ok(Json(BoundsResponse {
        properties: rows.into_iter().map(PropertyOut::from).collect(),
        pagination: PaginationOut::new(&plan.pagination, Total::Properties(total)),
        bounds: BoundsOut {
            north_east: bbox.north_east,
            south_west: bbox.south_west,
        },
    }))
}

pub async fn get_one_property_handler(
    State(store): State<Arc<dyn PropertyStore>>,
    WithRejection(Path(property_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let row = store
        .find_and_increment_views(property_id)
        .await?
        .ok_or_else(|| not_found(property_id))?;

    Ok(Json(PropertyOut::from(row)))
}

pub async fn create_property_handler(
    claims: Claims,
    State(store): State<Arc<dyn PropertyStore>>,
    WithRejection(Json(property_in), _): WithRejection<Json<PropertyIn>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    if !claims.can_list() {
        return Err(AppError::Forbidden(
            "Only agents and admins can create properties".to_string(),
        ));
    }

    property_in.check()?;

    let row = store.create(claims.sub, &property_in).await?;
    info!("property {} created by {}", row.property.id, claims.sub);

    Ok((StatusCode::CREATED, Json(PropertyOut::from(row))))
}

pub async fn update_property_handler(
    claims: Claims,
    State(store): State<Arc<dyn PropertyStore>>,
    WithRejection(Path(property_id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(patch), _): WithRejection<Json<PropertyPatch>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let existing = store
        .find(property_id)
        .await?
        .ok_or_else(|| not_found(property_id))?;

    if existing.property.owner_id != claims.sub && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only the owner or an admin can update this property".to_string(),
        ));
    }

    patch.check()?;

    if let Some(status) = patch.status {
        info!(
            "property {property_id} status {} -> {status}",
            existing.property.status
        );
    }

    let row = store
        .update(property_id, &patch)
        .await?
        .ok_or_else(|| not_found(property_id))?;

    Ok(Json(PropertyOut::from(row)))
}

pub async fn delete_property_handler(
    claims: Claims,
    State(store): State<Arc<dyn PropertyStore>>,
    WithRejection(Path(property_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can delete properties".to_string(),
        ));
    }

    if !store.delete(property_id).await? {
        return Err(not_found(property_id));
    }
    info!("property {property_id} deleted by {}", claims.sub);

    Ok(StatusCode::NO_CONTENT)
}
