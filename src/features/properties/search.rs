use tracing::warn;

use crate::{
    features::{
        properties::{
            filters::{PropertyFilter, StatusDefault},
            geo::{self, GeoMode, LatLng},
            schemas::PropertyQuery,
        },
        schemas::{BOUNDS_LIMITS, LIST_LIMITS, NEARBY_LIMITS, PageLimits, Pagination},
    },
    utilities::errors::AppError,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Price,
    Area,
    Bedrooms,
    Bathrooms,
    YearBuilt,
    Views,
    Title,
    Distance,
}

impl SortField {
    fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "createdAt" => Self::CreatedAt,
            "updatedAt" => Self::UpdatedAt,
            "price" => Self::Price,
            "area" => Self::Area,
            "bedrooms" => Self::Bedrooms,
            "bathrooms" => Self::Bathrooms,
            "yearBuilt" => Self::YearBuilt,
            "views" => Self::Views,
            "title" => Self::Title,
            "distance" => Self::Distance,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    /// Resolves `sortBy`/`sortOrder` against the endpoint default. Unknown
    /// fields fall back to the default, and `distance` is only honoured when
    /// the query computes one. Distance sorts ascending unless told otherwise,
    /// everything else descending.
    pub fn resolve(
        sort_by: Option<&str>,
        sort_order: Option<&str>,
        default_field: SortField,
        has_distance: bool,
    ) -> Self {
        let requested = sort_by.and_then(|raw| {
            let field = SortField::parse(raw);
            if field.is_none() {
                warn!("ignoring unknown sortBy: {raw:?}");
            }
            field
        });

        let field = match requested.unwrap_or(default_field) {
            SortField::Distance if !has_distance => SortField::CreatedAt,
            field => field,
        };

        let order = match sort_order {
            Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            _ if field == SortField::Distance => SortOrder::Asc,
            _ => SortOrder::Desc,
        };

        Self { field, order }
    }
}

/// Typed, validated description of one search request. Both the count and the
/// page query are derived from the same plan.
#[derive(Clone, PartialEq, Debug)]
pub struct SearchPlan {
    pub filter: PropertyFilter,
    pub geo: GeoMode,
    pub sort: Sort,
    pub pagination: Pagination,
}

impl SearchPlan {
    /// `GET /properties`. `sortByDistance=true` with `lat`/`lng` switches to an
    /// unbounded distance search.
    pub fn for_list(query: &PropertyQuery) -> Result<Self, AppError> {
        let wants_distance = query.sort_by_distance.as_deref() == Some("true")
            && query.lat.is_some()
            && query.lng.is_some();

        let geo = if wants_distance {
            GeoMode::DistanceSort {
                center: LatLng {
                    lat: geo::parse_latitude("lat", query.lat.as_deref())?,
                    lng: geo::parse_longitude("lng", query.lng.as_deref())?,
                },
            }
        } else {
            GeoMode::None
        };

        let default_field = if wants_distance {
            SortField::Distance
        } else {
            SortField::CreatedAt
        };

        Self::assemble(
            query,
            geo,
            StatusDefault::Unconstrained,
            default_field,
            LIST_LIMITS,
        )
    }

    /// `GET /properties/nearby`.
    pub fn for_nearby(query: &PropertyQuery) -> Result<Self, AppError> {
        let center = LatLng {
            lat: geo::parse_latitude("lat", query.lat.as_deref())?,
            lng: geo::parse_longitude("lng", query.lng.as_deref())?,
        };
        let radius_km = geo::parse_radius(query.radius.as_deref())?;

        Self::assemble(
            query,
            GeoMode::Radius { center, radius_km },
            StatusDefault::Active,
            SortField::Distance,
            NEARBY_LIMITS,
        )
    }

    /// `GET /properties/bounds`.
    pub fn for_bounds(query: &PropertyQuery) -> Result<Self, AppError> {
        let bbox = geo::parse_bounding_box(
            query.ne_lat.as_deref(),
            query.ne_lng.as_deref(),
            query.sw_lat.as_deref(),
            query.sw_lng.as_deref(),
        )?;

        Self::assemble(
            query,
            GeoMode::Bounds(bbox),
            StatusDefault::Active,
            SortField::CreatedAt,
            BOUNDS_LIMITS,
        )
    }

    fn assemble(
        query: &PropertyQuery,
        geo: GeoMode,
        status_default: StatusDefault,
        default_field: SortField,
        limits: PageLimits,
    ) -> Result<Self, AppError> {
        let filter = PropertyFilter::from_query(query, status_default)?;
        let sort = Sort::resolve(
            query.sort_by.as_deref(),
            query.sort_order.as_deref(),
            default_field,
            geo.reference_point().is_some(),
        );

        Ok(Self {
            filter,
            geo,
            sort,
            pagination: Pagination::parse(
                query.page.as_deref(),
                query.limit.as_deref(),
                limits,
            ),
        })
    }
}
