use async_trait::async_trait;
use sqlx::{Encode, Postgres, QueryBuilder, Type};
use tracing::debug;
use uuid::Uuid;

use crate::{
    features::properties::{
        geo::{EARTH_RADIUS_KM, GeoMode, LatLng},
        models::{PropertyJoined, PropertyStatus},
        schemas::{PropertyIn, PropertyPatch},
        search::{SearchPlan, SortField, SortOrder},
    },
    services::database::Database,
    utilities::errors::AppError,
};

/// Storage seam for properties. Handlers only ever talk to this trait.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// One page of matches plus the total number of matches.
    async fn search(&self, plan: &SearchPlan) -> Result<(Vec<PropertyJoined>, i64), AppError>;
    async fn find(&self, id: Uuid) -> Result<Option<PropertyJoined>, AppError>;
    async fn find_and_increment_views(
        &self,
        id: Uuid,
    ) -> Result<Option<PropertyJoined>, AppError>;
    async fn create(
        &self,
        owner_id: Uuid,
        property_in: &PropertyIn,
    ) -> Result<PropertyJoined, AppError>;
    async fn update(
        &self,
        id: Uuid,
        patch: &PropertyPatch,
    ) -> Result<Option<PropertyJoined>, AppError>;
    /// Returns false when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

// Owner columns are listed one by one so the password hash never leaves the
// database.
const PROPERTY_COLUMNS: &str = r#"
        p.id,
        p.title,
        p.description,
        p.price,
        p.currency,
        p.listing_type,
        p.property_type,
        p.bedrooms,
        p.bathrooms,
        p.area,
        p.year_built,
        p.address,
        p.city,
        p.province,
        p.country,
        p.latitude,
        p.longitude,
        p.location,
        p.features,
        p.amenities,
        p.status,
        p.owner_id,
        p.views,
        p.favorites,
        p.is_premium,
        p.premium_expires_at,
        p.created_at,
        p.updated_at,

        -- owner fields ...
        u.full_name AS owner_full_name,
        u.email AS owner_email,
        u.phone_number AS owner_phone_number,
        u.picture AS owner_picture"#;

/// Appends the FROM and WHERE clauses of a search. The count and the page
/// query both go through here, so they always agree on what matches.
pub fn push_from_where(qb: &mut QueryBuilder<'_, Postgres>, plan: &SearchPlan) {
    qb.push(" FROM (SELECT p.*, ");
    match plan.geo.reference_point() {
        Some(center) => push_haversine(qb, center),
        None => {
            qb.push("NULL::float8");
        }
    }
    qb.push(" AS distance_km FROM properties p) p JOIN users u ON u.id = p.owner_id WHERE 1=1");

    match plan.geo {
        GeoMode::Radius { radius_km, .. } => {
            qb.push(" AND p.distance_km <= ").push_bind(radius_km);
        }
        GeoMode::Bounds(bbox) => {
            qb.push(" AND p.location[2] BETWEEN ")
                .push_bind(bbox.south_west.lat)
                .push(" AND ")
                .push_bind(bbox.north_east.lat);
            qb.push(" AND p.location[1] BETWEEN ")
                .push_bind(bbox.south_west.lng)
                .push(" AND ")
                .push_bind(bbox.north_east.lng);
        }
        GeoMode::None | GeoMode::DistanceSort { .. } => {}
    }

    let filter = &plan.filter;

    if let Some(listing_type) = filter.listing_type {
        qb.push(" AND p.listing_type = ").push_bind(listing_type);
    }

    if let Some(property_type) = &filter.property_type {
        qb.push(" AND p.property_type = ").push_bind(property_type.clone());
    }

    if let Some(city) = &filter.city {
        qb.push(" AND p.city ILIKE ").push_bind(contains(city));
    }

    if let Some(address) = &filter.address {
        qb.push(" AND p.address ILIKE ").push_bind(contains(address));
    }

    if let Some(min_price) = &filter.min_price {
        qb.push(" AND p.price >= ").push_bind(min_price.clone());
    }

    if let Some(max_price) = &filter.max_price {
        qb.push(" AND p.price <= ").push_bind(max_price.clone());
    }

    if let Some(min_bedrooms) = filter.min_bedrooms {
        qb.push(" AND p.bedrooms >= ").push_bind(min_bedrooms);
    }

    if let Some(min_bathrooms) = filter.min_bathrooms {
        qb.push(" AND p.bathrooms >= ").push_bind(min_bathrooms);
    }

    if let Some(min_area) = filter.min_area {
        qb.push(" AND p.area >= ").push_bind(min_area);
    }

    if let Some(max_area) = filter.max_area {
        qb.push(" AND p.area <= ").push_bind(max_area);
    }

    if let Some(min_year_built) = filter.min_year_built {
        qb.push(" AND p.year_built >= ").push_bind(min_year_built);
    }

    if let Some(max_year_built) = filter.max_year_built {
        qb.push(" AND p.year_built <= ").push_bind(max_year_built);
    }

    if !filter.features.is_empty() {
        qb.push(" AND p.features @> ")
            .push_bind(filter.features.clone())
            .push("::text[]");
    }

    if !filter.amenities.is_empty() {
        qb.push(" AND p.amenities @> ")
            .push_bind(filter.amenities.clone())
            .push("::text[]");
    }

    if let Some(status) = filter.status {
        qb.push(" AND p.status = ").push_bind(status);
    }

    if let Some(is_premium) = filter.is_premium {
        qb.push(" AND p.is_premium = ").push_bind(is_premium);
    }

    if let Some(owner) = filter.owner {
        qb.push(" AND p.owner_id = ").push_bind(owner);
    }

    if let Some(search) = &filter.search {
        let pattern = contains(search);
        qb.push(" AND (p.title ILIKE ").push_bind(pattern.clone());
        qb.push(" OR p.description ILIKE ").push_bind(pattern.clone());
        qb.push(" OR p.address ILIKE ").push_bind(pattern.clone());
        qb.push(" OR p.city ILIKE ").push_bind(pattern);
        qb.push(")");
    }
}

// Great-circle distance from `center` to the stored [lng, lat] point.
fn push_haversine(qb: &mut QueryBuilder<'_, Postgres>, center: LatLng) {
    qb.push(format!("2 * {EARTH_RADIUS_KM} * ASIN(LEAST(1.0, SQRT("));
    qb.push("POWER(SIN(RADIANS(p.location[2] - ")
        .push_bind(center.lat)
        .push(") / 2), 2)");
    qb.push(" + COS(RADIANS(")
        .push_bind(center.lat)
        .push(")) * COS(RADIANS(p.location[2]))");
    qb.push(" * POWER(SIN(RADIANS(p.location[1] - ")
        .push_bind(center.lng)
        .push(") / 2), 2)");
    qb.push(")))");
}

pub fn build_count_query(plan: &SearchPlan) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*)");
    push_from_where(&mut qb, plan);
    qb
}

pub fn build_page_query(plan: &SearchPlan) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {PROPERTY_COLUMNS}, p.distance_km"));
    push_from_where(&mut qb, plan);

    // missing values (year_built) rank lowest in either direction
    let direction = match plan.sort.order {
        SortOrder::Asc => "ASC NULLS FIRST",
        SortOrder::Desc => "DESC NULLS LAST",
    };
    // id breaks ties so pages never overlap
    qb.push(format!(
        " ORDER BY {} {direction}, p.id ASC",
        sort_column(plan.sort.field)
    ));

    qb.push(" LIMIT ").push_bind(plan.pagination.limit);
    qb.push(" OFFSET ").push_bind(plan.pagination.offset());
    qb
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::CreatedAt => "p.created_at",
        SortField::UpdatedAt => "p.updated_at",
        SortField::Price => "p.price",
        SortField::Area => "p.area",
        SortField::Bedrooms => "p.bedrooms",
        SortField::Bathrooms => "p.bathrooms",
        SortField::YearBuilt => "p.year_built",
        SortField::Views => "p.views",
        SortField::Title => "p.title",
        SortField::Distance => "p.distance_km",
    }
}

/// Escapes LIKE metacharacters so user input only ever matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains(raw: &str) -> String {
    format!("%{}%", escape_like(raw))
}

// Wraps a data-modifying CTE named `p` and joins its single row with the owner.
fn returning_joined(cte: &str) -> String {
    format!(
        "WITH p AS ({cte}) SELECT {PROPERTY_COLUMNS}, NULL::float8 AS distance_km \
         FROM p JOIN users u ON u.id = p.owner_id"
    )
}

fn push_set<'a, T>(qb: &mut QueryBuilder<'a, Postgres>, column: &str, value: Option<T>)
where
    T: 'a + Encode<'a, Postgres> + Type<Postgres>,
{
    if let Some(value) = value {
        qb.push(format!(", {column} = ")).push_bind(value);
    }
}

#[async_trait]
impl PropertyStore for Database {
    async fn search(&self, plan: &SearchPlan) -> Result<(Vec<PropertyJoined>, i64), AppError> {
        let mut count_qb = build_count_query(plan);
        let mut page_qb = build_page_query(plan);
        debug!("search query: {}", page_qb.sql());

        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let rows = page_qb
            .build_query_as::<PropertyJoined>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<PropertyJoined>, AppError> {
        let sql = format!(
            "SELECT {PROPERTY_COLUMNS}, NULL::float8 AS distance_km \
             FROM properties p JOIN users u ON u.id = p.owner_id WHERE p.id = $1"
        );
        let row = sqlx::query_as::<_, PropertyJoined>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_and_increment_views(
        &self,
        id: Uuid,
    ) -> Result<Option<PropertyJoined>, AppError> {
        let sql =
            returning_joined("UPDATE properties SET views = views + 1 WHERE id = $1 RETURNING *");
        let row = sqlx::query_as::<_, PropertyJoined>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn create(
        &self,
        owner_id: Uuid,
        property_in: &PropertyIn,
    ) -> Result<PropertyJoined, AppError> {
        let sql = returning_joined(
            r#"
            INSERT INTO properties (
                id,
                title,
                description,
                price,
                currency,
                listing_type,
                property_type,
                bedrooms,
                bathrooms,
                area,
                year_built,
                address,
                city,
                province,
                country,
                latitude,
                longitude,
                features,
                amenities,
                status,
                owner_id,
                is_premium,
                premium_expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            RETURNING *
            "#,
        );

        let row = sqlx::query_as::<_, PropertyJoined>(&sql)
            .bind(Uuid::new_v4())
            .bind(&property_in.title)
            .bind(&property_in.description)
            .bind(&property_in.price)
            .bind(property_in.currency)
            .bind(property_in.listing_type)
            .bind(&property_in.property_type)
            .bind(property_in.bedrooms)
            .bind(property_in.bathrooms)
            .bind(property_in.area)
            .bind(property_in.year_built)
            .bind(&property_in.address)
            .bind(&property_in.city)
            .bind(&property_in.province)
            .bind(&property_in.country)
            .bind(property_in.latitude)
            .bind(property_in.longitude)
            .bind(&property_in.features)
            .bind(&property_in.amenities)
            .bind(PropertyStatus::Active)
            .bind(owner_id)
            .bind(property_in.is_premium)
            .bind(property_in.premium_expires_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &PropertyPatch,
    ) -> Result<Option<PropertyJoined>, AppError> {
        let mut qb =
            QueryBuilder::<Postgres>::new("WITH p AS (UPDATE properties SET updated_at = NOW()");

        push_set(&mut qb, "title", patch.title.clone());
        push_set(&mut qb, "description", patch.description.clone());
        push_set(&mut qb, "price", patch.price.clone());
        push_set(&mut qb, "currency", patch.currency);
        push_set(&mut qb, "listing_type", patch.listing_type);
        push_set(&mut qb, "property_type", patch.property_type.clone());
        push_set(&mut qb, "bedrooms", patch.bedrooms);
        push_set(&mut qb, "bathrooms", patch.bathrooms);
        push_set(&mut qb, "area", patch.area);
        push_set(&mut qb, "year_built", patch.year_built);
        push_set(&mut qb, "address", patch.address.clone());
        push_set(&mut qb, "city", patch.city.clone());
        push_set(&mut qb, "province", patch.province.clone());
        push_set(&mut qb, "country", patch.country.clone());
        push_set(&mut qb, "latitude", patch.latitude);
        push_set(&mut qb, "longitude", patch.longitude);
        push_set(&mut qb, "features", patch.features.clone());
        push_set(&mut qb, "amenities", patch.amenities.clone());
        push_set(&mut qb, "status", patch.status);
        push_set(&mut qb, "is_premium", patch.is_premium);
        push_set(&mut qb, "premium_expires_at", patch.premium_expires_at);

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *)");
        qb.push(format!(
            " SELECT {PROPERTY_COLUMNS}, NULL::float8 AS distance_km \
             FROM p JOIN users u ON u.id = p.owner_id"
        ));
        debug!("update query: {}", qb.sql());

        let row = qb
            .build_query_as::<PropertyJoined>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
