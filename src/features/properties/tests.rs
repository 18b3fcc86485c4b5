use std::{
    cmp::Ordering,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering as AtomicOrdering},
    },
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    features::{
        self,
        properties::{
            filters::PropertyFilter,
            geo::{GeoMode, LatLng, haversine_km},
            models::{Currency, ListingType, Property, PropertyJoined, PropertyStatus},
            repository::PropertyStore,
            schemas::{PropertyIn, PropertyPatch},
            search::{SearchPlan, SortField, SortOrder},
        },
        users::models::UserRole,
    },
    utilities::{
        app_state::AppState,
        errors::AppError,
        jwt::{
            TokenType,
            tests::{config, sign},
        },
    },
};

const SECRET: &str = "property-search-test-secret";
const AGENT_ID: Uuid = Uuid::from_u128(0xa6e47);
const KINSHASA: LatLng = LatLng {
    lat: -4.3217,
    lng: 15.3125,
};
const BRAZZAVILLE: LatLng = LatLng {
    lat: -4.2634,
    lng: 15.2429,
};
const LUBUMBASHI: LatLng = LatLng {
    lat: -11.6609,
    lng: 27.4794,
};

// -- =====================
// -- In-memory store
// -- =====================

/// Evaluates a `SearchPlan` the way the SQL does and counts every call.
#[derive(Default)]
struct MemoryStore {
    rows: Mutex<Vec<PropertyJoined>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    fn with(rows: Vec<PropertyJoined>) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

fn point(p: &Property) -> LatLng {
    LatLng {
        lat: p.latitude,
        lng: p.longitude,
    }
}

fn matches(filter: &PropertyFilter, p: &Property) -> bool {
    let has = |haystack: &str, needle: &str| {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    };

    filter.listing_type.is_none_or(|v| p.listing_type == v)
        && filter.property_type.as_ref().is_none_or(|v| &p.property_type == v)
        && filter.city.as_ref().is_none_or(|v| has(&p.city, v))
        && filter.address.as_ref().is_none_or(|v| has(&p.address, v))
        && filter.min_price.as_ref().is_none_or(|v| &p.price >= v)
        && filter.max_price.as_ref().is_none_or(|v| &p.price <= v)
        && filter.min_bedrooms.is_none_or(|v| p.bedrooms >= v)
        && filter.min_bathrooms.is_none_or(|v| p.bathrooms >= v)
        && filter.min_area.is_none_or(|v| p.area >= v)
        && filter.max_area.is_none_or(|v| p.area <= v)
        && filter
            .min_year_built
            .is_none_or(|v| p.year_built.is_some_and(|y| y >= v))
        && filter
            .max_year_built
            .is_none_or(|v| p.year_built.is_some_and(|y| y <= v))
        && filter.features.iter().all(|f| p.features.contains(f))
        && filter.amenities.iter().all(|a| p.amenities.contains(a))
        && filter.status.is_none_or(|v| p.status == v)
        && filter.is_premium.is_none_or(|v| p.is_premium == v)
        && filter.owner.is_none_or(|v| p.owner_id == v)
        && filter.search.as_ref().is_none_or(|v| {
            has(&p.title, v) || has(&p.description, v) || has(&p.address, v) || has(&p.city, v)
        })
}

fn compare(field: SortField, a: &PropertyJoined, b: &PropertyJoined) -> Ordering {
    let (pa, pb) = (&a.property, &b.property);
    match field {
        SortField::CreatedAt => pa.created_at.cmp(&pb.created_at),
        SortField::UpdatedAt => pa.updated_at.cmp(&pb.updated_at),
        SortField::Price => pa.price.cmp(&pb.price),
        SortField::Area => pa.area.total_cmp(&pb.area),
        SortField::Bedrooms => pa.bedrooms.cmp(&pb.bedrooms),
        SortField::Bathrooms => pa.bathrooms.cmp(&pb.bathrooms),
        SortField::YearBuilt => pa.year_built.cmp(&pb.year_built),
        SortField::Views => pa.views.cmp(&pb.views),
        SortField::Title => pa.title.cmp(&pb.title),
        SortField::Distance => a
            .distance_km
            .unwrap_or(f64::MAX)
            .total_cmp(&b.distance_km.unwrap_or(f64::MAX)),
    }
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn search(&self, plan: &SearchPlan) -> Result<(Vec<PropertyJoined>, i64), AppError> {
        self.touch();
        let reference = plan.geo.reference_point();

        let mut hits: Vec<PropertyJoined> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| matches(&plan.filter, &row.property))
            .cloned()
            .map(|mut row| {
                row.distance_km =
                    reference.map(|center| haversine_km(center, point(&row.property)));
                row
            })
            .filter(|row| match plan.geo {
                GeoMode::Radius { radius_km, .. } => {
                    row.distance_km.is_some_and(|d| d <= radius_km)
                }
                GeoMode::Bounds(bbox) => bbox.contains(point(&row.property)),
                GeoMode::None | GeoMode::DistanceSort { .. } => true,
            })
            .collect();

        hits.sort_by(|a, b| {
            let ordering = compare(plan.sort.field, a, b);
            let ordering = match plan.sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            ordering.then(a.property.id.cmp(&b.property.id))
        });

        let total = hits.len() as i64;
        let page = hits
            .into_iter()
            .skip(plan.pagination.offset() as usize)
            .take(plan.pagination.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<PropertyJoined>, AppError> {
        self.touch();
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|row| row.property.id == id).cloned())
    }

    async fn find_and_increment_views(
        &self,
        id: Uuid,
    ) -> Result<Option<PropertyJoined>, AppError> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|row| row.property.id == id).map(|row| {
            row.property.views += 1;
            row.clone()
        }))
    }

    async fn create(
        &self,
        owner_id: Uuid,
        property_in: &PropertyIn,
    ) -> Result<PropertyJoined, AppError> {
        self.touch();
        let mut row = listing(
            &property_in.title,
            0,
            property_in.bedrooms,
            LatLng {
                lat: property_in.latitude,
                lng: property_in.longitude,
            },
        );
        let p = &mut row.property;
        p.description = property_in.description.clone();
        p.price = property_in.price.clone();
        p.currency = property_in.currency;
        p.listing_type = property_in.listing_type;
        p.property_type = property_in.property_type.clone();
        p.bathrooms = property_in.bathrooms;
        p.area = property_in.area;
        p.year_built = property_in.year_built;
        p.address = property_in.address.clone();
        p.city = property_in.city.clone();
        p.province = property_in.province.clone();
        p.country = property_in.country.clone();
        p.features = property_in.features.clone();
        p.amenities = property_in.amenities.clone();
        p.owner_id = owner_id;
        p.is_premium = property_in.is_premium;
        p.premium_expires_at = property_in.premium_expires_at;

        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &PropertyPatch,
    ) -> Result<Option<PropertyJoined>, AppError> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|row| row.property.id == id) else {
            return Ok(None);
        };

        let p = &mut row.property;
        if let Some(v) = &patch.title {
            p.title = v.clone();
        }
        if let Some(v) = &patch.price {
            p.price = v.clone();
        }
        if let Some(v) = patch.status {
            p.status = v;
        }
        if let Some(v) = &patch.amenities {
            p.amenities = v.clone();
        }
        if let Some(v) = patch.latitude {
            p.latitude = v;
        }
        if let Some(v) = patch.longitude {
            p.longitude = v;
        }
        p.location = vec![p.longitude, p.latitude];
        p.updated_at = Utc::now();

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.property.id != id);
        Ok(rows.len() < before)
    }
}

// -- =====================
// -- Fixtures
// -- =====================

fn listing(title: &str, price: i64, bedrooms: i32, at: LatLng) -> PropertyJoined {
    let now = Utc::now();
    PropertyJoined {
        property: Property {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("{title}, close to the river"),
            price: BigDecimal::from(price),
            currency: Currency::Usd,
            listing_type: ListingType::Sale,
            property_type: "apartment".to_string(),
            bedrooms,
            bathrooms: 1,
            area: 120.0,
            year_built: Some(2015),
            address: "Avenue du Commerce".to_string(),
            city: "Kinshasa".to_string(),
            province: "Kinshasa".to_string(),
            country: "DR Congo".to_string(),
            latitude: at.lat,
            longitude: at.lng,
            location: vec![at.lng, at.lat],
            features: vec![],
            amenities: vec![],
            status: PropertyStatus::Active,
            owner_id: AGENT_ID,
            views: 0,
            favorites: vec![],
            is_premium: false,
            premium_expires_at: None,
            created_at: now,
            updated_at: now,
        },
        owner_full_name: "Grace Mbuyi".to_string(),
        owner_email: "grace@example.com".to_string(),
        owner_phone_number: Some("+243810000000".to_string()),
        owner_picture: None,
        distance_km: None,
    }
}

fn app(store: Arc<MemoryStore>) -> Router {
    features::routes().with_state(AppState {
        config: config(SECRET),
        properties: store,
    })
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn token(sub: Uuid, role: UserRole) -> String {
    sign(SECRET, sub, role, TokenType::Access)
}

async fn send(store: &Arc<MemoryStore>, request: Request<Body>) -> (StatusCode, Value) {
    let response = app(store.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn titles(body: &Value) -> Vec<String> {
    body["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

// -- =====================
// -- Plain list
// -- =====================

#[tokio::test]
async fn kinshasa_price_and_bedroom_filters_pick_the_apartment() {
    let store = MemoryStore::with(vec![
        listing("Apartment Gombe", 180_000, 3, KINSHASA),
        listing("Villa Ngaliema", 550_000, 5, KINSHASA),
    ]);

    let (status, body) = send(
        &store,
        get("/properties?city=Kinshasa&minPrice=100000&maxPrice=300000&bedrooms=3&page=1&limit=12"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Apartment Gombe"]);
    assert_eq!(body["pagination"]["totalItems"], 1);
    assert_eq!(body["pagination"]["totalPages"], 1);
    assert!(body.get("sortedByDistance").is_none());
}

#[tokio::test]
async fn bedrooms_plus_suffix_is_the_same_minimum() {
    let store = MemoryStore::with(
        (2..=5)
            .map(|n| listing(&format!("{n} bedrooms"), 100_000, n, KINSHASA))
            .collect(),
    );

    let (_, plus) = send(&store, get("/properties?bedrooms=4%2B")).await;
    let (_, plain) = send(&store, get("/properties?bedrooms=4")).await;

    assert_eq!(plus, plain);
    assert_eq!(plus["pagination"]["totalItems"], 2);
}

#[tokio::test]
async fn empty_parameters_do_not_constrain() {
    let store = MemoryStore::with(vec![
        listing("One", 1, 1, KINSHASA),
        listing("Two", 2, 2, BRAZZAVILLE),
    ]);

    let (status, body) = send(
        &store,
        get("/properties?city=&minPrice=&listingType=&bedrooms=&features=&status="),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["totalItems"], 2);
}

#[tokio::test]
async fn features_accept_repeated_keys_and_comma_lists() {
    let mut with_both = listing("Both", 1, 1, KINSHASA);
    with_both.property.features = vec!["garage".to_string(), "terrace".to_string()];
    let mut garage_only = listing("Garage only", 1, 1, KINSHASA);
    garage_only.property.features = vec!["garage".to_string()];
    let store = MemoryStore::with(vec![with_both, garage_only]);

    let (_, repeated) = send(&store, get("/properties?features=garage&features=terrace")).await;
    let (_, comma) = send(&store, get("/properties?features=garage,terrace")).await;

    assert_eq!(titles(&repeated), vec!["Both"]);
    assert_eq!(repeated, comma);
}

#[tokio::test]
async fn malformed_typed_values_are_rejected_before_the_store() {
    let store = MemoryStore::with(vec![listing("One", 1, 1, KINSHASA)]);

    for uri in [
        "/properties?minPrice=cheap",
        "/properties?listingType=lease",
        "/properties?owner=not-a-uuid",
        "/properties?bedrooms=many",
        "/properties?status=archived",
    ] {
        let (status, body) = send(&store, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Validation error", "{uri}");
    }
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn pages_are_stable_and_total_pages_is_the_ceiling() {
    let now = Utc::now();
    let store = MemoryStore::with(
        (0..25)
            .map(|i| {
                let mut row = listing(&format!("Listing {i:02}"), 1_000 * i, 2, KINSHASA);
                row.property.created_at = now - Duration::minutes(i);
                row
            })
            .collect(),
    );

    let (status, first) = send(&store, get("/properties?limit=12&page=3")).await;
    let (_, second) = send(&store, get("/properties?limit=12&page=3")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(titles(&first), vec!["Listing 24"]);

    let pagination = &first["pagination"];
    assert_eq!(pagination["currentPage"], 3);
    assert_eq!(pagination["totalPages"], 3);
    assert_eq!(pagination["totalItems"], 25);
    assert_eq!(pagination["itemsPerPage"], 12);
    assert_eq!(pagination["hasNext"], false);
    assert_eq!(pagination["hasPrev"], true);

    let (_, cheapest) = send(&store, get("/properties?sortBy=price&sortOrder=asc&limit=2")).await;
    assert_eq!(titles(&cheapest), vec!["Listing 00", "Listing 01"]);
}

#[tokio::test]
async fn distance_sort_on_plain_list_echoes_reference_point() {
    let store = MemoryStore::with(vec![
        listing("Lubumbashi", 1, 1, LUBUMBASHI),
        listing("Brazzaville", 1, 1, BRAZZAVILLE),
        listing("Kinshasa", 1, 1, KINSHASA),
    ]);

    let (status, body) = send(
        &store,
        get("/properties?sortByDistance=true&lat=-4.3217&lng=15.3125"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Kinshasa", "Brazzaville", "Lubumbashi"]);
    assert_eq!(body["sortedByDistance"], true);
    assert_eq!(body["referencePoint"], json!({"lat": -4.3217, "lng": 15.3125}));
    // no radius cutoff
    assert_eq!(body["pagination"]["totalItems"], 3);
    assert!(body["properties"][2]["distanceKm"].as_f64().unwrap() > 1_000.0);
}

#[tokio::test]
async fn plain_list_sees_every_status() {
    let mut sold = listing("Sold", 1, 1, KINSHASA);
    sold.property.status = PropertyStatus::Sold;
    let store = MemoryStore::with(vec![listing("Active", 1, 1, KINSHASA), sold]);

    let (_, list) = send(&store, get("/properties")).await;
    assert_eq!(list["pagination"]["totalItems"], 2);

    let (_, nearby) = send(&store, get("/properties/nearby?lat=-4.3217&lng=15.3125")).await;
    assert_eq!(titles(&nearby), vec!["Active"]);

    let (_, nearby_sold) = send(
        &store,
        get("/properties/nearby?lat=-4.3217&lng=15.3125&status=sold"),
    )
    .await;
    assert_eq!(titles(&nearby_sold), vec!["Sold"]);
}

#[tokio::test]
async fn owner_projection_has_no_credentials() {
    let store = MemoryStore::with(vec![listing("One", 1, 1, KINSHASA)]);

    let (_, body) = send(&store, get("/properties")).await;
    let owner = body["properties"][0]["owner"].as_object().unwrap();

    let mut keys: Vec<&str> = owner.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["email", "fullName", "id", "phoneNumber", "picture"]);
}

// -- =====================
// -- Nearby
// -- =====================

#[tokio::test]
async fn nearby_includes_property_at_the_center_with_zero_distance() {
    let store = MemoryStore::with(vec![
        listing("Brazzaville", 1, 1, BRAZZAVILLE),
        listing("Kinshasa", 1, 1, KINSHASA),
        listing("Lubumbashi", 1, 1, LUBUMBASHI),
    ]);

    let (status, body) = send(
        &store,
        get("/properties/nearby?lat=-4.3217&lng=15.3125&radius=5"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Kinshasa"]);
    assert_eq!(body["properties"][0]["distanceKm"], 0.0);
    assert_eq!(body["pagination"]["totalProperties"], 1);
    assert!(body["pagination"].get("totalItems").is_none());
    assert_eq!(body["searchCenter"], json!({"lat": -4.3217, "lng": 15.3125}));
    assert_eq!(body["radiusKm"], 5.0);
}

#[tokio::test]
async fn nearby_results_stay_within_radius_nearest_first() {
    let store = MemoryStore::with(vec![
        listing("Brazzaville", 1, 1, BRAZZAVILLE),
        listing("Lubumbashi", 1, 1, LUBUMBASHI),
        listing("Kinshasa", 1, 1, KINSHASA),
    ]);

    let (_, body) = send(
        &store,
        get("/properties/nearby?lat=-4.3217&lng=15.3125&radius=15"),
    )
    .await;

    assert_eq!(titles(&body), vec!["Kinshasa", "Brazzaville"]);
    let distances: Vec<f64> = body["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["distanceKm"].as_f64().unwrap())
        .collect();
    assert!(distances.iter().all(|d| *d <= 15.0));
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));

    // default radius is 10 km
    let (_, body) = send(&store, get("/properties/nearby?lat=-4.3217&lng=15.3125")).await;
    assert_eq!(body["radiusKm"], 10.0);
}

#[tokio::test]
async fn invalid_coordinates_never_reach_the_store() {
    let store = MemoryStore::with(vec![listing("One", 1, 1, KINSHASA)]);

    let (status, body) = send(&store, get("/properties/nearby?lat=95&lng=15.3125")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("lat must be between -90 and 90"),
        "{body}"
    );

    for uri in [
        "/properties/nearby?lng=15.3125",
        "/properties/nearby?lat=-4.3&lng=200",
        "/properties/nearby?lat=-4.3&lng=15.3&radius=0",
        "/properties/nearby?lat=-4.3&lng=15.3&radius=-2",
        "/properties?sortByDistance=true&lat=95&lng=15.3",
        "/properties/bounds?neLat=-4.5&neLng=15.4&swLat=-4.2&swLng=15.2",
        "/properties/bounds?neLat=-4.2&neLng=15.4",
    ] {
        let (status, _) = send(&store, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }

    assert_eq!(store.calls(), 0);
}

// -- =====================
// -- Bounds
// -- =====================

#[tokio::test]
async fn bounds_results_lie_inside_the_box() {
    let mut sold = listing("Sold inside", 1, 1, KINSHASA);
    sold.property.status = PropertyStatus::Sold;
    let store = MemoryStore::with(vec![
        listing("Kinshasa", 1, 1, KINSHASA),
        listing("Brazzaville", 1, 1, BRAZZAVILLE),
        listing("Lubumbashi", 1, 1, LUBUMBASHI),
        sold,
    ]);

    let (status, body) = send(
        &store,
        get("/properties/bounds?neLat=-4.2&neLng=15.4&swLat=-4.5&swLng=15.2"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["totalProperties"], 2);
    assert_eq!(body["pagination"]["itemsPerPage"], 50);
    for p in body["properties"].as_array().unwrap() {
        let lat = p["latitude"].as_f64().unwrap();
        let lng = p["longitude"].as_f64().unwrap();
        assert!((-4.5..=-4.2).contains(&lat) && (15.2..=15.4).contains(&lng));
        assert_eq!(p["location"]["coordinates"], json!([lng, lat]));
        assert!(p.get("distanceKm").is_none());
    }
    assert_eq!(
        body["bounds"],
        json!({
            "northEast": {"lat": -4.2, "lng": 15.4},
            "southWest": {"lat": -4.5, "lng": 15.2}
        })
    );
}

// -- =====================
// -- Lifecycle
// -- =====================

#[tokio::test]
async fn detail_fetch_counts_views() {
    let row = listing("One", 1, 1, KINSHASA);
    let id = row.property.id;
    let store = MemoryStore::with(vec![row]);

    let (status, body) = send(&store, get(&format!("/properties/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["views"], 1);

    let (_, body) = send(&store, get(&format!("/properties/{id}"))).await;
    assert_eq!(body["views"], 2);

    let (status, _) = send(&store, get(&format!("/properties/{}", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&store, get("/properties/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn new_property() -> Value {
    json!({
        "title": "Loft Gombe",
        "price": "95000",
        "listingType": "rent",
        "propertyType": "loft",
        "bedrooms": 2,
        "bathrooms": 1,
        "area": 85.0,
        "address": "Boulevard du 30 Juin",
        "city": "Kinshasa",
        "latitude": -4.305,
        "longitude": 15.31,
        "amenities": ["security", "internet"]
    })
}

#[tokio::test]
async fn create_requires_an_agent_or_admin() {
    let store = MemoryStore::with(vec![]);

    let (status, _) = send(&store, with_json("POST", "/properties", None, new_property())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = token(Uuid::new_v4(), UserRole::User);
    let request = with_json("POST", "/properties", Some(&user), new_property());
    let (status, _) = send(&store, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let refresh = sign(SECRET, AGENT_ID, UserRole::Agent, TokenType::Refresh);
    let request = with_json("POST", "/properties", Some(&refresh), new_property());
    let (status, _) = send(&store, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(store.calls(), 0);

    let agent = token(AGENT_ID, UserRole::Agent);
    let request = with_json("POST", "/properties", Some(&agent), new_property());
    let (status, body) = send(&store, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["owner"]["id"], AGENT_ID.to_string());
    assert_eq!(body["status"], "active");
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["location"], json!({"type": "Point", "coordinates": [15.31, -4.305]}));
}

#[tokio::test]
async fn create_validates_the_body() {
    let store = MemoryStore::with(vec![]);
    let agent = token(AGENT_ID, UserRole::Agent);

    let mut body = new_property();
    body["amenities"] = json!(["helipad"]);
    let (status, response) =
        send(&store, with_json("POST", "/properties", Some(&agent), body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["message"].as_str().unwrap().contains("helipad"));

    let mut body = new_property();
    body["latitude"] = json!(120.0);
    let (status, _) = send(&store, with_json("POST", "/properties", Some(&agent), body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = new_property();
    body["price"] = json!("-10");
    let (status, _) = send(&store, with_json("POST", "/properties", Some(&agent), body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn update_is_limited_to_owner_or_admin() {
    let row = listing("One", 1, 1, KINSHASA);
    let id = row.property.id;
    let store = MemoryStore::with(vec![row]);
    let uri = format!("/properties/{id}");

    let stranger = token(Uuid::new_v4(), UserRole::Agent);
    let request = with_json("PATCH", &uri, Some(&stranger), json!({"title": "Mine"}));
    let (status, _) = send(&store, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let owner = token(AGENT_ID, UserRole::Agent);
    let (status, body) = send(
        &store,
        with_json(
            "PATCH",
            &uri,
            Some(&owner),
            json!({"price": "150000", "latitude": -4.4, "status": "pending"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["latitude"], -4.4);
    assert_eq!(body["location"]["coordinates"], json!([15.3125, -4.4]));

    let admin = token(Uuid::new_v4(), UserRole::Admin);
    let request = with_json("PATCH", &uri, Some(&admin), json!({"title": "Renamed"}));
    let (status, body) = send(&store, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Renamed");
}

#[tokio::test]
async fn delete_is_admin_only() {
    let row = listing("One", 1, 1, KINSHASA);
    let id = row.property.id;
    let store = MemoryStore::with(vec![row]);
    let uri = format!("/properties/{id}");

    let delete = |token: String| {
        Request::builder()
            .method("DELETE")
            .uri(&uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = send(&store, delete(token(AGENT_ID, UserRole::Agent))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = Uuid::new_v4();
    let (status, body) = send(&store, delete(token(admin, UserRole::Admin))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&store, delete(token(admin, UserRole::Admin))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_is_live() {
    let store = MemoryStore::with(vec![]);
    let (status, body) = send(&store, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
