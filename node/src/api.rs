//! # REST API
//!
//! Builds the axum router that exposes the monetization engine over HTTP.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                                   | Description                         |
//! |--------|----------------------------------------|-------------------------------------|
//! | GET    | `/health`                              | Liveness probe                      |
//! | POST   | `/api/v1/assets`                       | Register a data asset               |
//! | GET    | `/api/v1/assets/:id`                   | Asset with its current valuation    |
//! | POST   | `/api/v1/bonds`                        | Issue a liquidity bond              |
//! | GET    | `/api/v1/bonds?status=`                | List bonds, optionally by status    |
//! | GET    | `/api/v1/bonds/:id`                    | Bond with its current value         |
//! | POST   | `/api/v1/bonds/:id/redeem`             | Redeem a bond now                   |
//! | POST   | `/api/v1/bonds/:id/default`            | Record an issuer default now        |
//! | GET    | `/api/v1/portfolio`                    | Portfolio metrics                   |
//! | GET    | `/api/v1/portfolio/top?limit=`         | Top bonds by ROI                    |
//! | GET    | `/api/v1/portfolio/maturities?horizon_days=` | Maturity schedule             |
//!
//! Money is serialized as a two-decimal string (`"260000.00"`), timestamps
//! as RFC 3339 UTC. Errors are `{"error": ..., "kind": ...}` with 400, 404
//! or 409 depending on the error kind.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use nwu_core::config::{IssuanceDefaults, DEFAULT_TOP_LIMIT};
use nwu_core::money::serialize_cents;
use nwu_core::{
    AssetMetadata, AssetRegistry, BondManager, BondStatus, BondTerms, DataAsset, DataQuality,
    ErrorKind, LiquidityBond, MaturityBuckets, MonetizationError, ScheduledMaturity,
    ValuationEngine,
};

use crate::metrics::SharedMetrics;

/// Horizon used by `/portfolio/maturities` when none is given.
pub const DEFAULT_HORIZON_DAYS: u32 = 90;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Source of "now" for every time-dependent handler.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Shared application state available to all request handlers.
///
/// Cheap to clone: everything heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub manager: Arc<BondManager>,
    pub registry: Arc<RwLock<AssetRegistry>>,
    pub engine: ValuationEngine,
    /// Terms applied when an issuance request omits them.
    pub issuance: IssuanceDefaults,
    pub metrics: SharedMetrics,
    pub clock: Clock,
}

impl AppState {
    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Counts a rejected operation and converts it for the response.
    fn reject(&self, err: MonetizationError) -> ApiError {
        let kind = err.kind();
        self.metrics.record_rejection(kind.as_str());
        tracing::debug!(error = %err, kind = kind.as_str(), "request rejected");
        ApiError::from(err)
    }
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/assets", post(register_asset_handler))
        .route("/api/v1/assets/:asset_id", get(asset_handler))
        .route("/api/v1/bonds", post(issue_bond_handler).get(list_bonds_handler))
        .route("/api/v1/bonds/:bond_id", get(bond_handler))
        .route("/api/v1/bonds/:bond_id/redeem", post(redeem_handler))
        .route("/api/v1/bonds/:bond_id/default", post(default_handler))
        .route("/api/v1/portfolio", get(portfolio_handler))
        .route("/api/v1/portfolio/top", get(top_performing_handler))
        .route("/api/v1/portfolio/maturities", get(maturities_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// A core error on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: ErrorKind,
    message: String,
}

impl From<MonetizationError> for ApiError {
    fn from(err: MonetizationError) -> Self {
        let kind = err.kind();
        let status = match kind {
            ErrorKind::Invalid => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
        };
        Self {
            status,
            kind,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            kind: self.kind.as_str().to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ---------------------------------------------------------------------------
// Request Types
// ---------------------------------------------------------------------------

/// Body of `POST /api/v1/assets`. A UUID is assigned when `asset_id` is absent.
#[derive(Debug, Deserialize)]
pub struct RegisterAssetRequest {
    pub asset_id: Option<String>,
    /// Tier name, case-insensitive.
    pub quality: String,
    pub uniqueness_score: Decimal,
    pub demand_score: Decimal,
    pub volume: Decimal,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data_type: String,
}

/// Body of `POST /api/v1/bonds`.
#[derive(Debug, Deserialize)]
pub struct IssueBondRequest {
    pub asset_id: String,
    #[serde(alias = "amount")]
    pub principal: Decimal,
    pub interest_rate: Option<Decimal>,
    pub maturity_days: Option<u32>,
    pub issuer: String,
    pub holder: Option<String>,
}

/// Body of `POST /api/v1/bonds/:id/default`.
#[derive(Debug, Deserialize)]
pub struct DefaultBondRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ListBondsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct MaturitiesQuery {
    pub horizon_days: Option<u32>,
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ValuationView {
    #[serde(serialize_with = "serialize_cents")]
    pub current_value: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub monthly_revenue_potential: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub annual_revenue_potential: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub projected_roi_percentage: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AssetView {
    pub asset_id: String,
    pub quality: DataQuality,
    pub uniqueness_score: Decimal,
    pub demand_score: Decimal,
    pub volume: Decimal,
    pub metadata: AssetMetadata,
    pub valuation: ValuationView,
}

#[derive(Debug, Serialize)]
pub struct SettlementView {
    #[serde(serialize_with = "serialize_cents")]
    pub value: Decimal,
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A bond as seen at the time of the request.
#[derive(Debug, Serialize)]
pub struct BondView {
    pub bond_id: String,
    pub asset_id: String,
    pub status: BondStatus,
    #[serde(serialize_with = "serialize_cents")]
    pub principal: Decimal,
    pub interest_rate: Decimal,
    pub maturity_days: u32,
    pub issue_date: DateTime<Utc>,
    pub maturity_date: DateTime<Utc>,
    pub days_remaining: u32,
    pub issuer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(serialize_with = "serialize_cents")]
    pub current_value: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub interest_earned: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub roi_percentage: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub maturity_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<SettlementView>,
}

impl BondView {
    fn at(bond: &LiquidityBond, as_of: DateTime<Utc>) -> Self {
        Self {
            bond_id: bond.bond_id().to_string(),
            asset_id: bond.asset_id().to_string(),
            status: bond.status_at(as_of),
            principal: bond.principal(),
            interest_rate: bond.interest_rate(),
            maturity_days: bond.maturity_days(),
            issue_date: bond.issue_date(),
            maturity_date: bond.maturity_date(),
            days_remaining: bond.days_remaining(as_of),
            issuer: bond.issuer().to_string(),
            holder: bond.holder().map(str::to_string),
            current_value: bond.current_value(as_of),
            interest_earned: bond.interest_earned(as_of),
            roi_percentage: bond.roi_percentage(as_of),
            maturity_value: bond.maturity_value(),
            settlement: bond.settlement().map(|s| SettlementView {
                value: s.value,
                at: s.at,
                reason: s.reason.map(str::to_string),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PortfolioView {
    pub as_of: DateTime<Utc>,
    pub total_assets: usize,
    pub total_bonds: usize,
    #[serde(serialize_with = "serialize_cents")]
    pub total_principal: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub total_current_value: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub accrued_interest: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub realized_value: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub roi_percentage: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub average_bond_size: Decimal,
    pub count_by_status: BTreeMap<BondStatus, usize>,
}

#[derive(Debug, Serialize)]
pub struct ScheduledView {
    pub bond_id: String,
    pub maturity_date: DateTime<Utc>,
    pub days_remaining: u32,
    #[serde(serialize_with = "serialize_cents")]
    pub principal: Decimal,
    #[serde(serialize_with = "serialize_cents")]
    pub expected_value: Decimal,
}

impl From<&ScheduledMaturity> for ScheduledView {
    fn from(entry: &ScheduledMaturity) -> Self {
        Self {
            bond_id: entry.bond_id.clone(),
            maturity_date: entry.maturity_date,
            days_remaining: entry.days_remaining,
            principal: entry.principal,
            expected_value: entry.expected_value,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MaturitiesView {
    pub as_of: DateTime<Utc>,
    pub horizon_days: u32,
    /// Outstanding bonds due within the horizon, soonest first.
    pub due: Vec<ScheduledView>,
    /// Every outstanding bond, by days remaining.
    pub buckets: BucketsView,
}

#[derive(Debug, Serialize)]
pub struct BucketsView {
    pub next_30_days: Vec<ScheduledView>,
    pub next_90_days: Vec<ScheduledView>,
    pub next_180_days: Vec<ScheduledView>,
    pub beyond_180_days: Vec<ScheduledView>,
}

impl From<&MaturityBuckets> for BucketsView {
    fn from(buckets: &MaturityBuckets) -> Self {
        let view = |entries: &[ScheduledMaturity]| -> Vec<ScheduledView> {
            entries.iter().map(ScheduledView::from).collect()
        };
        Self {
            next_30_days: view(buckets.next_30_days.as_slice()),
            next_90_days: view(buckets.next_90_days.as_slice()),
            next_180_days: view(buckets.next_180_days.as_slice()),
            beyond_180_days: view(buckets.beyond_180_days.as_slice()),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`. Liveness only; it does not touch the bond book.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "version": state.version }))
}

/// `POST /api/v1/assets`.
async fn register_asset_handler(
    State(state): State<AppState>,
    Json(req): Json<RegisterAssetRequest>,
) -> ApiResult<(StatusCode, Json<AssetView>)> {
    let asset_id = req
        .asset_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let quality: DataQuality = req.quality.parse().map_err(|e| state.reject(e))?;
    let asset = DataAsset::new(
        asset_id,
        quality,
        req.uniqueness_score,
        req.demand_score,
        req.volume,
    )
    .map_err(|e| state.reject(e))?
    .with_metadata(AssetMetadata {
        name: req.name,
        description: req.description,
        data_type: req.data_type,
    });

    let view = asset_view(&state, &asset)?;
    state
        .registry
        .write()
        .register(asset)
        .map_err(|e| state.reject(e))?;
    state.metrics.assets_registered_total.inc();
    tracing::info!(asset_id = %view.asset_id, quality = %view.quality, "asset registered");

    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /api/v1/assets/:id`. Valuation is recomputed on every call.
async fn asset_handler(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> ApiResult<Json<AssetView>> {
    let asset = state
        .registry
        .read()
        .get(&asset_id)
        .cloned()
        .map_err(|e| state.reject(e))?;
    Ok(Json(asset_view(&state, &asset)?))
}

fn asset_view(state: &AppState, asset: &DataAsset) -> ApiResult<AssetView> {
    let timer = state.metrics.valuation_latency_seconds.start_timer();
    let potential = state
        .engine
        .monetization_potential(asset)
        .map_err(|e| state.reject(e))?;
    timer.observe_duration();

    Ok(AssetView {
        asset_id: asset.asset_id.clone(),
        quality: asset.quality,
        uniqueness_score: asset.uniqueness_score,
        demand_score: asset.demand_score,
        volume: asset.volume,
        metadata: asset.metadata.clone(),
        valuation: ValuationView {
            current_value: potential.current_value,
            monthly_revenue_potential: potential.monthly_revenue_potential,
            annual_revenue_potential: potential.annual_revenue_potential,
            projected_roi_percentage: potential.projected_roi_percentage,
        },
    })
}

/// `POST /api/v1/bonds`. The asset must be registered first.
async fn issue_bond_handler(
    State(state): State<AppState>,
    Json(req): Json<IssueBondRequest>,
) -> ApiResult<(StatusCode, Json<BondView>)> {
    let asset_id = state
        .registry
        .read()
        .get(&req.asset_id)
        .map(|asset| asset.asset_id.clone())
        .map_err(|e| state.reject(e))?;

    let now = state.now();
    let terms = BondTerms {
        asset_id,
        principal: req.principal,
        interest_rate: req.interest_rate.unwrap_or(state.issuance.interest_rate),
        maturity_days: req.maturity_days.unwrap_or(state.issuance.maturity_days),
        issuer: req.issuer,
        holder: req.holder,
    };
    let bond_id = state.manager.issue(terms, now).map_err(|e| state.reject(e))?;
    state.metrics.bonds_issued_total.inc();

    let bond = state
        .manager
        .get_bond(&bond_id)
        .map_err(|e| state.reject(e))?;
    Ok((StatusCode::CREATED, Json(BondView::at(&bond, now))))
}

/// `GET /api/v1/bonds?status=`.
async fn list_bonds_handler(
    State(state): State<AppState>,
    Query(query): Query<ListBondsQuery>,
) -> ApiResult<Json<Vec<BondView>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<BondStatus>)
        .transpose()
        .map_err(|e| state.reject(e))?;

    let now = state.now();
    let bonds: Vec<BondView> = state
        .manager
        .list_bonds_at(status, now)
        .iter()
        .map(|bond| BondView::at(bond, now))
        .collect();
    Ok(Json(bonds))
}

/// `GET /api/v1/bonds/:id`.
async fn bond_handler(
    State(state): State<AppState>,
    Path(bond_id): Path<String>,
) -> ApiResult<Json<BondView>> {
    let now = state.now();
    let bond = state
        .manager
        .get_bond(&bond_id)
        .map_err(|e| state.reject(e))?;
    Ok(Json(BondView::at(&bond, now)))
}

/// `POST /api/v1/bonds/:id/redeem`.
async fn redeem_handler(
    State(state): State<AppState>,
    Path(bond_id): Path<String>,
) -> ApiResult<Json<BondView>> {
    let now = state.now();
    state
        .manager
        .redeem_bond(&bond_id, now)
        .map_err(|e| state.reject(e))?;
    state.metrics.bonds_redeemed_total.inc();

    let bond = state
        .manager
        .get_bond(&bond_id)
        .map_err(|e| state.reject(e))?;
    Ok(Json(BondView::at(&bond, now)))
}

/// `POST /api/v1/bonds/:id/default`.
async fn default_handler(
    State(state): State<AppState>,
    Path(bond_id): Path<String>,
    Json(req): Json<DefaultBondRequest>,
) -> ApiResult<Json<BondView>> {
    let now = state.now();
    state
        .manager
        .default_bond(&bond_id, &req.reason, now)
        .map_err(|e| state.reject(e))?;
    state.metrics.bonds_defaulted_total.inc();

    let bond = state
        .manager
        .get_bond(&bond_id)
        .map_err(|e| state.reject(e))?;
    Ok(Json(BondView::at(&bond, now)))
}

/// `GET /api/v1/portfolio`.
async fn portfolio_handler(State(state): State<AppState>) -> Json<PortfolioView> {
    let now = state.now();
    let metrics = state.manager.portfolio_metrics(now);
    state
        .metrics
        .observe_portfolio(metrics.total_principal, metrics.total_current_value);

    Json(PortfolioView {
        as_of: metrics.as_of,
        total_assets: state.registry.read().len(),
        total_bonds: metrics.total_bonds,
        total_principal: metrics.total_principal,
        total_current_value: metrics.total_current_value,
        accrued_interest: metrics.accrued_interest,
        realized_value: metrics.realized_value,
        roi_percentage: metrics.roi_percentage,
        average_bond_size: metrics.average_bond_size,
        count_by_status: metrics.count_by_status,
    })
}

/// `GET /api/v1/portfolio/top?limit=`.
async fn top_performing_handler(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> Json<Vec<BondView>> {
    let now = state.now();
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    let top: Vec<BondView> = state
        .manager
        .top_performing(limit, now)
        .iter()
        .map(|perf| BondView::at(&perf.bond, now))
        .collect();
    Json(top)
}

/// `GET /api/v1/portfolio/maturities?horizon_days=`.
async fn maturities_handler(
    State(state): State<AppState>,
    Query(query): Query<MaturitiesQuery>,
) -> Json<MaturitiesView> {
    let now = state.now();
    let horizon_days = query.horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS);

    let due: Vec<ScheduledView> = state
        .manager
        .maturity_schedule(now, horizon_days)
        .iter()
        .map(|bond| ScheduledView {
            bond_id: bond.bond_id().to_string(),
            maturity_date: bond.maturity_date(),
            days_remaining: bond.days_remaining(now),
            principal: bond.principal(),
            expected_value: bond.maturity_value(),
        })
        .collect();

    let buckets = state.manager.maturity_buckets(now);

    Json(MaturitiesView {
        as_of: now,
        horizon_days,
        due,
        buckets: BucketsView::from(&buckets),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, TimeZone};
    use http_body_util::BodyExt;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::metrics::MonetizationMetrics;

    /// Test state with a clock the test can move.
    fn test_app_state() -> (AppState, Arc<Mutex<DateTime<Utc>>>) {
        let now = Arc::new(Mutex::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
        let clock_ref = Arc::clone(&now);
        let state = AppState {
            version: "0.1.0-test".into(),
            manager: Arc::new(BondManager::new()),
            registry: Arc::new(RwLock::new(AssetRegistry::new())),
            engine: ValuationEngine::default(),
            issuance: IssuanceDefaults::default(),
            metrics: Arc::new(MonetizationMetrics::new().unwrap()),
            clock: Arc::new(move || *clock_ref.lock()),
        };
        (state, now)
    }

    fn advance(clock: &Mutex<DateTime<Utc>>, days: i64) {
        let mut now = clock.lock();
        *now += Duration::days(days);
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn get(router: &Router, path: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        send(router, req).await
    }

    async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        send(router, req).await
    }

    fn reference_asset() -> Value {
        json!({
            "asset_id": "DATA-REF",
            "quality": "premium",
            "uniqueness_score": "0.8",
            "demand_score": "0.6",
            "volume": "1000",
            "name": "Reference"
        })
    }

    async fn issue(router: &Router, principal: &str, rate: &str, days: u32) -> String {
        let (status, body) = post_json(
            router,
            "/api/v1/bonds",
            json!({
                "asset_id": "DATA-REF",
                "principal": principal,
                "interest_rate": rate,
                "maturity_days": days,
                "issuer": "Enterprise-Alpha"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["bond_id"].as_str().unwrap().to_string()
    }

    // -- Health ---------------------------------------------------------------

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        let (status, body) = get(&router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], "0.1.0-test");
    }

    // -- Assets ---------------------------------------------------------------

    #[tokio::test]
    async fn register_and_fetch_asset_with_valuation() {
        let (state, _) = test_app_state();
        let router = create_router(state);

        let (status, body) = post_json(&router, "/api/v1/assets", reference_asset()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["quality"], "PREMIUM");
        assert_eq!(body["valuation"]["current_value"], "14560.00");

        let (status, body) = get(&router, "/api/v1/assets/DATA-REF").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["name"], "Reference");
        assert_eq!(body["valuation"]["monthly_revenue_potential"], "728.00");
        assert_eq!(body["valuation"]["annual_revenue_potential"], "8736.00");
        assert_eq!(body["valuation"]["projected_roi_percentage"], "60.00");
    }

    #[tokio::test]
    async fn asset_id_is_generated_when_absent() {
        let (state, _) = test_app_state();
        let registry = Arc::clone(&state.registry);
        let router = create_router(state);

        let mut asset = reference_asset();
        asset.as_object_mut().unwrap().remove("asset_id");
        let (status, body) = post_json(&router, "/api/v1/assets", asset).await;
        assert_eq!(status, StatusCode::CREATED);

        let id = body["asset_id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
        assert!(registry.read().get(id).is_ok());
    }

    #[tokio::test]
    async fn duplicate_asset_conflicts() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        post_json(&router, "/api/v1/assets", reference_asset()).await;

        let (status, body) = post_json(&router, "/api/v1/assets", reference_asset()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["kind"], "conflict");
    }

    #[tokio::test]
    async fn invalid_asset_is_bad_request() {
        let (state, _) = test_app_state();
        let metrics = Arc::clone(&state.metrics);
        let router = create_router(state);

        let mut asset = reference_asset();
        asset["demand_score"] = json!("1.5");
        let (status, body) = post_json(&router, "/api/v1/assets", asset).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid");
        assert!(body["error"].as_str().unwrap().contains("demand_score"));

        let mut asset = reference_asset();
        asset["quality"] = json!("legendary");
        let (status, _) = post_json(&router, "/api/v1/assets", asset).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(
            metrics
                .operations_rejected_total
                .with_label_values(&["invalid"])
                .get(),
            2
        );
    }

    #[tokio::test]
    async fn unknown_asset_is_not_found() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        let (status, body) = get(&router, "/api/v1/assets/NOPE").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");
    }

    // -- Bonds ----------------------------------------------------------------

    #[tokio::test]
    async fn bond_for_unregistered_asset_is_not_found() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        let (status, _) = post_json(
            &router,
            "/api/v1/bonds",
            json!({ "asset_id": "GHOST", "principal": "100", "issuer": "x" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn issuance_applies_configured_defaults() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        post_json(&router, "/api/v1/assets", reference_asset()).await;

        let (status, body) = post_json(
            &router,
            "/api/v1/bonds",
            json!({ "asset_id": "DATA-REF", "amount": "1000", "issuer": "x", "holder": "fund-a" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["interest_rate"], "0.05");
        assert_eq!(body["maturity_days"], 90);
        assert_eq!(body["principal"], "1000.00");
        assert_eq!(body["holder"], "fund-a");
        assert_eq!(body["status"], "ACTIVE");
    }

    #[tokio::test]
    async fn bad_issuance_parameters_rejected() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        post_json(&router, "/api/v1/assets", reference_asset()).await;

        let (status, body) = post_json(
            &router,
            "/api/v1/bonds",
            json!({ "asset_id": "DATA-REF", "principal": "0", "issuer": "x" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("principal"));
    }

    #[tokio::test]
    async fn bond_value_accrues_with_the_clock() {
        let (state, clock) = test_app_state();
        let router = create_router(state);
        post_json(&router, "/api/v1/assets", reference_asset()).await;
        let id = issue(&router, "250000", "0.08", 180).await;

        advance(&clock, 90);
        let (status, body) = get(&router, &format!("/api/v1/bonds/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_value"], "260000.00");
        assert_eq!(body["interest_earned"], "10000.00");
        assert_eq!(body["roi_percentage"], "4.00");
        assert_eq!(body["days_remaining"], 90);
        assert_eq!(body["status"], "ACTIVE");

        advance(&clock, 100);
        let (_, body) = get(&router, &format!("/api/v1/bonds/{id}")).await;
        assert_eq!(body["status"], "MATURED");
        assert_eq!(body["current_value"], "270000.00");
    }

    #[tokio::test]
    async fn redeem_twice_conflicts() {
        let (state, clock) = test_app_state();
        let router = create_router(state);
        post_json(&router, "/api/v1/assets", reference_asset()).await;
        let id = issue(&router, "250000", "0.08", 180).await;

        advance(&clock, 90);
        let (status, body) = post_json(&router, &format!("/api/v1/bonds/{id}/redeem"), json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "REDEEMED");
        assert_eq!(body["settlement"]["value"], "260000.00");

        advance(&clock, 30);
        let (status, body) = post_json(&router, &format!("/api/v1/bonds/{id}/redeem"), json!({})).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["kind"], "conflict");

        let (_, body) = get(&router, &format!("/api/v1/bonds/{id}")).await;
        assert_eq!(body["current_value"], "260000.00");
    }

    #[tokio::test]
    async fn default_records_reason() {
        let (state, clock) = test_app_state();
        let router = create_router(state);
        post_json(&router, "/api/v1/assets", reference_asset()).await;
        let id = issue(&router, "1000", "0.10", 100).await;
        let path = format!("/api/v1/bonds/{id}/default");

        let (status, _) = post_json(&router, &path, json!({ "reason": " " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        advance(&clock, 50);
        let (status, body) = post_json(&router, &path, json!({ "reason": "issuer insolvent" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "DEFAULTED");
        assert_eq!(body["settlement"]["value"], "1050.00");
        assert_eq!(body["settlement"]["reason"], "issuer insolvent");
    }

    #[tokio::test]
    async fn unknown_bond_is_not_found() {
        let (state, _) = test_app_state();
        let router = create_router(state);
        let (status, _) = get(&router, "/api/v1/bonds/LB-missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = post_json(&router, "/api/v1/bonds/LB-missing/redeem", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let (state, clock) = test_app_state();
        let router = create_router(state);
        post_json(&router, "/api/v1/assets", reference_asset()).await;
        let first = issue(&router, "100", "0.05", 30).await;
        let second = issue(&router, "200", "0.05", 365).await;
        post_json(&router, &format!("/api/v1/bonds/{second}/redeem"), json!({})).await;

        advance(&clock, 45);
        let (status, body) = get(&router, "/api/v1/bonds").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["bond_id"], first.as_str());

        let (_, body) = get(&router, "/api/v1/bonds?status=matured").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["bond_id"], first.as_str());

        let (_, body) = get(&router, "/api/v1/bonds?status=REDEEMED").await;
        assert_eq!(body[0]["bond_id"], second.as_str());

        let (status, body) = get(&router, "/api/v1/bonds?status=pending").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid");
    }

    // -- Portfolio ------------------------------------------------------------

    #[tokio::test]
    async fn portfolio_reports_reference_deployment() {
        let (state, clock) = test_app_state();
        let now = *clock.lock();
        crate::demo::seed(&mut state.registry.write(), &state.manager, now).unwrap();
        let metrics = Arc::clone(&state.metrics);
        let router = create_router(state);

        let (status, body) = get(&router, "/api/v1/portfolio").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_assets"], 5);
        assert_eq!(body["total_bonds"], 5);
        assert_eq!(body["total_principal"], "3350000.00");
        assert_eq!(body["total_current_value"], "3350000.00");
        assert_eq!(body["roi_percentage"], "0.00");
        assert_eq!(body["count_by_status"]["ACTIVE"], 5);
        assert_eq!(body["count_by_status"]["DEFAULTED"], 0);
        assert_eq!(metrics.portfolio_principal.get(), 3_350_000.0);
    }

    #[tokio::test]
    async fn top_and_maturities() {
        let (state, clock) = test_app_state();
        let now = *clock.lock();
        let ids = crate::demo::seed(&mut state.registry.write(), &state.manager, now).unwrap();
        let router = create_router(state);

        advance(&clock, 90);
        let (status, body) = get(&router, "/api/v1/portfolio/top?limit=2").await;
        assert_eq!(status, StatusCode::OK);
        let top = body.as_array().unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0]["bond_id"], ids[4].as_str());
        assert_eq!(top[0]["roi_percentage"], "5.50");

        let (status, body) = get(&router, "/api/v1/portfolio/maturities?horizon_days=90").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["horizon_days"], 90);
        assert_eq!(body["due"].as_array().unwrap().len(), 2);
        assert_eq!(body["due"][0]["expected_value"], "270000.00");
        assert_eq!(body["buckets"]["next_90_days"].as_array().unwrap().len(), 2);
        assert_eq!(body["buckets"]["beyond_180_days"].as_array().unwrap().len(), 2);
    }
}
