use actix_cors::Cors;
use actix_web::{error, middleware, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use host::{check_ball_count, load_boards, run_drops, BalanceError, BalanceStore, DropReport, ServerSettings};
use plinko_core::{Boards, RandomBounces, RiskLevel};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Shared by every worker. Boards are immutable; the balance store locks internally.
struct AppState {
    boards: Boards,
    default_risk: RiskLevel,
    balance: BalanceStore,
}

impl AppState {
    fn risk(&self, requested: Option<&str>) -> Result<RiskLevel, String> {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => RiskLevel::from_str(raw),
            None => Ok(self.default_risk),
        }
    }
}

// Request/Response types

#[derive(Debug, Deserialize)]
struct RiskQuery {
    risk: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DropsRequest {
    /// Requested starting slot, clamped onto the board
    position: i64,
    /// Number of chips to drop (1-30)
    balls: u32,
    /// Payout preset (defaults to the server's)
    #[serde(default)]
    risk: Option<RiskLevel>,
}

#[derive(Debug, Serialize)]
struct DropsResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<DropReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct MultipliersResponse {
    risk: RiskLevel,
    slots: usize,
    multipliers: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct BalanceResponse {
    balance: f64,
}

#[derive(Debug, Deserialize)]
struct SyncBalanceRequest {
    balance: Option<f64>,
}

#[derive(Debug, Serialize)]
struct SyncBalanceResponse {
    success: bool,
    balance: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        success: false,
        error: message.into(),
    })
}

fn storage_failure(e: BalanceError) -> HttpResponse {
    tracing::error!("Balance storage failed: {}", e);
    HttpResponse::InternalServerError().json(ErrorResponse {
        success: false,
        error: e.to_string(),
    })
}

// API Handlers

/// GET /drop/{position}
/// Drop a single chip from the given slot
async fn drop_chip(
    state: web::Data<AppState>,
    position: web::Path<i64>,
    query: web::Query<RiskQuery>,
) -> impl Responder {
    let risk = match state.risk(query.risk.as_deref()) {
        Ok(risk) => risk,
        Err(e) => return bad_request(e),
    };
    let board = state.boards.get(risk);
    let start = board.clamp_start(position.into_inner());

    let result = board.drop_chip(start, &mut RandomBounces::new(rand::thread_rng()));
    tracing::info!(
        "Chip dropped from slot {} ({}): landed in slot {} for {}x",
        start,
        risk,
        result.slot,
        result.multiplier
    );

    HttpResponse::Ok().json(result)
}

/// POST /api/drops
/// Drop several chips from the same slot in one request
async fn drop_many(state: web::Data<AppState>, req: web::Json<DropsRequest>) -> impl Responder {
    let risk = req.risk.unwrap_or(state.default_risk);
    tracing::info!(
        "Received multi-drop request: {} balls from {} ({})",
        req.balls,
        req.position,
        risk
    );

    if let Err(e) = check_ball_count(req.balls) {
        return HttpResponse::BadRequest().json(DropsResponse {
            success: false,
            report: None,
            error: Some(e),
        });
    }

    let board = state.boards.get(risk);
    let start = board.clamp_start(req.position);
    let report = run_drops(
        board,
        risk,
        start,
        req.balls,
        &mut RandomBounces::new(rand::thread_rng()),
    );

    tracing::info!(
        "Dropped {} balls: average {:.3}x, best {}x",
        report.summary.balls,
        report.summary.average_multiplier,
        report.summary.best_multiplier
    );

    HttpResponse::Ok().json(DropsResponse {
        success: true,
        report: Some(report),
        error: None,
    })
}

/// GET /multipliers
/// Payout table for a risk level, leftmost slot first
async fn multipliers(state: web::Data<AppState>, query: web::Query<RiskQuery>) -> impl Responder {
    let risk = match state.risk(query.risk.as_deref()) {
        Ok(risk) => risk,
        Err(e) => return bad_request(e),
    };
    let board = state.boards.get(risk);

    HttpResponse::Ok().json(MultipliersResponse {
        risk,
        slots: board.slot_count(),
        multipliers: board.multipliers().to_vec(),
    })
}

/// GET /get_balance
async fn get_balance(state: web::Data<AppState>) -> impl Responder {
    match state.balance.load() {
        Ok(balance) => HttpResponse::Ok().json(BalanceResponse { balance }),
        Err(e) => storage_failure(e),
    }
}

/// POST /sync_balance
/// Persist the balance the client reports
async fn sync_balance(state: web::Data<AppState>, req: web::Json<SyncBalanceRequest>) -> impl Responder {
    let Some(balance) = req.balance else {
        tracing::warn!("Balance sync without a balance field");
        return bad_request("No balance provided");
    };

    match state.balance.store(balance) {
        Ok(balance) => HttpResponse::Ok().json(SyncBalanceResponse {
            success: true,
            balance,
        }),
        Err(e @ BalanceError::Invalid(_)) => {
            tracing::warn!("Rejected balance sync: {}", e);
            bad_request(e.to_string())
        }
        Err(e) => storage_failure(e),
    }
}

/// GET /health
/// Health check endpoint
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "plinko-api"
    }))
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = bad_request(err.to_string());
    error::InternalError::from_response(err, response).into()
}

fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    let response = bad_request(format!("Invalid position: {}", err));
    error::InternalError::from_response(err, response).into()
}

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(64 * 1024)
            .error_handler(json_error_handler),
    )
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .route("/health", web::get().to(health))
    .route("/drop/{position}", web::get().to(drop_chip))
    .route("/api/drops", web::post().to(drop_many))
    .route("/multipliers", web::get().to(multipliers))
    .route("/get_balance", web::get().to(get_balance))
    .route("/sync_balance", web::post().to(sync_balance));
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Plinko API Server");

    let settings = ServerSettings::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let boards = load_boards().map_err(|e| {
        tracing::error!("Invalid payout configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })?;

    tracing::info!(
        "Default risk level: {}, balance file: {}",
        settings.default_risk,
        settings.balance_file.display()
    );

    let state = web::Data::new(AppState {
        boards,
        default_risk: settings.default_risk,
        balance: BalanceStore::new(settings.balance_file.clone()),
    });

    tracing::info!("Binding to {}", settings.bind_address);

    HttpServer::new(move || {
        // Configure CORS to allow all origins
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(86400);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(settings.bind_address.as_str())?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use std::path::PathBuf;

    fn test_state(name: &str) -> (web::Data<AppState>, PathBuf) {
        let dir = std::env::temp_dir().join(format!("plinko-api-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("balance.txt");
        let state = web::Data::new(AppState {
            boards: Boards::standard().unwrap(),
            default_risk: RiskLevel::Classic,
            balance: BalanceStore::new(path.clone()),
        });
        (state, path)
    }

    macro_rules! service {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn test_drop_returns_full_path() {
        let (state, _) = test_state("drop");
        let app = service!(state);

        let req = test::TestRequest::get().uri("/drop/4").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let path = body["path"].as_array().unwrap();
        assert_eq!(path.len(), 13);
        assert_eq!(path[0]["column"], 4);
        assert_eq!(path[0]["row"], 0);
        for (row, pos) in path.iter().enumerate() {
            assert_eq!(pos["row"], row as u64);
        }

        let slot = body["slot"].as_u64().unwrap() as usize;
        assert!(slot < 9);
        assert_eq!(body["multiplier"].as_f64().unwrap(), plinko_core::CLASSIC_MULTIPLIERS[slot]);
    }

    #[actix_web::test]
    async fn test_drop_clamps_position() {
        let (state, _) = test_state("clamp");
        let app = service!(state);

        let req = test::TestRequest::get().uri("/drop/42").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["path"][0]["column"], 8);

        let req = test::TestRequest::get().uri("/drop/-3").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["path"][0]["column"], 0);

        let req = test::TestRequest::get().uri("/drop/42?risk=high").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["path"][0]["column"], 10);
    }

    #[actix_web::test]
    async fn test_drop_rejects_bad_input() {
        let (state, _) = test_state("bad-drop");
        let app = service!(state);

        let req = test::TestRequest::get().uri("/drop/left").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/drop/3?risk=extreme").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_multipliers_per_risk() {
        let (state, _) = test_state("multipliers");
        let app = service!(state);

        let req = test::TestRequest::get().uri("/multipliers").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["risk"], "classic");
        assert_eq!(body["slots"], 9);

        let req = test::TestRequest::get().uri("/multipliers?risk=medium").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["risk"], "medium");
        assert_eq!(body["slots"], 11);
        assert_eq!(body["multipliers"][0], 200.0);
    }

    #[actix_web::test]
    async fn test_multi_drop() {
        let (state, _) = test_state("multi");
        let app = service!(state);

        let req = test::TestRequest::post()
            .uri("/api/drops")
            .set_json(serde_json::json!({ "position": 5, "balls": 10, "risk": "low" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["report"]["risk"], "low");
        assert_eq!(body["report"]["drops"].as_array().unwrap().len(), 10);
        assert_eq!(body["report"]["summary"]["balls"], 10);
        assert_eq!(body["report"]["summary"]["slot_counts"].as_array().unwrap().len(), 11);
    }

    #[actix_web::test]
    async fn test_multi_drop_ball_limit() {
        let (state, _) = test_state("multi-limit");
        let app = service!(state);

        let req = test::TestRequest::post()
            .uri("/api/drops")
            .set_json(serde_json::json!({ "position": 0, "balls": 31 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Maximum 30 balls allowed");
    }

    #[actix_web::test]
    async fn test_balance_sync_round_trip() {
        let (state, path) = test_state("balance");
        let app = service!(state);

        let req = test::TestRequest::get().uri("/get_balance").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["balance"], 0.0);

        let req = test::TestRequest::post()
            .uri("/sync_balance")
            .set_json(serde_json::json!({ "balance": 87.5 }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["balance"], 87.5);

        let req = test::TestRequest::get().uri("/get_balance").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["balance"], 87.5);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[actix_web::test]
    async fn test_balance_sync_requires_balance() {
        let (state, path) = test_state("balance-missing");
        let app = service!(state);

        let req = test::TestRequest::post()
            .uri("/sync_balance")
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "No balance provided");

        let req = test::TestRequest::post()
            .uri("/sync_balance")
            .set_json(serde_json::json!({ "balance": -10.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert!(!path.exists());
    }

    #[actix_web::test]
    async fn test_health() {
        let (state, _) = test_state("health");
        let app = service!(state);

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
    }
}
