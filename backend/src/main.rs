use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use log::{error, info};

use health_risk_api::{routes, AppState, RiskModels, ServerConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment still applies.
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("🚀 Starting health risk prediction API");

    let config = ServerConfig::from_env();

    let models = match RiskModels::load(&config) {
        Ok(models) => {
            info!("✅ Risk models loaded from {}", config.model_dir.display());
            models
        }
        Err(e) => {
            error!("❌ {:#}", e);
            return Err(e);
        }
    };

    let state = web::Data::new(AppState::new(models, config.rate_limit, config.batch_rate_limit));
    let bind_address = config.bind_address();

    info!("🌐 Listening on http://{}", bind_address);
    info!("👷 Workers: {}", config.workers);
    info!("🔧 Endpoints:");
    info!("   POST /predict            - Risk prediction for one patient");
    info!("   POST /api/batch-predict  - Risk prediction for many patients");
    info!("   GET  /api/health         - Liveness");
    info!("   GET  /api/model-info     - Model information");
    info!("   GET  /api/stats          - Prediction statistics");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(cors)
            .app_data(state.clone())
            .configure(routes::configure)
            .default_service(web::route().to(routes::not_found))
    })
    .workers(config.workers)
    .bind(&bind_address)
    .with_context(|| format!("cannot bind {}", bind_address))?
    .run()
    .await?;

    Ok(())
}
