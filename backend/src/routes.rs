use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use dashmap::DashMap;
use log::{debug, error, info, warn};

use crate::error::ApiError;
use crate::inference::{PredictionStats, RiskModels};
use crate::models::{ApiResponse, HealthInput, RiskReport};

const WINDOW: Duration = Duration::from_secs(60);

/// Stale windows are swept once every this many checks.
const PRUNE_EVERY: u64 = 256;

/// Fixed one-minute window per client IP.
pub struct RateLimiter {
    windows: DashMap<String, (AtomicU32, Instant)>,
    limit: u32,
    checks: AtomicU64,
}

impl RateLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            checks: AtomicU64::new(0),
        }
    }

    /// Returns false once the caller has used up its window.
    pub fn allow(&self, request: &HttpRequest) -> bool {
        match request.peer_addr() {
            Some(addr) => self.allow_ip(&addr.ip().to_string(), Instant::now()),
            None => true,
        }
    }

    pub fn allow_ip(&self, client_ip: &str, now: Instant) -> bool {
        // Sweep before taking an entry: retain locks every shard.
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune(now);
        }

        let mut entry = self
            .windows
            .entry(client_ip.to_string())
            .or_insert_with(|| (AtomicU32::new(0), now));

        if now.duration_since(entry.1) > WINDOW {
            entry.0.store(0, Ordering::Relaxed);
            entry.1 = now;
        }

        let count = entry.0.fetch_add(1, Ordering::Relaxed);
        if count >= self.limit {
            warn!("Rate limit exceeded for {}", client_ip);
            return false;
        }
        true
    }

    /// Drops windows that expired before `now`. Returns how many were dropped.
    pub fn prune(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, (_, started)| now.duration_since(*started) <= WINDOW);
        let dropped = before.saturating_sub(self.windows.len());
        if dropped > 0 {
            debug!("Dropped {} expired rate-limit windows", dropped);
        }
        dropped
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

pub struct AppState {
    pub models: RiskModels,
    pub stats: PredictionStats,
    pub predict_limiter: RateLimiter,
    pub batch_limiter: RateLimiter,
}

impl AppState {
    pub fn new(models: RiskModels, rate_limit: u32, batch_rate_limit: u32) -> Self {
        Self {
            models,
            stats: PredictionStats::default(),
            predict_limiter: RateLimiter::new(rate_limit),
            batch_limiter: RateLimiter::new(batch_rate_limit),
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(1024 * 1024))
        .route("/predict", web::post().to(predict))
        .route("/api/batch-predict", web::post().to(batch_predict))
        .route("/api/health", web::get().to(health_check))
        .route("/api/model-info", web::get().to(model_info))
        .route("/api/stats", web::get().to(stats));
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<String>::error("Endpoint not found"))
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success("Health risk prediction API"))
}

async fn model_info(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(state.models.info()))
}

async fn stats(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(state.stats.snapshot()))
}

async fn predict(
    state: web::Data<AppState>,
    body: web::Json<HealthInput>,
    request: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let start_time = Instant::now();

    if !state.predict_limiter.allow(&request) {
        return Err(ApiError::RateLimited);
    }

    let features = body.into_inner().parse().map_err(|e| {
        warn!("Rejected prediction input: {}", e);
        e
    })?;

    let worker = state.clone();
    let outcome = web::block(move || worker.models.assess(&features))
        .await
        .map_err(|e| {
            error!("Blocking task failed: {}", e);
            ApiError::Blocking
        })
        .and_then(|result| result.map_err(ApiError::from));

    let elapsed = start_time.elapsed();
    state.stats.record(outcome.is_ok(), elapsed.as_micros() as u64);

    match outcome {
        Ok(report) => {
            info!(
                "Prediction served in {} ms: bp={}",
                elapsed.as_millis(),
                report.bp_category
            );
            Ok(HttpResponse::Ok().json(report))
        }
        Err(e) => {
            error!("Prediction failed: {}", e);
            Err(e)
        }
    }
}

async fn batch_predict(
    state: web::Data<AppState>,
    body: web::Json<Vec<HealthInput>>,
    request: HttpRequest,
) -> HttpResponse {
    let start_time = Instant::now();
    let elapsed_ms = |start: Instant| start.elapsed().as_millis() as u64;

    if !state.batch_limiter.allow(&request) {
        return HttpResponse::TooManyRequests().json(
            ApiResponse::<Vec<RiskReport>>::error("Rate limit exceeded").timed(elapsed_ms(start_time)),
        );
    }

    info!("Batch prediction request: {} patients", body.len());

    if body.is_empty() {
        return HttpResponse::BadRequest().json(
            ApiResponse::<Vec<RiskReport>>::error("Empty patient list").timed(elapsed_ms(start_time)),
        );
    }

    let mut patients = Vec::with_capacity(body.len());
    for (i, input) in body.iter().enumerate() {
        match input.parse() {
            Ok(features) => patients.push(features),
            Err(e) => {
                return HttpResponse::BadRequest().json(
                    ApiResponse::<Vec<RiskReport>>::error(&format!("Patient {}: {}", i + 1, e))
                        .timed(elapsed_ms(start_time)),
                );
            }
        }
    }

    let worker = state.clone();
    let outcome = web::block(move || {
        patients
            .iter()
            .map(|features| worker.models.assess(features))
            .collect::<anyhow::Result<Vec<_>>>()
    })
    .await;

    match outcome {
        Ok(Ok(reports)) => {
            state.stats.record(true, start_time.elapsed().as_micros() as u64);
            info!("Batch prediction served: {} reports", reports.len());
            HttpResponse::Ok().json(ApiResponse::success(reports).timed(elapsed_ms(start_time)))
        }
        Ok(Err(e)) => {
            state.stats.record(false, start_time.elapsed().as_micros() as u64);
            error!("Batch prediction failed: {}", e);
            HttpResponse::InternalServerError().json(
                ApiResponse::<Vec<RiskReport>>::error(&format!("Internal error: {}", e))
                    .timed(elapsed_ms(start_time)),
            )
        }
        Err(e) => {
            state.stats.record(false, start_time.elapsed().as_micros() as u64);
            error!("Blocking batch task failed: {}", e);
            HttpResponse::InternalServerError().json(
                ApiResponse::<Vec<RiskReport>>::error("Execution error").timed(elapsed_ms(start_time)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_counts_per_ip_and_reopens_after_the_window() {
        let limiter = RateLimiter::new(2);
        let t0 = Instant::now();

        assert!(limiter.allow_ip("10.0.0.1", t0));
        assert!(limiter.allow_ip("10.0.0.1", t0));
        assert!(!limiter.allow_ip("10.0.0.1", t0));
        assert!(limiter.allow_ip("10.0.0.2", t0));

        assert!(limiter.allow_ip("10.0.0.1", t0 + WINDOW + Duration::from_secs(1)));
    }

    #[test]
    fn prune_drops_only_expired_windows() {
        let limiter = RateLimiter::new(10);
        let t0 = Instant::now();
        limiter.allow_ip("10.0.0.1", t0);
        limiter.allow_ip("10.0.0.2", t0 + Duration::from_secs(30));
        assert_eq!(limiter.tracked_clients(), 2);

        assert_eq!(limiter.prune(t0 + Duration::from_secs(61)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
        assert!(limiter.windows.contains_key("10.0.0.2"));
    }

    #[test]
    fn expired_windows_are_swept_during_checks() {
        let limiter = RateLimiter::new(u32::MAX);
        let t0 = Instant::now();
        limiter.allow_ip("10.9.9.9", t0);

        let later = t0 + Duration::from_secs(120);
        for _ in 0..PRUNE_EVERY {
            limiter.allow_ip("10.0.0.1", later);
        }

        assert!(!limiter.windows.contains_key("10.9.9.9"));
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
