use crate::api::{readiness, team, worker};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::{Result, anyhow};
use std::sync::Arc;

pub type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms.max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} requests per minute"))?;
    Ok(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: Arc<Limiter>) {
    cfg.service(
        web::scope(&format!("{api_prefix}/v1"))
            .wrap(limiter) // rate limiting
            .configure(v1),
    );
}

/// Engine routes, relative to `<prefix>/v1`.
pub fn v1(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/workers")
            // /workers/{id}/attendance
            .service(web::resource("/{id}/attendance").route(web::get().to(worker::attendance)))
            // /workers/{id}/performance
            .service(web::resource("/{id}/performance").route(web::get().to(worker::performance)))
            // /workers/{id}/streak
            .service(web::resource("/{id}/streak").route(web::get().to(worker::streak)))
            // /workers/{id}/streak/history
            .service(
                web::resource("/{id}/streak/history").route(web::get().to(worker::streak_history)),
            ),
    )
    .service(
        web::scope("/teams")
            // /teams/{id}/grade
            .service(web::resource("/{id}/grade").route(web::get().to(team::grade)))
            // /teams/{id}/anomalies
            .service(web::resource("/{id}/anomalies").route(web::get().to(team::anomalies))),
    )
    .service(
        web::scope("/readiness")
            // /readiness/evaluate
            .service(web::resource("/evaluate").route(web::post().to(readiness::evaluate))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_rejects_zero_rate() {
        assert!(build_limiter(600).is_ok());
        // faster than one request per millisecond still builds
        assert!(build_limiter(120_000).is_ok());
        assert!(build_limiter(0).is_err());
    }
}
