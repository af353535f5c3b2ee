use actix_web::{HttpRequest, HttpResponse, Responder, http::header, web};
use chrono::Utc;
use log::{error, info};
use serde_json::json;

use crate::{
    assignment_scraper,
    config::AppConfig,
    deadline::{self, AssignmentDue},
    requests::RequestClient,
    shibboleth,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/assignments", web::get().to(assignments));
}

async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "message": "Use /assignments with Authorization header",
    }))
}

async fn assignments(req: HttpRequest, config: web::Data<AppConfig>) -> impl Responder {
    if !bearer_token_matches(&req, &config.api_key) {
        return HttpResponse::Unauthorized().json(json!({
            "detail": "Invalid or missing API key",
        }));
    }

    info!("Received assignments request, scraping portal");
    match scrape_due_assignments(&config).await {
        Ok(dues) => {
            info!("Returning {} assignment(s) due within a week", dues.len());
            HttpResponse::Ok().json(dues)
        }
        Err(e) => {
            error!("Assignment scrape failed: {e:?}");
            HttpResponse::InternalServerError().json(json!({
                "detail": e.to_string(),
            }))
        }
    }
}

// Exact-match check; the expected token never leaves the process.
fn bearer_token_matches(req: &HttpRequest, api_key: &str) -> bool {
    let expected = format!("Bearer {api_key}");
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == expected)
        .unwrap_or(false)
}

// The full pipeline: handshake, authenticated fetch, 7-day filter. A fresh
// RequestClient per run keeps handshake cookies from crossing requests.
async fn scrape_due_assignments(config: &AppConfig) -> anyhow::Result<Vec<AssignmentDue>> {
    let client = RequestClient::new()?;
    let cookie = shibboleth::authenticate(&client, config).await?;
    let assignments = assignment_scraper::fetch(&client, config, &cookie).await?;
    let now = Utc::now().with_timezone(&assignment_scraper::portal_offset());
    Ok(deadline::upcoming_within_week(assignments, now))
}
