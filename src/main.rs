use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use log::{LevelFilter, info};
use manada_api::AppConfig;

const SERVER_ADDRESS: &str = "0.0.0.0:8080";

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .init();

    let config = web::Data::new(AppConfig::new()?);

    info!("Server running at http://{SERVER_ADDRESS}");
    HttpServer::new(move || {
        App::new()
            .app_data(config.clone())
            .configure(manada_api::routes::configure)
    })
    .bind(SERVER_ADDRESS)?
    .run()
    .await?;

    Ok(())
}
