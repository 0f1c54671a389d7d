use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;
use fabric_console::config::Settings;
use fabric_console::handler::notfound::not_found_handler;
use fabric_console::handler::routes;
use fabric_console::model::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    let state = AppState::new(&settings).context("failed to load the command catalogue")?;
    info!("{} command(s) available", state.catalogue.snapshot().len());
    let share_data = web::Data::new(state);

    info!("Started http server: {}:{}", settings.bind_addr, settings.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .app_data(share_data.clone())
            .configure(routes)
            .default_service(web::route().to(not_found_handler))
    })
    .bind((settings.bind_addr.as_str(), settings.port))?
    .run()
    .await?;
    Ok(())
}
