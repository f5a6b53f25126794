use actix_web::{self, web::Data};
use env_logger::{Builder, Env};
use map_route::config::Config;
use map_route::directions::GoogleDirections;
use map_route::handlers::routes;
use map_route::session::Sessions;

fn init_logging() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = Config::from_env()?;
    let client = GoogleDirections::from_config(&config)?;
    let sessions = Sessions::from_config(&config);
    let bind_address = config.bind_address.clone();
    log::info!("routing to {} from {}", config.destination, bind_address);

    actix_web::HttpServer::new(move || {
        actix_web::App::new()
            .configure(routes::<GoogleDirections>)
            .app_data(Data::new(client.clone()))
            .app_data(Data::new(sessions.clone()))
            .app_data(Data::new(config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await?;
    Ok(())
}
