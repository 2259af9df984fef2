use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};

use storefront::config::Config;
use storefront::Services;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok(); // Load environment variables from .env file
    env_logger::init(); // RUST_LOG controls the level

    let config = Config::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    log::info!(
        "serving storefront from {} on {}",
        config.data_dir.display(),
        config.bind_addr
    );

    let services = Services::new(&config);

    HttpServer::new(move || {
        App::new()
            .wrap(services.session_middleware())
            .wrap(Logger::default())
            .configure(|cfg| services.configure(cfg))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
