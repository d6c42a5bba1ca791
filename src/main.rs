mod cache;
mod errors;
mod handlers;
mod initialization;
mod logging;
mod manager_annotations;
mod manager_production;
mod manager_solar;
mod manager_summary;
mod models;
mod registry;
mod serialize_timestamp;

use actix_web::{middleware, web, App, HttpServer};
use actix_files::Files;
use log::info;
use crate::errors::UnrecoverableError;
use crate::handlers::{get_irradiance, get_performance, get_states, post_annotation};
use crate::initialization::{config, Config};
use crate::manager_annotations::AnnotationStore;
use crate::registry::Registry;

struct AppState {
    config: Config,
    registry: Registry,
    annotations: AnnotationStore,
}

#[actix_web::main]
async fn main() -> Result<(), UnrecoverableError> {
    logging::setup_logger();

    let config = config()?;
    let registry = Registry::from_config(&config.registry)?;
    info!(
        "registry loaded: {} plants, {} inverters, {} states",
        registry.plants.len(),
        registry.inverters.len(),
        registry.states.len()
    );

    let annotations = AnnotationStore::from_config(&config.annotations);
    if let AnnotationStore::Unconfigured(reason) = &annotations {
        log::warn!("annotation store not configured: {}", reason);
    }

    let static_dir = config.files.static_dir.clone();
    let web_data = web::Data::new(AppState { config: config.clone(), registry, annotations });

    info!("starting web server");
    HttpServer::new(move || {
        App::new()
            .app_data(web_data.clone())
            .service(get_irradiance)
            .service(get_performance)
            .service(get_states)
            .service(post_annotation)
            .service(
                web::scope("")
                    .wrap(middleware::DefaultHeaders::new().add(("Cache-Control", "no-cache")))
                    .service(Files::new("/", static_dir.as_str()).index_file("index.html"))
            )
    })
        .bind((config.web_server.bind_address.as_str(), config.web_server.bind_port))?
        .disable_signals()
        .run()
        .await?;

    Ok(())
}
