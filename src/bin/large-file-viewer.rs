use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use databricks_apps::{
    config::{self, ServerConfig, VolumeConfig},
    file_viewer::{self, FileViewerSettings},
    util,
};
use log::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    config::load_env();
    util::init_logging();

    let server = ServerConfig::from_env()?;
    let settings = FileViewerSettings {
        local_path: VolumeConfig::from_env().local_path,
    };

    info!(
        "Serving preview of {} on {}:{}",
        settings.local_path.display(),
        server.host,
        server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(Data::new(settings.clone()))
            .configure(file_viewer::configure_routes)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await?;

    Ok(())
}
