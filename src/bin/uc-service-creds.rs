use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use databricks_apps::{
    config::{self, AuthMode, ServerConfig},
    ec2::{Ec2InstanceLister, InstanceLister},
    uc_viewer::{self, ViewerSettings},
    util,
    workspace::{WorkspaceApi, WorkspaceClient},
};
use log::info;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    config::load_env();
    util::init_logging();

    let server = ServerConfig::from_env()?;
    let api: Arc<dyn WorkspaceApi> = Arc::new(WorkspaceClient::new(AuthMode::from_env()?)?);
    let lister: Arc<dyn InstanceLister> = Arc::new(Ec2InstanceLister);
    let settings = ViewerSettings::from_env();

    info!(
        "Starting {} on {}:{}",
        uc_viewer::PAGE_TITLE,
        server.host,
        server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(Data::from(api.clone()))
            .app_data(Data::from(lister.clone()))
            .app_data(Data::new(settings.clone()))
            .configure(uc_viewer::configure_routes)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await?;

    Ok(())
}
