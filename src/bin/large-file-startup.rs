use databricks_apps::{
    config::{self, VolumeConfig},
    startup, util,
};
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_env();
    util::init_logging();

    let volume = VolumeConfig::from_env();
    for line in startup::banner(&volume) {
        info!("{}", line);
    }

    startup::download_step(&volume).await;

    info!("Starting viewer application...");
    let status = startup::run_viewer(&startup::viewer_executable()?).await?;
    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }

    Ok(())
}
