use roost_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (telemetry, remote client, cache, routes)
    let (_state, router) = roost_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    roost_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
