use cordia_api::setup;
use cordia_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration first - fail fast on misconfiguration
    let config = Config::from_env()?;

    setup::init_tracing();

    // Initialize the application (database, state, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, router).await?;

    Ok(())
}
