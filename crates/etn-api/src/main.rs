use etn_core::Config;

// Use mimalloc as the global allocator for lower fragmentation under many
// short-lived base64 buffers, especially on musl-based container images.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (identity, store, routes)
    let (_state, router) = etn_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    etn_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
