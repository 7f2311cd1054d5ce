// Entrypoint for the concierge client.
// - Keeps `main` small: set up logging, create an API client and hand it
//   to the UI loop.

use tracing_subscriber::EnvFilter;
use wine_concierge::{api::ApiClient, ui::main_menu};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never interleave with the menu.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // Backend origin comes from `CONCIERGE_API_URL` or defaults to
    // http://127.0.0.1:8000. See `config::Settings::from_env`.
    let api = ApiClient::from_env()?;

    main_menu(api).await?;
    Ok(())
}
