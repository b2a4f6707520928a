use std::sync::Arc;

use dotenvy::dotenv;
use gie_invest::api::{self, AppState};
use gie_invest::config::{self, Settings};
use gie_invest::errors::Result;
use gie_invest::gateway::notify::{FallbackNotifier, HttpNotifier, NoopNotifier};
use gie_invest::gateway::{Notifier, WaveClient};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load the application settings
    let settings = Settings::from_env()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    info!("Settings loaded.");

    // 4. Initialize database
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Build the external gateways
    let checkout = Arc::new(WaveClient::new(&settings)?);
    let notifier = build_notifier(&settings)?;

    // 6. Serve the API
    let state = AppState {
        db,
        checkout,
        notifier,
        settings: settings.clone(),
    };
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!("Listening on {}", settings.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Assembles the notification chain from whatever providers are configured:
/// WhatsApp first, SMS as fallback, or a logging no-op when neither is set.
fn build_notifier(settings: &Settings) -> Result<Arc<dyn Notifier>> {
    let whatsapp = settings
        .whatsapp_url
        .as_ref()
        .map(|url| HttpNotifier::new(url.clone(), "whatsapp", settings.provider_timeout))
        .transpose()?;
    let sms = settings
        .sms_url
        .as_ref()
        .map(|url| HttpNotifier::new(url.clone(), "sms", settings.provider_timeout))
        .transpose()?;

    Ok(match (whatsapp, sms) {
        (Some(primary), fallback) => Arc::new(FallbackNotifier::new(
            Box::new(primary),
            fallback.map(|n| Box::new(n) as Box<dyn Notifier>),
        )),
        (None, Some(only)) => Arc::new(only),
        (None, None) => Arc::new(NoopNotifier),
    })
}
