//! services/client/src/bin/alttrack.rs

use alttrack_core::domain::DayType;
use client_lib::{app::AppContext, config::Config, error::ClientError};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(
        api = %config.api_base_url,
        environment = config.environment.as_str(),
        "Configuration loaded. Starting client..."
    );

    // --- 2. Build the Stores ---
    let app = AppContext::build(config).await?;
    info!(theme = app.theme.current().as_str(), "Preferences restored");

    // --- 3. Report Session Status ---
    let Some(identity) = app.session.current_identity() else {
        info!("Not signed in.");
        return Ok(());
    };
    info!(
        username = %identity.username,
        environment = app.session.environment().as_str(),
        "Signed in"
    );

    if app.session.is_token_expired() {
        warn!("The stored access token has expired, please sign in again.");
        return Ok(());
    }

    // --- 4. Summarise Notebooks ---
    match app.notebooks.list().await {
        Ok(notebooks) if notebooks.is_empty() => info!("No notebooks yet."),
        Ok(notebooks) => {
            for notebook in &notebooks {
                info!(
                    name = %notebook.name,
                    zone = ?notebook.location_zone,
                    pattern = %notebook.week_pattern,
                    school_days = notebook.week_pattern.count(DayType::School),
                    company_days = notebook.week_pattern.count(DayType::Company),
                    "Notebook"
                );
            }
        }
        Err(e) => warn!(error = %e, "Could not load notebooks"),
    }

    Ok(())
}
