#![allow(clippy::result_large_err)]

use chrono::Utc;
use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use travel_desk::{
    bot,
    config::{agency, database, users},
    core::payment,
    errors::{Error, Result},
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Agency settings, payment policy and catalog seeds
    let config = Arc::new(
        agency::load_default_config()
            .inspect_err(|e| error!("Failed to load agency configuration: {}", e))?,
    );
    info!(agency = %config.agency.name, "Loaded agency configuration.");

    // 4. Database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed catalog and bootstrap the super admin
    agency::seed_catalog(&db, &config).await?;
    if users::ensure_super_admin(&db).await?.is_none() {
        info!("SUPER_ADMIN_DISCORD_ID not set; no super admin bootstrapped.");
    }

    // 6. Bring cached installment statuses up to date
    let today = Utc::now().date_naive();
    if let Some(run) =
        payment::reconcile_installment_statuses(&db, today, config.payment_policy.pending_window_days)
            .await?
    {
        info!(
            updated = run.updated,
            newly_overdue = run.newly_overdue,
            "Reconciled installment statuses."
        );
    }

    // 7. Run the bot
    // DISCORD_BOT_TOKEN is read directly before use and never stored
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, db, Arc::clone(&config)).await?;

    Ok(())
}
