//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the travel desk, including all
//! slash commands, autocomplete handlers, and bot context management. Every command
//! opens a [`StaffSession`] for the caller and checks menu access before acting.

/// Discord command implementations (bookings, plans, guides, coupons, users, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::agency::AgencyConfig,
    core::{permissions::MenuItem, user::StaffSession},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// This structure holds the database connection and the agency configuration.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Agency name, currency and payment policy
    pub config: Arc<AgencyConfig>,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(database: DatabaseConnection, config: Arc<AgencyConfig>) -> Self {
        Self { database, config }
    }
}

/// Poise context used by every command
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Opens a session for the caller and checks that it may open `item`.
///
/// Replies with the reason and returns `Ok(None)` when the caller is unknown or
/// lacks access; the command should then stop.
pub async fn open_session(ctx: Context<'_>, item: MenuItem) -> Result<Option<StaffSession>> {
    let discord_id = ctx.author().id.to_string();

    let session = match StaffSession::init(&ctx.data().database, &discord_id).await {
        Ok(session) => session,
        Err(Error::UserNotFound { .. }) => {
            ctx.say("❌ You are not registered as staff. Ask a super admin to run `/user add`.")
                .await?;
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    if let Err(denied) = session.require(item) {
        ctx.say(format!("❌ {denied}")).await?;
        return Ok(None);
    }

    Ok(Some(session))
}

/// Replies with a user-facing message for `error`.
///
/// Input and business rule failures are answered and swallowed; infrastructure
/// failures are answered generically and handed back so `on_error` logs them.
pub async fn reply_failure(ctx: Context<'_>, error: Error) -> Result<()> {
    match error {
        Error::Database(_) | Error::Framework(_) | Error::EnvVar(_) | Error::Config { .. } => {
            ctx.say("❌ Something went wrong on our side. Please try again later.")
                .await?;
            Err(error)
        }
        other => {
            ctx.say(format!("❌ {other}")).await?;
            Ok(())
        }
    }
}

/// Parses a `YYYY-MM-DD` command argument.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| Error::Validation {
        message: format!("'{input}' is not a date, expected YYYY-MM-DD"),
    })
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(command = %ctx.command().name, "Command failed: {error:?}");
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// All registered commands.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::menu(),
        commands::inquiry_link(),
        commands::booking(),
        commands::plan(),
        commands::installment_pay(),
        commands::guides(),
        commands::coupon(),
        commands::dashboard(),
        commands::user(),
    ]
}

/// Connects to Discord and serves commands until the client stops.
#[instrument(skip(token, database, config))]
pub async fn run_bot(
    token: String,
    database: DatabaseConnection,
    config: Arc<AgencyConfig>,
) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database, config))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
