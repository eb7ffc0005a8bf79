//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the GharKhata household ledger,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (helpers, attendance, milk, payments, statements, backups)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::{settings::Settings, users},
    core::{
        helper::{self, Helper},
        month::{self, MonthKey},
    },
    errors::{Error, Result},
    store::ProfileId,
};
use chrono::NaiveDate;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;

/// Poise context used by every command
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Shared data available to all bot commands.
/// This structure holds the database connection and the loaded settings.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Settings loaded from config.toml
    pub settings: Settings,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(database: DatabaseConnection, settings: Settings) -> Self {
        Self { database, settings }
    }

    /// Profile a Discord user works in: their `HOUSEHOLD_PROFILE_n` mapping, or
    /// the configured default.
    #[must_use]
    pub fn profile_for(&self, user_id: &str) -> ProfileId {
        users::get_profile(user_id)
            .map_or_else(|| ProfileId::new(self.settings.default_profile.as_str()), ProfileId::new)
    }
}

/// Resolves the household profile of the command author.
#[must_use]
pub fn resolve_profile(ctx: Context<'_>) -> ProfileId {
    ctx.data().profile_for(&ctx.author().id.to_string())
}

/// Parses an optional `YYYY-MM` argument, defaulting to the current month.
pub fn month_or_current(month: Option<&str>) -> Result<MonthKey> {
    month.map_or_else(|| Ok(MonthKey::current()), MonthKey::parse)
}

/// Parses an optional `YYYY-MM-DD` argument, defaulting to today.
pub fn date_or_today(date: Option<&str>) -> Result<NaiveDate> {
    date.map_or_else(|| Ok(month::today()), month::parse_date)
}

/// Finds a helper by name (as offered by autocomplete) or by id.
pub async fn lookup_helper(
    db: &DatabaseConnection,
    profile: &ProfileId,
    name_or_id: &str,
) -> Result<Helper> {
    if let Some(helper) = helper::find_helper_by_name(db, profile, name_or_id).await? {
        return Ok(helper);
    }
    helper::find_helper(db, profile, name_or_id.trim())
        .await?
        .ok_or_else(|| Error::HelperNotFound {
            id: name_or_id.to_string(),
        })
}

/// Turns ledger validation errors into a user-facing reply, passing every other
/// error through to the framework error handler.
pub async fn reply_or_raise(ctx: Context<'_>, error: Error) -> Result<()> {
    let message = match &error {
        Error::Validation { message } => format!("❌ {message}"),
        Error::InvalidAmount { .. } => "❌ Invalid amount: must be a number greater than zero".to_string(),
        Error::InvalidMonth { month } => format!("❌ Invalid month '{month}'. Use YYYY-MM, e.g. 2024-05."),
        Error::InvalidDate { date } => format!("❌ Invalid date '{date}'. Use YYYY-MM-DD, e.g. 2024-05-20."),
        Error::HelperNotFound { id } => {
            format!("❌ Helper '{id}' not found. Use `/helper list` to see registered helpers.")
        }
        Error::EntryNotFound { id } => format!("❌ No entry with id '{id}'."),
        _ => return Err(error),
    };

    ctx.say(message).await?;
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            tracing::error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("❌ An error occurred: {error}")).await {
                tracing::error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Builds the poise framework, registers commands globally, and runs the
/// Discord client until it stops.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::helper(),
                commands::milkman_add(),
                commands::attendance(),
                commands::attendance_day(),
                commands::attendance_summary(),
                commands::milk(),
                commands::pay_salary(),
                commands::pay_milk(),
                commands::payment_delete(),
                commands::payments(),
                commands::statement(),
                commands::dashboard(),
                commands::export_statement(),
                commands::backup(),
                commands::restore(),
                commands::clear_data(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!("Logged in as {}", ready.user.name);
                tracing::info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    tracing::info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| tracing::error!("Error creating client: {e:?}"))?;

    tracing::info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| tracing::error!("Client error: {e:?}"))?;

    Ok(())
}

pub use commands::*;
pub use handlers::*;
