use dotenvy::dotenv;
use ghar_khata::{
    bot::{self, BotData},
    config::{database, settings},
    core::helper,
    errors::{Error, Result},
    store::ProfileId,
};
use std::env;
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

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load settings (config.toml is optional)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    info!(
        "Loaded settings; default profile is '{}'.",
        settings.default_profile
    );

    // 4. Connect and make sure the table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed helpers from config.toml into an empty default profile
    let default_profile = ProfileId::new(settings.default_profile.as_str());
    helper::seed_helpers(&db, &default_profile, &settings)
        .await
        .inspect(|seeded| info!("Seeded {seeded} helper(s) into '{default_profile}'."))
        .inspect_err(|e| error!("Failed to seed helpers: {}", e))?;

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(db, settings)).await
}
