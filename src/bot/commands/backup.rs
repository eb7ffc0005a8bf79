//! Data Discord commands - backing up, restoring and clearing a household's data.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, reply_or_raise, resolve_profile},
        core::{backup, month},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Sends a JSON backup of every ledger in your household profile.
    #[poise::command(slash_command, prefix_command)]
    pub async fn backup(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.defer_ephemeral().await?;

        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let payload = backup::export_profile(db, &profile).await?;
        let ledgers = payload.data.len();
        let attachment = serenity::CreateAttachment::bytes(
            payload.to_json()?.into_bytes(),
            backup::backup_file_name(month::today()),
        );

        ctx.send(
            poise::CreateReply::default()
                .content(format!("✅ Backup of {ledgers} ledger(s) for profile '{profile}'."))
                .attachment(attachment)
                .ephemeral(true),
        )
        .await?;

        tracing::info!(profile = %profile, ledgers, "Exported backup");
        Ok(())
    }

    /// Restores a backup file, replacing the ledgers it contains.
    #[poise::command(slash_command)]
    pub async fn restore(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Backup JSON file created by /backup"] file: serenity::Attachment,
    ) -> Result<()> {
        ctx.defer_ephemeral().await?;

        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let bytes = file.download().await?;
        let Ok(contents) = String::from_utf8(bytes) else {
            return reply_or_raise(
                ctx,
                Error::Validation {
                    message: format!("'{}' is not a text file", file.filename),
                },
            )
            .await;
        };

        let data = match backup::parse_backup(&contents) {
            Ok(data) => data,
            Err(Error::Serialization(e)) => {
                ctx.say(format!("❌ '{}' is not valid JSON: {e}", file.filename))
                    .await?;
                return Ok(());
            }
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        let restored = backup::restore_profile(db, &profile, &data).await?;
        ctx.say(format!(
            "✅ Restored {restored} ledger(s) into profile '{profile}'."
        ))
        .await?;
        Ok(())
    }

    /// Deletes every ledger in your household profile. Requires `confirm: true`.
    #[poise::command(slash_command, prefix_command)]
    pub async fn clear_data(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Set to true to permanently delete all data"] confirm: bool,
    ) -> Result<()> {
        let profile = resolve_profile(ctx);

        if !confirm {
            ctx.say("⚠️ Nothing deleted. Run `/clear_data confirm:true` to wipe all helpers, attendance, milk and payments. Take a `/backup` first!")
                .await?;
            return Ok(());
        }

        let db = &ctx.data().database;
        let removed = backup::clear_profile(db, &profile).await?;
        ctx.say(format!(
            "✅ Cleared {removed} ledger(s) from profile '{profile}'."
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
