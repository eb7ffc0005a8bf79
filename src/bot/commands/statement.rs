//! Report Discord commands - monthly statement, dashboard and statement export.
//!
//! Every command recomputes the statement from the stored ledgers.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, month_or_current, reply_or_raise, resolve_profile},
        core::{
            report,
            statement::{LedgerSnapshot, compute_monthly_statement, daily_milk_liters},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    // Longer statements are sent as a file rather than a code block
    const INLINE_LIMIT: usize = 1900;

    fn statement_file_name(month: &crate::core::month::MonthKey) -> String {
        format!("gharkhata-statement-{month}.txt")
    }

    /// Shows the monthly statement: salaries, milk bill and payment history.
    #[poise::command(slash_command, prefix_command)]
    pub async fn statement(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month YYYY-MM. Defaults to this month."] month: Option<String>,
    ) -> Result<()> {
        let month = match month_or_current(month.as_deref()) {
            Ok(month) => month,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        ctx.defer().await?;

        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let ledgers = LedgerSnapshot::load(db, &profile).await?;
        let computed = compute_monthly_statement(&month, &ledgers);
        let rendered = report::render_statement(&computed, &ledgers.helpers)?;

        if rendered.len() <= INLINE_LIMIT {
            ctx.say(format!("```\n{rendered}```")).await?;
        } else {
            let attachment =
                serenity::CreateAttachment::bytes(rendered.into_bytes(), statement_file_name(&month));
            ctx.send(
                poise::CreateReply::default()
                    .content(format!("Statement for {} is attached.", month.label()))
                    .attachment(attachment),
            )
            .await?;
        }
        Ok(())
    }

    /// Shows the month's headline numbers and milk delivered per day.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dashboard(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month YYYY-MM. Defaults to this month."] month: Option<String>,
    ) -> Result<()> {
        let month = match month_or_current(month.as_deref()) {
            Ok(month) => month,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let ledgers = LedgerSnapshot::load(db, &profile).await?;
        let computed = compute_monthly_statement(&month, &ledgers);
        let summary = computed.dashboard(ledgers.helpers.len());
        let daily = daily_milk_liters(&month, &ledgers.milk);

        let rendered = report::render_dashboard(&summary, &daily)?;
        let mut dashboard_embed = serenity::CreateEmbed::default()
            .title(format!("Dashboard - {}", month.label()))
            .description(format!("```\n{rendered}```"))
            .color(0x0034_98DB); // Blue

        if let Some(maids) = computed.maid_summary() {
            dashboard_embed =
                dashboard_embed.field("Maids", report::format_maid_summary(&maids), false);
        }

        ctx.send(poise::CreateReply::default().embed(dashboard_embed))
            .await?;
        Ok(())
    }

    /// Downloads the monthly statement as a text file.
    #[poise::command(slash_command, prefix_command)]
    pub async fn export_statement(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month YYYY-MM. Defaults to this month."] month: Option<String>,
    ) -> Result<()> {
        let month = match month_or_current(month.as_deref()) {
            Ok(month) => month,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        ctx.defer().await?;

        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let ledgers = LedgerSnapshot::load(db, &profile).await?;
        let computed = compute_monthly_statement(&month, &ledgers);
        let rendered = report::render_statement(&computed, &ledgers.helpers)?;

        let attachment =
            serenity::CreateAttachment::bytes(rendered.into_bytes(), statement_file_name(&month));
        ctx.send(
            poise::CreateReply::default()
                .content(format!("✅ Statement for {}.", month.label()))
                .attachment(attachment),
        )
        .await?;

        tracing::info!(profile = %profile, month = %month, "Exported statement");
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
