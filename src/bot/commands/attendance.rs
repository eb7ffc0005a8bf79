//! Attendance Discord commands - marking days and reviewing who was present.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, date_or_today, handlers::autocomplete, lookup_helper, month_or_current, reply_or_raise, resolve_profile},
        core::{
            attendance::{self, AttendanceStatus},
            helper,
            month,
            statement::{self, UNKNOWN_HELPER},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::collections::HashSet;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum AttendanceChoice {
        Present,
        Absent,
        Clear,
        Toggle,
    }

    /// Marks a helper present or absent for a day.
    ///
    /// `Toggle` cycles Not marked -> Present -> Absent -> Not marked.
    #[poise::command(slash_command, prefix_command)]
    pub async fn attendance(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Helper to mark"]
        #[autocomplete = "autocomplete::autocomplete_salaried_helper_name"]
        helper: String,
        #[description = "Present, Absent, Clear or Toggle"] status: AttendanceChoice,
        #[description = "Date YYYY-MM-DD. Defaults to today."] date: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let date = match date_or_today(date.as_deref()) {
            Ok(date) => date,
            Err(e) => return reply_or_raise(ctx, e).await,
        };
        let target = match lookup_helper(db, &profile, &helper).await {
            Ok(target) => target,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        let new_status = match status {
            AttendanceChoice::Toggle => {
                attendance::toggle_attendance(db, &profile, date, &target.id).await?
            }
            AttendanceChoice::Present => {
                attendance::set_attendance(db, &profile, date, &target.id, AttendanceStatus::Present).await?;
                AttendanceStatus::Present
            }
            AttendanceChoice::Absent => {
                attendance::set_attendance(db, &profile, date, &target.id, AttendanceStatus::Absent).await?;
                AttendanceStatus::Absent
            }
            AttendanceChoice::Clear => {
                attendance::set_attendance(db, &profile, date, &target.id, AttendanceStatus::Unset).await?;
                AttendanceStatus::Unset
            }
        };

        let icon = match new_status {
            AttendanceStatus::Present => "✅",
            AttendanceStatus::Absent => "🚫",
            AttendanceStatus::Unset => "ℹ️",
        };
        ctx.say(format!(
            "{icon} {} on {}: {new_status}",
            target.name,
            month::format_date(date)
        ))
        .await?;
        Ok(())
    }

    /// Shows every helper's mark for one day.
    #[poise::command(slash_command, prefix_command)]
    pub async fn attendance_day(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Date YYYY-MM-DD. Defaults to today."] date: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let date = match date_or_today(date.as_deref()) {
            Ok(date) => date,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        let helpers = helper::list_helpers(db, &profile).await?;
        let marks = attendance::attendance_for_date(db, &profile, date).await?;

        let mut lines: Vec<String> = helpers
            .iter()
            .filter(|h| h.is_salaried())
            .map(|h| {
                let status = marks.get(&h.id).copied().unwrap_or(AttendanceStatus::Unset);
                format!("• {}: {status}", h.name)
            })
            .collect();

        // Marks left behind by deleted helpers
        let known: HashSet<&str> = helpers.iter().map(|h| h.id.as_str()).collect();
        lines.extend(
            marks
                .iter()
                .filter(|(id, _)| !known.contains(id.as_str()))
                .map(|(_, status)| format!("• {UNKNOWN_HELPER}: {status}")),
        );

        if lines.is_empty() {
            ctx.say("No helpers to mark. Use `/helper add` to register one!")
                .await?;
            return Ok(());
        }

        let day_embed = serenity::CreateEmbed::default()
            .title(format!("Attendance for {}", month::format_date(date)))
            .description(lines.join("\n"))
            .color(0x0034_98DB); // Blue

        ctx.send(poise::CreateReply::default().embed(day_embed))
            .await?;
        Ok(())
    }

    /// Present and recorded days per helper for a month.
    #[poise::command(slash_command, prefix_command)]
    pub async fn attendance_summary(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month YYYY-MM. Defaults to this month."] month: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let month = match month_or_current(month.as_deref()) {
            Ok(month) => month,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        let statement = statement::load_monthly_statement(db, &profile, &month).await?;
        if statement.per_helper_salary.is_empty() {
            ctx.say(format!("No helpers with attendance for {}.", month.label()))
                .await?;
            return Ok(());
        }

        let embed_fields: Vec<(String, String, bool)> = statement
            .per_helper_salary
            .iter()
            .take(25) // Discord embed field limit
            .map(|line| {
                (
                    line.label().to_string(),
                    format!("Present {} of {} marked days", line.present_days, line.recorded_days),
                    true,
                )
            })
            .collect();

        let summary_embed = serenity::CreateEmbed::default()
            .title(format!("Attendance - {}", month.label()))
            .color(0x0034_98DB) // Blue
            .fields(embed_fields);

        ctx.send(poise::CreateReply::default().embed(summary_embed))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
