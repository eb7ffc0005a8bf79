//! Helper Discord commands - `helper` (add, list, edit, delete) and `milkman_add`.
//!
//! These commands manage the household's helper registry. Deleting a helper
//! keeps its attendance, milk and payment history.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, date_or_today, handlers::autocomplete, lookup_helper, reply_or_raise, resolve_profile},
        core::{
            helper::{self, Helper, HelperRole, HelperUpdate, NewHelper, PaymentType},
            report::format_money,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum RoleChoice {
        Maid,
        Milkman,
        Other,
    }

    impl From<RoleChoice> for HelperRole {
        fn from(choice: RoleChoice) -> Self {
            match choice {
                RoleChoice::Maid => Self::Maid,
                RoleChoice::Milkman => Self::Milkman,
                RoleChoice::Other => Self::Other,
            }
        }
    }

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum PaymentTypeChoice {
        Monthly,
        Daily,
    }

    impl From<PaymentTypeChoice> for PaymentType {
        fn from(choice: PaymentTypeChoice) -> Self {
            match choice {
                PaymentTypeChoice::Monthly => Self::Monthly,
                PaymentTypeChoice::Daily => Self::Daily,
            }
        }
    }

    fn describe_pay(helper: &Helper) -> String {
        match (helper.role, helper.payment_type) {
            (HelperRole::Milkman, _) => {
                format!("Milk at {} / L", format_money(helper.default_price_per_liter))
            }
            (_, PaymentType::Monthly) => format!("{} / month", format_money(helper.monthly_salary)),
            (_, PaymentType::Daily) => format!("{} / day", format_money(helper.monthly_salary)),
        }
    }

    /// Parent command for managing household helpers.
    #[poise::command(
        slash_command,
        subcommands("helper_add", "helper_list", "helper_edit", "helper_delete")
    )]
    pub async fn helper(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Helper management command. Available subcommands:\n\
            `/helper add` - Register a maid, milkman or other helper\n\
            `/helper list` - List registered helpers\n\
            `/helper edit` - Change a helper's details\n\
            `/helper delete` - Remove a helper (history is kept)";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Registers a new helper.
    ///
    /// For daily-paid helpers the salary is the rate per present day.
    #[poise::command(slash_command, rename = "add")]
    pub async fn helper_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Helper's name"] name: String,
        #[description = "What the helper does"] role: RoleChoice,
        #[description = "Monthly salary, or rate per day for daily helpers"] salary: Option<f64>,
        #[description = "Monthly (pro-rated by attendance) or Daily. Defaults to Monthly."]
        payment_type: Option<PaymentTypeChoice>,
        #[description = "Default milk price per liter (milkmen)"] price_per_liter: Option<f64>,
        #[description = "Start date YYYY-MM-DD. Defaults to today."] start_date: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let start_date = match date_or_today(start_date.as_deref()) {
            Ok(date) => date,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        let new_helper = NewHelper {
            name,
            role: role.into(),
            monthly_salary: salary.unwrap_or(0.0),
            default_price_per_liter: price_per_liter.unwrap_or(0.0),
            payment_type: payment_type.map_or(PaymentType::Monthly, Into::into),
            start_date: Some(start_date),
        };

        match helper::create_helper(db, &profile, new_helper).await {
            Ok(created) => {
                ctx.say(format!(
                    "✅ Added {} '{}' ({}).",
                    created.role,
                    created.name,
                    describe_pay(&created)
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_or_raise(ctx, e).await,
        }
    }

    /// Lists all registered helpers.
    #[poise::command(slash_command, rename = "list")]
    pub async fn helper_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let helpers = helper::list_helpers(db, &profile).await?;
        if helpers.is_empty() {
            ctx.say("No helpers added yet. Use `/helper add` to register one!")
                .await?;
            return Ok(());
        }

        let embed_fields: Vec<(String, String, bool)> = helpers
            .iter()
            .take(25) // Discord embed field limit
            .map(|h| {
                let field_name = format!("{} ({})", h.name, h.role);
                let since = if h.start_date.is_empty() {
                    "-"
                } else {
                    h.start_date.as_str()
                };
                let field_value = format!("{}\nSince: {since}\nId: `{}`", describe_pay(h), h.id);
                (field_name, field_value, true)
            })
            .collect();

        let list_embed = serenity::CreateEmbed::default()
            .title("**Helpers**")
            .description(format!("Profile: {profile}"))
            .color(0x0058_65F2) // Discord purple
            .fields(embed_fields);

        ctx.send(poise::CreateReply::default().embed(list_embed))
            .await?;
        Ok(())
    }

    /// Changes a helper's details. Only the options given are changed.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn helper_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Helper to edit"]
        #[autocomplete = "autocomplete::autocomplete_helper_name"]
        name: String,
        #[description = "New name"] new_name: Option<String>,
        #[description = "New role"] role: Option<RoleChoice>,
        #[description = "New monthly salary or day rate"] salary: Option<f64>,
        #[description = "New payment type"] payment_type: Option<PaymentTypeChoice>,
        #[description = "New default milk price per liter"] price_per_liter: Option<f64>,
        #[description = "New start date YYYY-MM-DD"] start_date: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let start_date = match start_date.as_deref().map(crate::core::month::parse_date).transpose() {
            Ok(date) => date,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        let update = HelperUpdate {
            name: new_name,
            role: role.map(Into::into),
            monthly_salary: salary,
            default_price_per_liter: price_per_liter,
            payment_type: payment_type.map(Into::into),
            start_date,
        };
        if update.is_empty() {
            ctx.say("ℹ️ Nothing to change. Pass at least one option to update.")
                .await?;
            return Ok(());
        }

        let existing = match lookup_helper(db, &profile, &name).await {
            Ok(existing) => existing,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        match helper::update_helper(db, &profile, &existing.id, update).await {
            Ok(updated) => {
                ctx.say(format!(
                    "✅ Updated '{}': {} ({}).",
                    updated.name,
                    updated.role,
                    describe_pay(&updated)
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_or_raise(ctx, e).await,
        }
    }

    /// Removes a helper from the registry. Past attendance, milk and payments are kept.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn helper_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Helper to delete"]
        #[autocomplete = "autocomplete::autocomplete_helper_name"]
        name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let existing = match lookup_helper(db, &profile, &name).await {
            Ok(existing) => existing,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        if helper::delete_helper(db, &profile, &existing.id).await? {
            ctx.say(format!(
                "✅ Deleted helper '{}'. Their history now shows as 'Unknown'.",
                existing.name
            ))
            .await?;
        } else {
            ctx.say(format!("❌ Helper '{name}' was already removed."))
                .await?;
        }
        Ok(())
    }

    /// Quickly registers a milkman by name.
    #[poise::command(slash_command, prefix_command)]
    pub async fn milkman_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Milkman's name"] name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        match helper::quick_add_milkman(db, &profile, &name).await {
            Ok(Some(milkman)) => {
                ctx.say(format!(
                    "✅ Added milkman '{}'. Set a default price with `/helper edit`.",
                    milkman.name
                ))
                .await?;
                Ok(())
            }
            Ok(None) => {
                ctx.say("❌ Milkman name cannot be empty.").await?;
                Ok(())
            }
            Err(e) => reply_or_raise(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
