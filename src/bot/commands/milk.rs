//! Milk Discord commands - recording deliveries and listing the month's entries.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, date_or_today, handlers::autocomplete, lookup_helper, month_or_current, reply_or_raise, resolve_profile},
        core::{
            helper,
            milk::{self, NewMilkEntry},
            month,
            report::{format_liters, format_money},
            statement::UNKNOWN_HELPER,
        },
        errors::{Error, Result},
    };
    use std::collections::HashMap;

    // Keeps the list within a single Discord message
    const MAX_LISTED_ENTRIES: usize = 30;

    /// Parent command for milk deliveries.
    #[poise::command(
        slash_command,
        subcommands("milk_add", "milk_edit", "milk_delete", "milk_list")
    )]
    pub async fn milk(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Milk command. Available subcommands:\n\
            `/milk add` - Record a delivery\n\
            `/milk edit` - Correct an entry\n\
            `/milk delete` - Remove an entry\n\
            `/milk list` - Show the month's entries";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Records a milk delivery.
    ///
    /// Without a price the milkman's default price per liter is used.
    #[poise::command(slash_command, rename = "add")]
    pub async fn milk_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Liters delivered"] liters: f64,
        #[description = "Milkman (leave empty for a general purchase)"]
        #[autocomplete = "autocomplete::autocomplete_milkman_name"]
        milkman: Option<String>,
        #[description = "Price per liter. Defaults to the milkman's price."] price: Option<f64>,
        #[description = "Date YYYY-MM-DD. Defaults to today."] date: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let date = match date_or_today(date.as_deref()) {
            Ok(date) => date,
            Err(e) => return reply_or_raise(ctx, e).await,
        };
        let milkman = match milkman {
            Some(name) => match lookup_helper(db, &profile, &name).await {
                Ok(found) => Some(found),
                Err(e) => return reply_or_raise(ctx, e).await,
            },
            None => None,
        };

        let new_entry = NewMilkEntry {
            date,
            helper_id: milkman.as_ref().map(|m| m.id.clone()),
            liters,
            price_per_liter: price,
        };

        match milk::add_milk_entry(db, &profile, new_entry).await {
            Ok(entry) => {
                let from = milkman.map_or_else(|| "general purchase".to_string(), |m| m.name);
                ctx.say(format!(
                    "✅ Recorded {} at {}/L ({from}) on {}. Cost: {}. Id: `{}`",
                    format_liters(entry.liters),
                    format_money(entry.price_per_liter),
                    entry.date,
                    format_money(entry.cost()),
                    entry.id
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_or_raise(ctx, e).await,
        }
    }

    /// Corrects a milk entry. Only the options given are changed.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn milk_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Entry id (see /milk list)"] id: String,
        #[description = "New liters"] liters: Option<f64>,
        #[description = "New price per liter"] price: Option<f64>,
        #[description = "New date YYYY-MM-DD"] date: Option<String>,
        #[description = "New milkman"]
        #[autocomplete = "autocomplete::autocomplete_milkman_name"]
        milkman: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let id = id.trim();
        let Some(mut entry) = milk::list_milk_entries(db, &profile)
            .await?
            .into_iter()
            .find(|e| e.id == id)
        else {
            return reply_or_raise(ctx, Error::EntryNotFound { id: id.to_string() }).await;
        };

        if let Some(date) = date {
            match month::parse_date(&date) {
                Ok(parsed) => entry.date = month::format_date(parsed),
                Err(e) => return reply_or_raise(ctx, e).await,
            }
        }
        if let Some(name) = milkman {
            match lookup_helper(db, &profile, &name).await {
                Ok(found) => entry.helper_id = Some(found.id),
                Err(e) => return reply_or_raise(ctx, e).await,
            }
        }
        if let Some(liters) = liters {
            entry.liters = liters;
        }
        if let Some(price) = price {
            entry.price_per_liter = price;
        }

        let summary = format!(
            "{} at {}/L on {}",
            format_liters(entry.liters),
            format_money(entry.price_per_liter),
            entry.date
        );
        match milk::update_milk_entry(db, &profile, entry).await {
            Ok(()) => {
                ctx.say(format!("✅ Updated milk entry `{id}`: {summary}."))
                    .await?;
                Ok(())
            }
            Err(e) => reply_or_raise(ctx, e).await,
        }
    }

    /// Removes a milk entry.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn milk_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Entry id (see /milk list)"] id: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        if milk::delete_milk_entry(db, &profile, id.trim()).await? {
            ctx.say(format!("✅ Deleted milk entry `{}`.", id.trim()))
                .await?;
            Ok(())
        } else {
            reply_or_raise(ctx, Error::EntryNotFound { id }).await
        }
    }

    /// Lists the month's milk entries, newest first.
    #[poise::command(slash_command, rename = "list")]
    pub async fn milk_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month YYYY-MM. Defaults to this month."] month: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let month = match month_or_current(month.as_deref()) {
            Ok(month) => month,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        let entries = milk::milk_entries_for_month(db, &profile, &month).await?;
        if entries.is_empty() {
            ctx.say(format!("No milk entries for {}.", month.label()))
                .await?;
            return Ok(());
        }

        let helpers = helper::list_helpers(db, &profile).await?;
        let names: HashMap<&str, &str> = helpers
            .iter()
            .map(|h| (h.id.as_str(), h.name.as_str()))
            .collect();

        let mut response = format!("**Milk - {}**\n", month.label());
        for entry in entries.iter().take(MAX_LISTED_ENTRIES) {
            let from = entry.helper_id.as_deref().map_or("General", |id| {
                names.get(id).copied().unwrap_or(UNKNOWN_HELPER)
            });
            response.push_str(&format!(
                "`{}` {} | {from} | {} x {} = {}\n",
                entry.id,
                entry.date,
                format_liters(entry.liters),
                format_money(entry.price_per_liter),
                format_money(entry.cost())
            ));
        }
        if entries.len() > MAX_LISTED_ENTRIES {
            response.push_str(&format!(
                "...and {} more. Use `/statement` for the full bill.",
                entries.len() - MAX_LISTED_ENTRIES
            ));
        }

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
