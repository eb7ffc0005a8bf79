//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions come from the helper registry of the author's household profile.

use crate::{
    bot::{BotData, resolve_profile},
    core::helper::{self, Helper, HelperRole},
    errors::Error,
};

async fn matching_helper_names<F>(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
    keep: F,
) -> Vec<String>
where
    F: Fn(&Helper) -> bool,
{
    let db = &ctx.data().database;
    let profile = resolve_profile(ctx);

    let Ok(helpers) = helper::list_helpers(db, &profile).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();

    let mut matching: Vec<String> = helpers
        .into_iter()
        .filter(|h| keep(h) && h.name.to_lowercase().contains(&partial_lower))
        .map(|h| h.name)
        .take(25) // Discord autocomplete limit
        .collect();

    // Sort alphabetically for consistent UX
    matching.sort();
    matching
}

/// Suggests any registered helper.
pub async fn autocomplete_helper_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching_helper_names(ctx, partial, |_| true).await
}

/// Suggests helpers that earn a salary (everyone except milkmen).
pub async fn autocomplete_salaried_helper_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching_helper_names(ctx, partial, Helper::is_salaried).await
}

/// Suggests registered milkmen.
pub async fn autocomplete_milkman_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching_helper_names(ctx, partial, |h| h.role == HelperRole::Milkman).await
}
