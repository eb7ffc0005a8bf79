//! Payment Discord commands - paying salaries and milk bills, reviewing payments.
//!
//! Without an explicit amount, payments default to what the month's statement
//! shows as outstanding.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, date_or_today, handlers::autocomplete, lookup_helper, month_or_current, reply_or_raise, resolve_profile},
        core::{
            helper,
            payment::{self, NewPayment, PaymentKind},
            report::{format_money, format_payment_line, payee_label},
            statement::{self, MilkBucketKey},
        },
        errors::{Error, Result},
    };
    use std::collections::HashMap;

    fn optional_date(date: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
        date.map(|d| date_or_today(Some(d))).transpose()
    }

    /// Pays a helper's salary for a month.
    #[poise::command(slash_command, prefix_command)]
    pub async fn pay_salary(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Helper to pay"]
        #[autocomplete = "autocomplete::autocomplete_salaried_helper_name"]
        helper: String,
        #[description = "Amount. Defaults to the outstanding salary."] amount: Option<f64>,
        #[description = "Month paid for, YYYY-MM. Defaults to this month."] month: Option<String>,
        #[description = "Optional note"] notes: Option<String>,
        #[description = "Payment date YYYY-MM-DD. Defaults to today."] date: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let (month, date) = match (month_or_current(month.as_deref()), optional_date(date.as_deref())) {
            (Ok(month), Ok(date)) => (month, date),
            (Err(e), _) | (_, Err(e)) => return reply_or_raise(ctx, e).await,
        };
        let payee = match lookup_helper(db, &profile, &helper).await {
            Ok(payee) => payee,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        let amount = match amount {
            Some(amount) => amount,
            None => {
                let statement = statement::load_monthly_statement(db, &profile, &month).await?;
                let outstanding = statement
                    .salary_line(&payee.id)
                    .map_or(0.0, |line| line.outstanding_salary);
                if outstanding <= 0.0 {
                    ctx.say(format!(
                        "ℹ️ Nothing outstanding for {} in {}.",
                        payee.name,
                        month.label()
                    ))
                    .await?;
                    return Ok(());
                }
                outstanding
            }
        };

        let new_payment = NewPayment {
            kind: PaymentKind::Salary,
            helper_id: Some(payee.id.clone()),
            month,
            amount,
            notes: notes.unwrap_or_default(),
            date,
        };

        match payment::record_payment(db, &profile, new_payment).await {
            Ok(paid) => {
                ctx.say(format!(
                    "✅ Paid {} salary of {} for {}. Id: `{}`",
                    payee.name,
                    format_money(paid.amount),
                    paid.month,
                    paid.id
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_or_raise(ctx, e).await,
        }
    }

    /// Pays a milk bill for a month, to a milkman or for general purchases.
    #[poise::command(slash_command, prefix_command)]
    pub async fn pay_milk(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Milkman (leave empty for general purchases)"]
        #[autocomplete = "autocomplete::autocomplete_milkman_name"]
        milkman: Option<String>,
        #[description = "Amount. Defaults to the outstanding bill."] amount: Option<f64>,
        #[description = "Month paid for, YYYY-MM. Defaults to this month."] month: Option<String>,
        #[description = "Optional note"] notes: Option<String>,
        #[description = "Payment date YYYY-MM-DD. Defaults to today."] date: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let (month, date) = match (month_or_current(month.as_deref()), optional_date(date.as_deref())) {
            (Ok(month), Ok(date)) => (month, date),
            (Err(e), _) | (_, Err(e)) => return reply_or_raise(ctx, e).await,
        };
        let milkman = match milkman {
            Some(name) => match lookup_helper(db, &profile, &name).await {
                Ok(found) => Some(found),
                Err(e) => return reply_or_raise(ctx, e).await,
            },
            None => None,
        };
        let bucket_key = MilkBucketKey::from_helper_id(milkman.as_ref().map(|m| m.id.as_str()));
        let payee = milkman.map_or_else(|| "general milk".to_string(), |m| m.name);

        let amount = match amount {
            Some(amount) => amount,
            None => {
                let statement = statement::load_monthly_statement(db, &profile, &month).await?;
                let outstanding = statement
                    .milk_bucket(&bucket_key)
                    .map_or(0.0, |bucket| bucket.outstanding);
                if outstanding <= 0.0 {
                    ctx.say(format!(
                        "ℹ️ No milk bill outstanding for {payee} in {}.",
                        month.label()
                    ))
                    .await?;
                    return Ok(());
                }
                outstanding
            }
        };

        let new_payment = NewPayment {
            kind: PaymentKind::Milk,
            helper_id: bucket_key.helper_id().map(str::to_string),
            month,
            amount,
            notes: notes.unwrap_or_default(),
            date,
        };

        match payment::record_payment(db, &profile, new_payment).await {
            Ok(paid) => {
                ctx.say(format!(
                    "✅ Paid {} to {payee} for {}. Id: `{}`",
                    format_money(paid.amount),
                    paid.month,
                    paid.id
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_or_raise(ctx, e).await,
        }
    }

    /// Removes a payment.
    #[poise::command(slash_command, prefix_command)]
    pub async fn payment_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Payment id (see /payments)"] id: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        if payment::delete_payment(db, &profile, id.trim()).await? {
            ctx.say(format!("✅ Deleted payment `{}`.", id.trim()))
                .await?;
            Ok(())
        } else {
            reply_or_raise(ctx, Error::EntryNotFound { id }).await
        }
    }

    /// Lists the payments attributed to a month, newest first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn payments(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month YYYY-MM. Defaults to this month."] month: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let profile = resolve_profile(ctx);

        let month = match month_or_current(month.as_deref()) {
            Ok(month) => month,
            Err(e) => return reply_or_raise(ctx, e).await,
        };

        let all_payments = payment::list_payments(db, &profile).await?;
        let in_month = statement::payments_in_month(&month, &all_payments);
        if in_month.is_empty() {
            ctx.say(format!("No payments recorded for {}.", month.label()))
                .await?;
            return Ok(());
        }

        let helpers = helper::list_helpers(db, &profile).await?;
        let names: HashMap<&str, &str> = helpers
            .iter()
            .map(|h| (h.id.as_str(), h.name.as_str()))
            .collect();

        let mut response = format!("**Payments - {}**\n", month.label());
        for paid in in_month.iter().take(30) {
            response.push_str(&format!(
                "`{}` {}\n",
                paid.id,
                format_payment_line(paid, payee_label(paid, &names))
            ));
        }
        let total: f64 = in_month.iter().map(|p| p.amount).sum();
        response.push_str(&format!("**Total:** {}", format_money(total)));

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
