//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**GharKhata Help**\n\
        Household ledger for helpers, attendance, milk and payments. \
        Months are `YYYY-MM` and default to this month; dates are `YYYY-MM-DD` and default to today.\n\n\
        **Helpers**\n\
        • `/helper add|list|edit|delete` - Manage maids, milkmen and other helpers.\n\
        • `/milkman_add <name>` - Quickly register a milkman.\n\n\
        **Attendance**\n\
        • `/attendance <helper> <status> [date]` - Mark present/absent, clear, or toggle.\n\
        • `/attendance_day [date]` - Show who was marked on a day.\n\
        • `/attendance_summary [month]` - Present/recorded days per helper.\n\n\
        **Milk**\n\
        • `/milk add|edit|delete|list` - Record deliveries and see the month's entries.\n\n\
        **Payments**\n\
        • `/pay_salary <helper> [amount] [month]` - Pay a salary (defaults to what is outstanding).\n\
        • `/pay_milk [milkman] [amount] [month]` - Pay a milk bill.\n\
        • `/payments [month]` and `/payment_delete <id>` - Review or remove payments.\n\n\
        **Reports**\n\
        • `/statement [month]` - Salary overview, milk bill and payment history.\n\
        • `/dashboard [month]` - Headline numbers and milk per day.\n\
        • `/export_statement [month]` - Download the statement as a text file.\n\n\
        **Data**\n\
        • `/backup`, `/restore <file>`, `/clear_data confirm:true` - Back up, restore or wipe your household's data.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
