//! General Discord commands - ping, help, the caller's menu and inquiry links.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, open_session, parse_date, reply_failure},
        core::{
            messaging, package,
            permissions::{self, MenuItem},
            user::StaffSession,
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Travel Desk Help**\n\
        Commands are shown to everyone but only run for staff whose role opens the matching menu.\n\n\
        **Bookings**\n\
        • `/booking show|create|status|pay|refund|coupon` - Manage reservations.\n\
        • `/plan preview|create|show` - Installment and deposit plans.\n\
        • `/installment_pay <booking> <number> <method>` - Settle one installment.\n\
        • `/inquiry_link <package> <start> <end> <travellers>` - WhatsApp inquiry link.\n\n\
        **Operations**\n\
        • `/guides check|assign|status` - Guide availability and assignments.\n\
        • `/coupon check|create|list` - Discount coupons.\n\
        • `/dashboard` - Booking and payment overview.\n\n\
        **Administration**\n\
        • `/user add|role|list` - Staff accounts (super admin only).\n\
        • `/menu` - Shows what your role can open.\n\
        • `/ping` - Checks if the bot is responsive.\n\n\
        Dates are written as YYYY-MM-DD.";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists the menu sections your role can open.
    #[poise::command(slash_command, prefix_command)]
    pub async fn menu(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let discord_id = ctx.author().id.to_string();
        let session = match StaffSession::init(&ctx.data().database, &discord_id).await {
            Ok(session) => session,
            Err(e) => return reply_failure(ctx, e).await,
        };

        let role = session.role();
        let mut text = format!("**{}** ({role})\n", session.user().name);
        for item in session.menu() {
            writeln!(text, "• {}", item.label())?;
        }

        let capabilities = permissions::role_permissions(role).permissions;
        if !capabilities.is_empty() {
            let names: Vec<&str> = capabilities.iter().map(|p| p.as_str()).collect();
            write!(text, "\nCan: {}", names.join(", "))?;
        }

        ctx.say(text).await?;
        Ok(())
    }

    /// Builds a WhatsApp link a customer can use to ask about a package.
    #[poise::command(slash_command, prefix_command)]
    pub async fn inquiry_link(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Package to ask about"]
        #[autocomplete = "autocomplete::autocomplete_package_name"]
        package_name: String,
        #[description = "First travel day (YYYY-MM-DD)"] travel_start: String,
        #[description = "Last travel day (YYYY-MM-DD)"] travel_end: String,
        #[description = "Number of travellers"] participants: i32,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::Bookings).await?.is_none() {
            return Ok(());
        }

        let (start, end) = match (parse_date(&travel_start), parse_date(&travel_end)) {
            (Ok(start), Ok(end)) => (start, end),
            (Err(e), _) | (_, Err(e)) => return reply_failure(ctx, e).await,
        };

        let db = &ctx.data().database;
        let Some(pkg) = package::get_package_by_name(db, &package_name).await? else {
            ctx.say(format!("❌ Package '{package_name}' not found."))
                .await?;
            return Ok(());
        };

        let agency = &ctx.data().config.agency;
        let text = messaging::booking_inquiry_message(
            &agency.name,
            &pkg,
            start,
            end,
            participants,
            &agency.currency,
        );

        match messaging::whatsapp_link(&agency.whatsapp_number, &text) {
            Ok(link) => {
                ctx.say(format!("✅ Inquiry link for **{}**:\n{link}", pkg.name))
                    .await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
