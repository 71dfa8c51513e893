//! Dashboard Discord command - booking and payment overview.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, open_session},
        core::{payment, permissions::MenuItem, report},
        entities::sea_orm_active_enums::{BookingStatus, Continent, PaymentStatus},
        errors::{Error, Result},
    };
    use chrono::Utc;
    use sea_orm::Iterable;
    use std::fmt::Write;

    /// Shows booking counts, collections and outstanding balances.
    ///
    /// Refreshes the cached installment statuses first so overdue counts are current.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        use poise::serenity_prelude as serenity;

        if open_session(ctx, MenuItem::Dashboard).await?.is_none() {
            return Ok(());
        }

        let db = &ctx.data().database;
        let config = &ctx.data().config;
        let today = Utc::now().date_naive();

        let reconciled = payment::reconcile_installment_statuses(
            db,
            today,
            config.payment_policy.pending_window_days,
        )
        .await?;
        let summary = report::generate_booking_summary(db).await?;

        if summary.total_bookings == 0 {
            ctx.say("📊 No bookings yet. Record one with `/booking create`.")
                .await?;
            return Ok(());
        }

        let currency = config.agency.currency.as_str();

        let mut bookings_field = String::new();
        for status in BookingStatus::iter() {
            writeln!(bookings_field, "{status}: {}", summary.count_status(status))?;
        }

        let mut payments_field = String::new();
        for status in PaymentStatus::iter() {
            let count = summary.count_payment_status(status);
            if count > 0 {
                writeln!(payments_field, "{status}: {count}")?;
            }
        }

        let mut continents_field = String::new();
        for continent in Continent::iter() {
            if let Some(count) = summary.by_continent.get(&continent) {
                writeln!(continents_field, "{continent}: {count}")?;
            }
        }
        if continents_field.is_empty() {
            continents_field.push('-');
        }

        let mut money_field = String::new();
        writeln!(
            money_field,
            "Booked: {}",
            report::format_amount(summary.booked_value, currency)
        )?;
        writeln!(
            money_field,
            "Collected: {}",
            report::format_amount(summary.collected, currency)
        )?;
        writeln!(
            money_field,
            "Outstanding: {}",
            report::format_amount(summary.outstanding, currency)
        )?;
        write!(
            money_field,
            "{}",
            report::format_progress_bar(summary.collection_percent(), Some(10))
        )?;

        let mut embed = serenity::CreateEmbed::default()
            .title(format!("📊 {} Dashboard", config.agency.name))
            .description(format!("As of {today}"))
            .color(0x0034_98DB)
            .field("Bookings", bookings_field, true)
            .field("Payments", payments_field, true)
            .field("Continents", continents_field, true)
            .field("Money", money_field, false);

        if let Some(run) = reconciled {
            embed = embed.field(
                "Installments",
                format!(
                    "{} checked, {} updated, {} newly overdue",
                    run.examined, run.updated, run.newly_overdue
                ),
                false,
            );
        }

        let embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
            "Travel Desk v{} | {} booking{}",
            env!("CARGO_PKG_VERSION"),
            summary.total_bookings,
            if summary.total_bookings == 1 { "" } else { "s" }
        )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
