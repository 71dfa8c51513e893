//! Booking Discord commands - lookup, creation, lifecycle, payments and coupons.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, open_session, parse_date, reply_failure},
        core::{
            booking::{self, CustomerInfo, NewBooking},
            installment, package, payment,
            permissions::MenuItem,
            report,
        },
        entities::{
            booking as booking_entity,
            sea_orm_active_enums::{BookingStatus, CustomerTier},
        },
        errors::{Error, Result},
    };
    use chrono::Utc;
    use std::fmt::Write;

    /// Looks up a booking by number, replying when it does not exist.
    pub(crate) async fn find_or_reply(
        ctx: poise::Context<'_, BotData, Error>,
        booking_number: &str,
    ) -> Result<Option<booking_entity::Model>> {
        let found = booking::get_booking_by_number(&ctx.data().database, booking_number).await?;
        if found.is_none() {
            ctx.say(format!("❌ Booking '{booking_number}' not found."))
                .await?;
        }
        Ok(found)
    }

    /// Booking management. Subcommands: show, create, status, pay, refund, coupon.
    #[poise::command(
        slash_command,
        subcommands(
            "booking_show",
            "booking_create",
            "booking_status",
            "booking_pay",
            "booking_refund",
            "booking_coupon"
        )
    )]
    pub async fn booking(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Booking command. Available subcommands:\n\
            `/booking show` - Show a booking and its payments\n\
            `/booking create` - Record a new inquiry\n\
            `/booking status` - Confirm, complete or cancel\n\
            `/booking pay` - Record a payment outside a plan\n\
            `/booking refund` - Cancel and refund\n\
            `/booking coupon` - Apply a coupon before payment";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows a booking with its payment progress and installments.
    #[poise::command(slash_command, rename = "show")]
    pub async fn booking_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Booking number (e.g., BK-2024-0001)"]
        #[autocomplete = "autocomplete::autocomplete_booking_number"]
        booking_number: String,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::Bookings).await?.is_none() {
            return Ok(());
        }
        let Some(found) = find_or_reply(ctx, &booking_number).await? else {
            return Ok(());
        };

        let db = &ctx.data().database;
        let window = ctx.data().config.payment_policy.pending_window_days;
        let now = Utc::now();
        let installments = installment::get_installments_for_booking(db, found.id).await?;
        let package_name = package::get_package_by_id(db, found.package_id)
            .await?
            .map_or_else(|| format!("package #{}", found.package_id), |p| p.name);
        let currency = found.currency.as_str();

        let mut text = String::new();
        writeln!(text, "**{}** - {} ({})", found.booking_number, found.customer_name, found.customer_tier)?;
        writeln!(text, "Package: {package_name}")?;
        writeln!(
            text,
            "Travel: {} to {} | {} travellers",
            found.travel_start, found.travel_end, found.participants
        )?;
        writeln!(text, "Status: {} | Payment: {}", found.status, found.payment_status)?;
        if let Some(code) = &found.coupon_code {
            writeln!(text, "Coupon: {code}")?;
        }

        match payment::payment_summary(&found, &installments, now, window) {
            Ok(summary) => {
                writeln!(
                    text,
                    "Paid: {} of {} | Outstanding: {}",
                    report::format_amount(found.paid_amount, currency),
                    report::format_amount(found.total_amount, currency),
                    report::format_amount(summary.outstanding, currency)
                )?;
                writeln!(text, "{}", report::format_progress_bar(summary.progress_percent, Some(10)))?;
                if let (Some(next), Some(days)) = (&summary.next_due, summary.days_until_due) {
                    writeln!(
                        text,
                        "Next due: #{} on {} (in {days} days)",
                        next.installment_number, next.due_date
                    )?;
                }
                if !summary.overdue.is_empty() {
                    writeln!(text, "⚠️ {} installment(s) overdue", summary.overdue.len())?;
                }
            }
            Err(e) => writeln!(text, "Payment summary unavailable: {e}")?,
        }

        if !installments.is_empty() {
            writeln!(text, "\n**Installments**")?;
            let today = now.date_naive();
            for inst in &installments {
                let status = payment::derive_installment_status(inst, today, window);
                writeln!(text, "{}", report::format_installment_line(inst, status, currency))?;
            }
        }

        ctx.say(text).await?;
        Ok(())
    }

    /// Records a new booking inquiry.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, rename = "create")]
    pub async fn booking_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Package being booked"]
        #[autocomplete = "autocomplete::autocomplete_package_name"]
        package_name: String,
        #[description = "Customer full name"] customer_name: String,
        #[description = "Customer email"] email: String,
        #[description = "Customer phone"] phone: String,
        #[description = "First travel day (YYYY-MM-DD)"] travel_start: String,
        #[description = "Last travel day (YYYY-MM-DD)"] travel_end: String,
        #[description = "Number of travellers"] participants: i32,
        #[description = "Customer tier (defaults to normal)"]
        #[autocomplete = "autocomplete::autocomplete_customer_tier"]
        tier: Option<String>,
        #[description = "Agreed total, overriding price × travellers"] total: Option<f64>,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::Bookings).await?.is_none() {
            return Ok(());
        }

        let parsed = parse_date(&travel_start).and_then(|start| {
            let end = parse_date(&travel_end)?;
            let tier = tier
                .as_deref()
                .map_or(Ok(CustomerTier::Normal), str::parse::<CustomerTier>)?;
            Ok((start, end, tier))
        });
        let (start, end, tier) = match parsed {
            Ok(values) => values,
            Err(e) => return reply_failure(ctx, e).await,
        };

        let db = &ctx.data().database;
        let Some(pkg) = package::get_package_by_name(db, &package_name).await? else {
            ctx.say(format!("❌ Package '{package_name}' not found."))
                .await?;
            return Ok(());
        };

        let new = NewBooking {
            customer: CustomerInfo {
                id: email.trim().to_lowercase(),
                name: customer_name,
                email,
                phone,
                tier,
            },
            package_id: pkg.id,
            travel_start: start,
            travel_end: end,
            participants,
            total_override: total,
            currency: ctx.data().config.agency.currency.clone(),
        };

        match booking::create_booking(db, new).await {
            Ok(created) => {
                ctx.say(format!(
                    "✅ Booking **{}** created for {} on '{}' - total {}.",
                    created.booking_number,
                    created.customer_name,
                    pkg.name,
                    report::format_amount(created.total_amount, &created.currency)
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }

    /// Moves a booking to confirmed, completed or cancelled.
    #[poise::command(slash_command, rename = "status")]
    pub async fn booking_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Booking number"]
        #[autocomplete = "autocomplete::autocomplete_booking_number"]
        booking_number: String,
        #[description = "New status"]
        #[autocomplete = "autocomplete::autocomplete_booking_status"]
        status: String,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::Bookings).await?.is_none() {
            return Ok(());
        }
        let new_status = match status.parse::<BookingStatus>() {
            Ok(s) => s,
            Err(e) => return reply_failure(ctx, e).await,
        };
        let Some(found) = find_or_reply(ctx, &booking_number).await? else {
            return Ok(());
        };

        match booking::update_booking_status(&ctx.data().database, found.id, new_status).await {
            Ok(updated) => {
                ctx.say(format!(
                    "✅ Booking **{}** is now {}.",
                    updated.booking_number, updated.status
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }

    /// Records a payment that is not tied to an installment.
    #[poise::command(slash_command, rename = "pay")]
    pub async fn booking_pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Booking number"]
        #[autocomplete = "autocomplete::autocomplete_booking_number"]
        booking_number: String,
        #[description = "Amount received"] amount: f64,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::Payments).await?.is_none() {
            return Ok(());
        }
        let Some(found) = find_or_reply(ctx, &booking_number).await? else {
            return Ok(());
        };

        match booking::record_payment(&ctx.data().database, found.id, amount).await {
            Ok(updated) => {
                ctx.say(format!(
                    "✅ Recorded {} on **{}**. Paid {} of {} ({}).",
                    report::format_amount(amount, &updated.currency),
                    updated.booking_number,
                    report::format_amount(updated.paid_amount, &updated.currency),
                    report::format_amount(updated.total_amount, &updated.currency),
                    updated.payment_status
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }

    /// Cancels a booking and marks its payments refunded.
    #[poise::command(slash_command, rename = "refund")]
    pub async fn booking_refund(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Booking number"]
        #[autocomplete = "autocomplete::autocomplete_booking_number"]
        booking_number: String,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::Payments).await?.is_none() {
            return Ok(());
        }
        let Some(found) = find_or_reply(ctx, &booking_number).await? else {
            return Ok(());
        };

        match booking::refund_booking(&ctx.data().database, found.id).await {
            Ok(updated) => {
                ctx.say(format!(
                    "✅ Booking **{}** cancelled; {} marked for refund.",
                    updated.booking_number,
                    report::format_amount(updated.paid_amount, &updated.currency)
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }

    /// Applies a coupon to a booking that has no payments yet.
    #[poise::command(slash_command, rename = "coupon")]
    pub async fn booking_coupon(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Booking number"]
        #[autocomplete = "autocomplete::autocomplete_booking_number"]
        booking_number: String,
        #[description = "Coupon code"]
        #[autocomplete = "autocomplete::autocomplete_coupon_code"]
        code: String,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::Bookings).await?.is_none() {
            return Ok(());
        }
        let Some(found) = find_or_reply(ctx, &booking_number).await? else {
            return Ok(());
        };

        let today = Utc::now().date_naive();
        match booking::apply_coupon(&ctx.data().database, found.id, &code, today).await {
            Ok((updated, discount)) => {
                ctx.say(format!(
                    "✅ Coupon applied to **{}**: -{}, new total {}.",
                    updated.booking_number,
                    report::format_amount(discount, &updated.currency),
                    report::format_amount(updated.total_amount, &updated.currency)
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
