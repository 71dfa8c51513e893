//! Payment plan Discord commands - preview, create and show plans, pay installments.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, commands::booking::find_or_reply, handlers::autocomplete, open_session,
            parse_date, reply_failure,
        },
        core::{
            installment::{self, PlanChoice},
            payment,
            permissions::MenuItem,
            report,
        },
        entities::sea_orm_active_enums::PaymentMethod,
        errors::{Error, Result},
    };
    use chrono::Utc;
    use std::fmt::Write;

    /// Payment plans. Subcommands: preview, create, show.
    #[poise::command(slash_command, subcommands("plan_preview", "plan_create", "plan_show"))]
    pub async fn plan(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Payment plan command. Available subcommands:\n\
            `/plan preview` - Compare installment and deposit options\n\
            `/plan create` - Store the chosen option as installments\n\
            `/plan show` - List a booking's installments";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows both payment options for a booking's outstanding amount.
    #[poise::command(slash_command, rename = "preview")]
    pub async fn plan_preview(
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

        let today = Utc::now().date_naive();
        let policy = &ctx.data().config.payment_policy;
        let outstanding = payment::outstanding(&found);
        let options = match installment::derive_plan(outstanding, found.travel_start, today, policy)
        {
            Ok(options) => options,
            Err(e) => return reply_failure(ctx, e).await,
        };
        let currency = found.currency.as_str();

        let mut text = format!(
            "**{}** - planning {} (departure {})\n\n",
            found.booking_number,
            report::format_amount(options.total_amount, currency),
            found.travel_start
        );

        let plan = &options.installments;
        writeln!(
            text,
            "**Installments:** {} × {} at {:.0}% interest",
            plan.number_of_payments,
            report::format_amount(plan.installment_amount, currency),
            plan.interest_rate * 100.0
        )?;
        let dates: Vec<String> = plan.due_dates.iter().map(ToString::to_string).collect();
        writeln!(text, "Due: {}", dates.join(", "))?;

        let deposit = &options.deposit;
        writeln!(
            text,
            "\n**Deposit:** {} now, balance {} due {}",
            report::format_amount(deposit.deposit_amount, currency),
            report::format_amount(deposit.balance_amount, currency),
            deposit.balance_due_date
        )?;
        if deposit.balance_due_date < today {
            writeln!(text, "⚠️ Departure is close; the balance would be due immediately.")?;
        }

        ctx.say(text).await?;
        Ok(())
    }

    /// Stores the chosen option as the booking's installments.
    #[poise::command(slash_command, rename = "create")]
    pub async fn plan_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Booking number"]
        #[autocomplete = "autocomplete::autocomplete_booking_number"]
        booking_number: String,
        #[description = "installments or deposit"]
        #[autocomplete = "autocomplete::autocomplete_plan_choice"]
        choice: String,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::Payments).await?.is_none() {
            return Ok(());
        }
        let choice = match choice.parse::<PlanChoice>() {
            Ok(choice) => choice,
            Err(e) => return reply_failure(ctx, e).await,
        };
        let Some(found) = find_or_reply(ctx, &booking_number).await? else {
            return Ok(());
        };

        let today = Utc::now().date_naive();
        let result = installment::create_installment_plan(
            &ctx.data().database,
            found.id,
            choice,
            &ctx.data().config.payment_policy,
            today,
        )
        .await;

        match result {
            Ok(created) => {
                let mut text = format!(
                    "✅ Plan stored for **{}** with {} payment(s):\n",
                    found.booking_number,
                    created.len()
                );
                for inst in &created {
                    writeln!(
                        text,
                        "{}",
                        report::format_installment_line(inst, inst.status, &found.currency)
                    )?;
                }
                ctx.say(text).await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }

    /// Lists a booking's installments with their current status.
    #[poise::command(slash_command, rename = "show")]
    pub async fn plan_show(
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

        let installments =
            installment::get_installments_for_booking(&ctx.data().database, found.id).await?;
        if installments.is_empty() {
            ctx.say(format!(
                "📋 **{}** has no payment plan yet. Use `/plan create`.",
                found.booking_number
            ))
            .await?;
            return Ok(());
        }

        let today = Utc::now().date_naive();
        let window = ctx.data().config.payment_policy.pending_window_days;
        let mut text = format!("📋 **{}** installments\n", found.booking_number);
        for inst in &installments {
            let status = payment::derive_installment_status(inst, today, window);
            writeln!(
                text,
                "{}",
                report::format_installment_line(inst, status, &found.currency)
            )?;
        }

        ctx.say(text).await?;
        Ok(())
    }

    /// Marks one installment of a booking as paid.
    #[poise::command(slash_command, prefix_command)]
    pub async fn installment_pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Booking number"]
        #[autocomplete = "autocomplete::autocomplete_booking_number"]
        booking_number: String,
        #[description = "Installment number (1, 2, ...)"] installment_number: i32,
        #[description = "How it was paid"]
        #[autocomplete = "autocomplete::autocomplete_payment_method"]
        method: String,
        #[description = "Payment day (YYYY-MM-DD), defaults to today"] paid_on: Option<String>,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::Payments).await?.is_none() {
            return Ok(());
        }
        let method = match method.parse::<PaymentMethod>() {
            Ok(method) => method,
            Err(e) => return reply_failure(ctx, e).await,
        };
        let paid_on = match paid_on.as_deref().map(parse_date).transpose() {
            Ok(date) => date.unwrap_or_else(|| Utc::now().date_naive()),
            Err(e) => return reply_failure(ctx, e).await,
        };
        let Some(found) = find_or_reply(ctx, &booking_number).await? else {
            return Ok(());
        };

        let db = &ctx.data().database;
        let installments = installment::get_installments_for_booking(db, found.id).await?;
        let Some(target) = installments
            .iter()
            .find(|inst| inst.installment_number == installment_number)
        else {
            ctx.say(format!(
                "❌ **{}** has no installment #{installment_number}.",
                found.booking_number
            ))
            .await?;
            return Ok(());
        };

        match installment::pay_installment(db, target.id, method, paid_on).await {
            Ok((paid, booking)) => {
                ctx.say(format!(
                    "✅ Installment #{} of **{}** paid by {method}. Booking is now {} ({} of {}).",
                    paid.installment_number,
                    booking.booking_number,
                    booking.payment_status,
                    report::format_amount(booking.paid_amount, &booking.currency),
                    report::format_amount(booking.total_amount, &booking.currency)
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
