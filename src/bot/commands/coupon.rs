//! Coupon Discord commands - check eligibility, create and list coupons.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, commands::booking::find_or_reply, handlers::autocomplete, open_session,
            parse_date, reply_failure,
        },
        core::{
            coupon::{self, CouponContext, NewCoupon},
            package,
            permissions::MenuItem,
            report,
        },
        entities::sea_orm_active_enums::{Continent, CouponType},
        errors::{Error, Result},
    };
    use chrono::Utc;
    use std::fmt::Write;

    /// Discount coupons. Subcommands: check, create, list.
    #[poise::command(slash_command, subcommands("coupon_check", "coupon_create", "coupon_list"))]
    pub async fn coupon(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Coupon command. Available subcommands:\n\
            `/coupon check` - Would a coupon apply to a booking\n\
            `/coupon create` - Add a new coupon\n\
            `/coupon list` - All coupons with their usage";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Checks whether a coupon applies to a booking without redeeming it.
    #[poise::command(slash_command, rename = "check")]
    pub async fn coupon_check(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Coupon code"]
        #[autocomplete = "autocomplete::autocomplete_coupon_code"]
        code: String,
        #[description = "Booking number"]
        #[autocomplete = "autocomplete::autocomplete_booking_number"]
        booking_number: String,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::Coupons).await?.is_none() {
            return Ok(());
        }
        let db = &ctx.data().database;
        let Some(found_coupon) = coupon::get_coupon_by_code(db, &code).await? else {
            ctx.say(format!("❌ Coupon '{code}' not found.")).await?;
            return Ok(());
        };
        let Some(found) = find_or_reply(ctx, &booking_number).await? else {
            return Ok(());
        };
        let Some(pkg) = package::get_package_by_id(db, found.package_id).await? else {
            ctx.say(format!("❌ Package #{} not found.", found.package_id))
                .await?;
            return Ok(());
        };

        let context = CouponContext {
            amount: found.total_amount,
            package_id: pkg.id,
            continent: pkg.continent,
            tier: found.customer_tier,
            participants: found.participants,
        };
        let usage = coupon::usage(&found_coupon);
        let usage_text = usage.limit.map_or_else(
            || format!("used {} times, no limit", usage.used),
            |limit| format!("used {} of {limit}", usage.used),
        );

        let today = Utc::now().date_naive();
        let text = match coupon::validate_coupon(&found_coupon, &context, today) {
            Ok(discount) => format!(
                "✅ **{}** applies to **{}**: -{}, total would be {} ({usage_text}).",
                found_coupon.code,
                found.booking_number,
                report::format_amount(discount, &found.currency),
                report::format_amount(found.total_amount - discount, &found.currency)
            ),
            Err(reason) => format!(
                "❌ **{}** does not apply to **{}**: {reason} ({usage_text}).",
                found_coupon.code, found.booking_number
            ),
        };

        ctx.say(text).await?;
        Ok(())
    }

    /// Creates a coupon.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, rename = "create")]
    pub async fn coupon_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Code customers type in"] code: String,
        #[description = "percentage, fixed, bogo or free_shipping"]
        #[autocomplete = "autocomplete::autocomplete_coupon_type"]
        coupon_type: String,
        #[description = "Percent or amount off"] value: f64,
        #[description = "First valid day (YYYY-MM-DD)"] valid_from: String,
        #[description = "Last valid day (YYYY-MM-DD)"] valid_until: String,
        #[description = "Maximum redemptions"] usage_limit: Option<i32>,
        #[description = "Minimum booking amount"] min_amount: Option<f64>,
        #[description = "Only tours on this continent"]
        #[autocomplete = "autocomplete::autocomplete_continent"]
        continent: Option<String>,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::Coupons).await?.is_none() {
            return Ok(());
        }

        let parsed = coupon_type.parse::<CouponType>().and_then(|kind| {
            let from = parse_date(&valid_from)?;
            let until = parse_date(&valid_until)?;
            let continents = continent
                .as_deref()
                .map(str::parse::<Continent>)
                .transpose()?
                .into_iter()
                .collect::<Vec<_>>();
            Ok((kind, from, until, continents))
        });
        let (kind, from, until, continents) = match parsed {
            Ok(values) => values,
            Err(e) => return reply_failure(ctx, e).await,
        };

        let mut new = NewCoupon::new(&code, kind, value, from, until);
        new.usage_limit = usage_limit;
        new.min_amount = min_amount;
        new.applicable_continents = continents;

        match coupon::create_coupon(&ctx.data().database, new).await {
            Ok(created) => {
                ctx.say(format!(
                    "✅ Coupon **{}** ({} {}) valid {} to {}.",
                    created.code,
                    created.coupon_type,
                    created.value,
                    created.valid_from,
                    created.valid_until
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }

    /// Lists every coupon with its validity and usage.
    #[poise::command(slash_command, rename = "list")]
    pub async fn coupon_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if open_session(ctx, MenuItem::Coupons).await?.is_none() {
            return Ok(());
        }

        let coupons = coupon::list_coupons(&ctx.data().database).await?;
        if coupons.is_empty() {
            ctx.say("No coupons yet. Use `/coupon create`.").await?;
            return Ok(());
        }

        let mut text = String::from("🏷️ **Coupons**\n");
        for c in &coupons {
            let usage = coupon::usage(c);
            let remaining = usage
                .remaining
                .map_or_else(|| "unlimited".to_string(), |left| format!("{left} left"));
            let marker = if c.is_active { "✅" } else { "⏸️" };
            writeln!(
                text,
                "{marker} **{}** {} {} | {} to {} | {remaining}",
                c.code, c.coupon_type, c.value, c.valid_from, c.valid_until
            )?;
        }

        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
