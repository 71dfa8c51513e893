//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggests booking numbers, package names, guide names and coupon codes from the
//! database, plus the fixed values of the closed enums, filtered by what the user has
//! typed so far.

use crate::{
    bot::BotData,
    core::{booking, coupon, guide, package},
    entities::sea_orm_active_enums::{
        AssignmentStatus, BookingStatus, Continent, CouponType, CustomerTier, PaymentMethod, Role,
    },
    errors::Error,
};
use sea_orm::Iterable;

/// Discord shows at most this many suggestions
const MAX_CHOICES: usize = 25;

/// Keeps the values containing `partial` (case-insensitive), capped at Discord's limit.
fn matching<I>(values: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let partial_lower = partial.to_lowercase();
    values
        .into_iter()
        .filter(|value| value.to_lowercase().contains(&partial_lower))
        .take(MAX_CHOICES)
        .collect()
}

/// Provides autocomplete suggestions for booking numbers, newest first.
pub async fn autocomplete_booking_number(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(bookings) = booking::list_bookings(&ctx.data().database, None).await else {
        return Vec::new();
    };

    matching(bookings.into_iter().map(|b| b.booking_number), partial)
}

/// Provides autocomplete suggestions for active package names.
pub async fn autocomplete_package_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(packages) = package::list_active_packages(&ctx.data().database).await else {
        return Vec::new();
    };

    matching(packages.into_iter().map(|p| p.name), partial)
}

/// Provides autocomplete suggestions for active guide names.
pub async fn autocomplete_guide_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(guides) = guide::list_active_guides(&ctx.data().database).await else {
        return Vec::new();
    };

    matching(guides.into_iter().map(|g| g.name), partial)
}

/// Provides autocomplete suggestions for active coupon codes.
pub async fn autocomplete_coupon_code(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(coupons) = coupon::list_coupons(&ctx.data().database).await else {
        return Vec::new();
    };

    matching(
        coupons.into_iter().filter(|c| c.is_active).map(|c| c.code),
        partial,
    )
}

/// Booking lifecycle states.
#[allow(clippy::unused_async)] // poise awaits every autocomplete callback
pub async fn autocomplete_booking_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(BookingStatus::iter().map(|s| s.to_string()), partial)
}

/// Assignment states.
#[allow(clippy::unused_async)]
pub async fn autocomplete_assignment_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(AssignmentStatus::iter().map(|s| s.to_string()), partial)
}

/// Payment methods.
#[allow(clippy::unused_async)]
pub async fn autocomplete_payment_method(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(PaymentMethod::iter().map(|m| m.to_string()), partial)
}

/// Staff and customer roles.
#[allow(clippy::unused_async)]
pub async fn autocomplete_role(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(Role::iter().map(|r| r.to_string()), partial)
}

/// Customer tiers.
#[allow(clippy::unused_async)]
pub async fn autocomplete_customer_tier(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(CustomerTier::iter().map(|t| t.to_string()), partial)
}

/// Coupon kinds.
#[allow(clippy::unused_async)]
pub async fn autocomplete_coupon_type(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(CouponType::iter().map(|t| t.to_string()), partial)
}

/// Continents.
#[allow(clippy::unused_async)]
pub async fn autocomplete_continent(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(Continent::iter().map(|c| c.to_string()), partial)
}

/// Plan options.
#[allow(clippy::unused_async)]
pub async fn autocomplete_plan_choice(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(
        ["installments", "deposit"].into_iter().map(String::from),
        partial,
    )
}
