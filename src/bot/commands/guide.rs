//! Tour guide Discord commands - availability, assignments and itineraries.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData, commands::booking::find_or_reply, handlers::autocomplete, open_session,
            parse_date, reply_failure,
        },
        core::{
            guide::{self, NewAssignment},
            permissions::MenuItem,
            schedule::DateRange,
        },
        entities::sea_orm_active_enums::AssignmentStatus,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Tour guides. Subcommands: check, assign, status, itinerary.
    #[poise::command(
        slash_command,
        subcommands("guides_check", "guides_assign", "guides_status", "guides_itinerary")
    )]
    pub async fn guides(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Tour guide command. Available subcommands:\n\
            `/guides check` - Who is free for a date range\n\
            `/guides assign` - Put a guide on a booking's tour\n\
            `/guides status` - Start, complete or cancel an assignment\n\
            `/guides itinerary` - Add or show itinerary days";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists guides that are free or already booked between two dates.
    #[poise::command(slash_command, rename = "check")]
    pub async fn guides_check(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First tour day (YYYY-MM-DD)"] start: String,
        #[description = "Last tour day (YYYY-MM-DD)"] end: String,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::TourGuides).await?.is_none() {
            return Ok(());
        }
        let range = match parse_date(&start)
            .and_then(|start| DateRange::new(start, parse_date(&end)?))
        {
            Ok(range) => range,
            Err(e) => return reply_failure(ctx, e).await,
        };

        let report = guide::check_availability(&ctx.data().database, &range).await?;

        let mut text = format!(
            "🗓️ Guides for {} to {} ({} days)\n",
            range.start(),
            range.end(),
            range.days()
        );

        if report.available.is_empty() {
            writeln!(text, "\n**Available:** none")?;
        } else {
            writeln!(text, "\n**Available**")?;
            for free in &report.available {
                writeln!(text, "✅ {} ({})", free.name, guide::languages(free).join(", "))?;
            }
        }

        if !report.conflicts.is_empty() {
            writeln!(text, "\n**Booked**")?;
            for conflict in &report.conflicts {
                let tours: Vec<String> = conflict
                    .overlapping
                    .iter()
                    .map(|a| format!("{} {}..{}", a.destination, a.tour_start, a.tour_end))
                    .collect();
                writeln!(text, "⛔ {}: {}", conflict.guide.name, tours.join("; "))?;
            }
        }

        ctx.say(text).await?;
        Ok(())
    }

    /// Assigns a guide to a booking. Conflicts are reported but do not block.
    #[poise::command(slash_command, rename = "assign")]
    pub async fn guides_assign(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Guide name"]
        #[autocomplete = "autocomplete::autocomplete_guide_name"]
        guide_name: String,
        #[description = "Booking number"]
        #[autocomplete = "autocomplete::autocomplete_booking_number"]
        booking_number: String,
        #[description = "Destination"] destination: String,
        #[description = "First tour day, defaults to the booking's travel start"]
        start: Option<String>,
        #[description = "Last tour day, defaults to the booking's travel end"]
        end: Option<String>,
        #[description = "Group size, defaults to the booking's travellers"]
        group_size: Option<i32>,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::TourGuides).await?.is_none() {
            return Ok(());
        }
        let (start, end) = match (
            start.as_deref().map(parse_date).transpose(),
            end.as_deref().map(parse_date).transpose(),
        ) {
            (Ok(start), Ok(end)) => (start, end),
            (Err(e), _) | (_, Err(e)) => return reply_failure(ctx, e).await,
        };

        let db = &ctx.data().database;
        let Some(chosen) = guide::get_guide_by_name(db, &guide_name).await? else {
            ctx.say(format!("❌ Guide '{guide_name}' not found.")).await?;
            return Ok(());
        };
        let Some(found) = find_or_reply(ctx, &booking_number).await? else {
            return Ok(());
        };

        let new = NewAssignment {
            guide_id: chosen.id,
            booking_id: found.id,
            destination,
            tour_start: start.unwrap_or(found.travel_start),
            tour_end: end.unwrap_or(found.travel_end),
            group_size: group_size.unwrap_or(found.participants),
        };

        match guide::assign_guide(db, new).await {
            Ok(outcome) => {
                let assignment = &outcome.assignment;
                let mut text = format!(
                    "✅ {} assigned to **{}** ({}, {} to {}) as assignment #{}.",
                    chosen.name,
                    found.booking_number,
                    assignment.destination,
                    assignment.tour_start,
                    assignment.tour_end,
                    assignment.id
                );
                if !outcome.conflicts.is_empty() {
                    writeln!(text, "\n⚠️ Overlaps with:")?;
                    for other in &outcome.conflicts {
                        writeln!(
                            text,
                            "• #{} {} {} to {} ({})",
                            other.id, other.destination, other.tour_start, other.tour_end, other.status
                        )?;
                    }
                }
                ctx.say(text).await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }

    /// Moves an assignment to in progress, completed or cancelled.
    #[poise::command(slash_command, rename = "status")]
    pub async fn guides_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Assignment number"] assignment_id: i64,
        #[description = "New status"]
        #[autocomplete = "autocomplete::autocomplete_assignment_status"]
        status: String,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::TourGuides).await?.is_none() {
            return Ok(());
        }
        let new_status = match status.parse::<AssignmentStatus>() {
            Ok(s) => s,
            Err(e) => return reply_failure(ctx, e).await,
        };

        match guide::update_assignment_status(&ctx.data().database, assignment_id, new_status).await
        {
            Ok(updated) => {
                ctx.say(format!(
                    "✅ Assignment #{} ({}) is now {}.",
                    updated.id, updated.destination, updated.status
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }

    /// Shows an assignment's itinerary, or adds a day when title and activities are given.
    #[poise::command(slash_command, rename = "itinerary")]
    pub async fn guides_itinerary(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Assignment number"] assignment_id: i64,
        #[description = "Day to add (1 = first tour day)"] day_number: Option<i32>,
        #[description = "Day title"] title: Option<String>,
        #[description = "Planned activities"] activities: Option<String>,
    ) -> Result<()> {
        if open_session(ctx, MenuItem::TourGuides).await?.is_none() {
            return Ok(());
        }
        let db = &ctx.data().database;

        if let (Some(day_number), Some(title)) = (day_number, title) {
            let activities = activities.unwrap_or_default();
            match guide::add_itinerary_day(db, assignment_id, day_number, title, activities).await {
                Ok(day) => {
                    ctx.say(format!(
                        "✅ Day {} '{}' added to assignment #{assignment_id}.",
                        day.day_number, day.title
                    ))
                    .await?;
                }
                Err(e) => return reply_failure(ctx, e).await,
            }
            return Ok(());
        }

        let days = guide::get_itinerary(db, assignment_id).await?;
        if days.is_empty() {
            ctx.say(format!("📋 Assignment #{assignment_id} has no itinerary yet."))
                .await?;
            return Ok(());
        }

        let mut text = format!("📋 Itinerary for assignment #{assignment_id}\n");
        for day in &days {
            writeln!(text, "**Day {}** - {}", day.day_number, day.title)?;
            if !day.activities.is_empty() {
                writeln!(text, "{}", day.activities)?;
            }
        }

        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
