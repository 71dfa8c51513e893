//! Staff account Discord commands - add, change role, deactivate and list.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, open_session, reply_failure},
        core::{
            permissions::{MenuItem, Permission},
            user,
        },
        entities::sea_orm_active_enums::Role,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Staff accounts. Subcommands: add, role, deactivate, list.
    #[poise::command(
        slash_command,
        subcommands("user_add", "user_role", "user_deactivate", "user_list")
    )]
    pub async fn user(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "User command. Available subcommands:\n\
            `/user add` - Register a Discord member with a role\n\
            `/user role` - Change someone's role\n\
            `/user deactivate` - Block someone from the desk\n\
            `/user list` - Everyone registered";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Registers a Discord member.
    #[poise::command(slash_command, rename = "add")]
    pub async fn user_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Discord member"] member: serenity::User,
        #[description = "Role"]
        #[autocomplete = "autocomplete::autocomplete_role"]
        role: String,
        #[description = "Display name, defaults to the Discord name"] name: Option<String>,
    ) -> Result<()> {
        let Some(session) = open_session(ctx, MenuItem::Users).await? else {
            return Ok(());
        };
        if let Err(e) = session.require_permission(Permission::ManageUsers) {
            return reply_failure(ctx, e).await;
        }
        let role = match role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => return reply_failure(ctx, e).await,
        };

        let name = name.unwrap_or_else(|| member.name.clone());
        match user::create_user(&ctx.data().database, member.id.to_string(), name, role).await {
            Ok(created) => {
                ctx.say(format!("✅ {} registered as {}.", created.name, created.role))
                    .await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }

    /// Changes a registered member's role.
    #[poise::command(slash_command, rename = "role")]
    pub async fn user_role(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Discord member"] member: serenity::User,
        #[description = "New role"]
        #[autocomplete = "autocomplete::autocomplete_role"]
        role: String,
    ) -> Result<()> {
        let Some(session) = open_session(ctx, MenuItem::Users).await? else {
            return Ok(());
        };
        if let Err(e) = session.require_permission(Permission::ManageUsers) {
            return reply_failure(ctx, e).await;
        }
        let role = match role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => return reply_failure(ctx, e).await,
        };
        let discord_id = member.id.to_string();
        if discord_id == session.user().discord_id && role != session.role() {
            ctx.say("❌ You cannot change your own role.").await?;
            return Ok(());
        }

        match user::set_user_role(&ctx.data().database, &discord_id, role).await {
            Ok(updated) => {
                ctx.say(format!("✅ {} is now {}.", updated.name, updated.role))
                    .await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }

    /// Blocks a member from using the desk.
    #[poise::command(slash_command, rename = "deactivate")]
    pub async fn user_deactivate(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Discord member"] member: serenity::User,
    ) -> Result<()> {
        let Some(session) = open_session(ctx, MenuItem::Users).await? else {
            return Ok(());
        };
        if let Err(e) = session.require_permission(Permission::ManageUsers) {
            return reply_failure(ctx, e).await;
        }
        let discord_id = member.id.to_string();
        if discord_id == session.user().discord_id {
            ctx.say("❌ You cannot deactivate yourself.").await?;
            return Ok(());
        }

        match user::deactivate_user(&ctx.data().database, &discord_id).await {
            Ok(updated) => {
                ctx.say(format!("✅ {} can no longer use the desk.", updated.name))
                    .await?;
                Ok(())
            }
            Err(e) => reply_failure(ctx, e).await,
        }
    }

    /// Lists registered members with their roles.
    #[poise::command(slash_command, rename = "list")]
    pub async fn user_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if open_session(ctx, MenuItem::Users).await?.is_none() {
            return Ok(());
        }

        let users = user::list_users(&ctx.data().database).await?;
        let mut text = String::from("👥 **Users**\n");
        for u in &users {
            let marker = if u.is_active { "✅" } else { "⏸️" };
            writeln!(text, "{marker} {} - {} (<@{}>)", u.name, u.role, u.discord_id)?;
        }

        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
