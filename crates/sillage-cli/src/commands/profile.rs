use anyhow::anyhow;
use sillage_api_models::ProfileUpdate;

use crate::cli::ProfileUpdateArgs;
use crate::client::{AppContext, CliError, CliResult, prompt_password};
use crate::output::{render_profile, render_subscription};

pub(crate) async fn handle_profile_show(ctx: &AppContext) -> CliResult<()> {
    ctx.require_session()?;
    let session = ctx.client.session();
    let refreshed = session.refresh_profile().await;
    // A rejected token clears the session during the refresh.
    ctx.require_session()?;
    let profile = refreshed
        .or_else(|| session.profile())
        .ok_or_else(|| CliError::failure(anyhow!("profile unavailable; try again later")))?;
    render_profile(&profile, ctx.output)
}

pub(crate) async fn handle_profile_update(
    ctx: &AppContext,
    args: ProfileUpdateArgs,
) -> CliResult<()> {
    ctx.require_session()?;
    let password = if args.change_password {
        let first = prompt_password("New password: ")?;
        let second = prompt_password("Repeat new password: ")?;
        if first != second {
            return Err(CliError::validation("passwords do not match"));
        }
        Some(first)
    } else {
        None
    };
    let update = ProfileUpdate {
        first_name: args.first_name,
        last_name: args.last_name,
        password,
    };

    let profile = ctx.client.session().update_profile(&update).await?;
    render_profile(&profile, ctx.output)
}

pub(crate) async fn handle_subscription(ctx: &AppContext) -> CliResult<()> {
    ctx.require_session()?;
    let status = ctx.client.session().subscription().await?;
    render_subscription(&status, ctx.output)
}
