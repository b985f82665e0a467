use sillage_core::Registration;

use crate::cli::{LoginArgs, RegisterArgs};
use crate::client::{AppContext, CliError, CliResult, prompt_line, prompt_password};
use crate::output::{render_message, render_profile};

pub(crate) async fn handle_login(ctx: &AppContext, args: LoginArgs) -> CliResult<()> {
    let username = match args.username {
        Some(username) => username,
        None => prompt_line("Email: ")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };

    let profile = ctx.client.session().login(&username, &password).await?;
    render_profile(&profile, ctx.output)
}

pub(crate) async fn handle_register(ctx: &AppContext, args: RegisterArgs) -> CliResult<()> {
    let password = match args.password {
        Some(password) => password,
        None => {
            let first = prompt_password("Password: ")?;
            let second = prompt_password("Repeat password: ")?;
            if first != second {
                return Err(CliError::validation("passwords do not match"));
            }
            first
        }
    };
    let registration = Registration {
        email: args.email,
        password,
        first_name: args.first_name,
        last_name: args.last_name,
    };

    let profile = ctx.client.session().register(&registration).await?;
    render_profile(&profile, ctx.output)
}

pub(crate) async fn handle_logout(ctx: &AppContext) -> CliResult<()> {
    if !ctx.client.session().is_authenticated() {
        return render_message("already signed out", ctx.output);
    }
    ctx.client.logout().await;
    render_message("signed out", ctx.output)
}
