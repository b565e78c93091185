use std::io::{self, IsTerminal};

use agrovision_core::validation::{INVALID_EMAIL_MESSAGE, is_valid_email};
use agrovision_core::{AccountFlow, FlowOutcome, RegistrationForm, SessionStore};
use anyhow::anyhow;

use crate::cli::LoginArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_identity;

pub(crate) async fn handle_login(ctx: &AppContext, args: LoginArgs) -> CliResult<()> {
    let LoginArgs {
        email,
        password,
        first_name,
        last_name,
        phone,
    } = args;
    if !is_valid_email(email.trim()) {
        return Err(CliError::validation(INVALID_EMAIL_MESSAGE));
    }
    let password = resolve_password(password.as_deref())?;
    let flow = AccountFlow::new(ctx.remote(), SessionStore::new());

    let identity = match flow.submit_email(&email, &password).await? {
        FlowOutcome::Authenticated(identity) => identity,
        FlowOutcome::RegistrationRequired => {
            let (Some(first_name), Some(last_name), Some(phone_number)) =
                (first_name, last_name, phone)
            else {
                return Err(CliError::validation(format!(
                    "no account for {}; pass --first-name, --last-name and --phone to register",
                    email.trim()
                )));
            };
            let form = RegistrationForm {
                first_name,
                last_name,
                phone_number,
                password,
            };
            tracing::info!("registering new account");
            flow.submit_registration(&form).await?
        }
    };

    render_identity(&identity, ctx.output)
}

fn resolve_password(supplied: Option<&str>) -> CliResult<String> {
    if let Some(value) = supplied {
        if value.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        return Ok(value.to_string());
    }

    if io::stdin().is_terminal() {
        let pass = rpassword::prompt_password("Password: ").map_err(|err| {
            CliError::failure(anyhow!("failed to read password from stdin: {err}"))
        })?;
        if pass.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        Ok(pass)
    } else {
        Err(CliError::validation(
            "password required; pass --password or set AGROVISION_PASSWORD",
        ))
    }
}
