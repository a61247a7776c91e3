//! Command dispatch
//!
//! Each command drives [`FlowService`] and writes a human-readable (mostly
//! JSON) result to the supplied writer. Logging goes through `tracing`;
//! command output never does.

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Context;
use flowlab_core::{canonical_prompt, AuthRequest, CallbackParams, ExchangeParams, FlowService};
use flowlab_domain::{FlowError, FlowType, Result as FlowResult};
use flowlab_infra::CallbackServer;
use serde::Serialize;
use serde_json::json;

use crate::cli::{Command, ExchangeOverrides, RequestArgs, StateAction};
use crate::context::AppContext;
use crate::utils::logging::{error_label, log_command_execution};

/// Run one command against the context
///
/// # Errors
/// Any flow, transport or storage failure, plus write errors on `out`.
pub async fn execute<W: Write>(ctx: &AppContext, command: Command, out: &mut W) -> anyhow::Result<()> {
    let name = command_name(&command);
    let start = Instant::now();

    let result = dispatch(ctx, command, out).await;

    let label = result.as_ref().err().and_then(|err| err.downcast_ref::<FlowError>()).map(error_label);
    log_command_execution(name, start.elapsed(), result.is_ok(), label);
    result
}

async fn dispatch<W: Write>(ctx: &AppContext, command: Command, out: &mut W) -> anyhow::Result<()> {
    let service = &ctx.service;

    match command {
        Command::Url { request, preview } => {
            let auth = build_request(service, &request, !preview)?;
            let url = if preview {
                service.preview_url(&auth)?
            } else {
                service.commit_and_build_url(&auth)?
            };
            writeln!(out, "{url}")?;
        }
        Command::Login { request, timeout } => {
            let auth = build_request(service, &request, true)?;
            let mut server = CallbackServer::for_redirect_uri(&ctx.config.provider.redirect_uri)
                .await
                .context("starting the callback server")?;
            let url = service.commit_and_build_url(&auth)?;

            writeln!(out, "Open this URL in a browser:\n\n{url}\n")?;
            writeln!(out, "Waiting for the redirect on {} ...", server.callback_url())?;
            out.flush()?;

            let params = server.wait_for_callback(Duration::from_secs(timeout)).await;
            server.shutdown().await?;

            let tokens = service.handle_callback(&params?).await?;
            write_json(out, &tokens)?;
        }
        Command::Callback { query, overrides } => {
            let params = CallbackParams::parse(&query)?;
            let mut exchange = service.validate_callback(&params)?.default_params;
            apply_overrides(&mut exchange, &overrides);

            let tokens = service.exchange_code(&exchange).await?;
            write_json(out, &tokens)?;
        }
        Command::Refresh => write_json(out, &service.refresh().await?)?,
        Command::ClientCredentials => write_json(out, &service.client_credentials().await?)?,
        Command::Introspect { kind } => write_json(out, &service.introspect(kind).await?)?,
        Command::Revoke { kind } => {
            service.revoke(kind).await?;
            writeln!(out, "{kind} token revoked")?;
        }
        Command::Userinfo => write_json(out, &service.user_info().await?)?,
        Command::Session => {
            let claims = match service.decoded_id_token() {
                Ok(claims) => claims,
                Err(err) => Some(json!({ "error": err.to_string() })),
            };
            write_json(out, &json!({ "session": service.session()?, "idTokenClaims": claims }))?;
        }
        Command::State { action } => {
            let states = service.states();
            match action {
                StateAction::Init => writeln!(out, "{}", states.initialize()?)?,
                StateAction::Refresh => writeln!(out, "{}", states.refresh()?)?,
                StateAction::Remove => {
                    states.remove()?;
                    writeln!(out, "state removed")?;
                }
                StateAction::Set { value } => {
                    states.set_explicit(&value)?;
                    writeln!(out, "{value}")?;
                }
            }
        }
        Command::Verifier => writeln!(out, "{}", service.generate_verifier()?)?,
        Command::Logout => {
            service.logout()?;
            writeln!(out, "session cleared")?;
        }
    }

    Ok(())
}

/// Authorization request from the stored session plus command-line edits
///
/// With `persist` false the session is only read: blank state and verifier
/// are generated in memory, and an explicit `--state` or `--client-auth`
/// only shapes the rendered URL.
fn build_request(
    service: &FlowService,
    args: &RequestArgs,
    persist: bool,
) -> FlowResult<AuthRequest> {
    let mut request = if persist { service.draft_request()? } else { service.peek_request()? };

    request.flow = if args.confidential { FlowType::Confidential } else { FlowType::Public };
    request.use_pkce = !args.no_pkce;
    if let Some(method) = args.method {
        request.challenge_method = method;
    }
    if let Some(prompt) = &args.prompt {
        request.prompt = canonical_prompt(prompt);
    }
    if let Some(verifier) = &args.verifier {
        request.code_verifier.clone_from(verifier);
    }
    if let Some(state) = &args.state {
        if persist {
            service.states().set_explicit(state)?;
        }
        request.state.clone_from(state);
    }
    if let (Some(method), true) = (args.client_auth, persist) {
        service.set_client_auth_method(method.into())?;
    }

    Ok(request)
}

fn apply_overrides(params: &mut ExchangeParams, overrides: &ExchangeOverrides) {
    for (from, to) in &overrides.renames {
        if !params.rename(from, to) {
            tracing::warn!(from = %from, "rename skipped: parameter not present");
        }
    }
    for key in &overrides.drops {
        params.remove(key);
    }
    for (key, value) in &overrides.params {
        params.set(key.as_str(), value.as_str());
    }
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

const fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Url { .. } => "url",
        Command::Login { .. } => "login",
        Command::Callback { .. } => "callback",
        Command::Refresh => "refresh",
        Command::ClientCredentials => "client_credentials",
        Command::Introspect { .. } => "introspect",
        Command::Revoke { .. } => "revoke",
        Command::Userinfo => "userinfo",
        Command::Session => "session",
        Command::State { .. } => "state",
        Command::Verifier => "verifier",
        Command::Logout => "logout",
    }
}
