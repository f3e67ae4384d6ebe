//! Auth commands - login, registration, logout and mode

use anyhow::{bail, Result};
use colored::Colorize;
use serde_json::json;

use cryptowallet_core::domain::{
    AdminRegistration, Credentials, Identity, IdentityKind, Registration,
    UserRegistration,
};
use cryptowallet_core::services::AuthOutcome;
use cryptowallet_core::{OperationResult, WalletContext};

use super::{get_context, new_password_or_prompt, password_or_prompt};
use crate::output;

/// Sign in within `kind`'s namespace, switching mode first when needed
pub async fn login_as(
    ctx: &mut WalletContext,
    kind: IdentityKind,
    username: &str,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let password = password_or_prompt(password, "Password")?;
    ctx.auth.switch_mode(kind);

    let credentials = Credentials::new(username, password);
    let outcome = output::spin("Signing in...", ctx.auth.login(&credentials)).await;
    report(outcome, json)
}

pub async fn login(username: &str, password: Option<String>, json: bool) -> Result<()> {
    let mut ctx = get_context()?;
    login_as(&mut ctx, IdentityKind::User, username, password, json).await
}

pub async fn register(
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let mut ctx = get_context()?;
    let password = new_password_or_prompt(password, "Choose a password")?;
    ctx.auth.switch_mode(IdentityKind::User);

    let registration = Registration::User(UserRegistration {
        username,
        email,
        password,
        first_name,
        last_name,
    });
    let outcome = output::spin("Creating account...", ctx.auth.register(&registration)).await;
    report(outcome, json)
}

/// Register an admin account for yourself and sign in with it
pub async fn register_admin_self(
    ctx: &mut WalletContext,
    registration: AdminRegistration,
    json: bool,
) -> Result<()> {
    ctx.auth.switch_mode(IdentityKind::Admin);
    let outcome = output::spin(
        "Creating admin account...",
        ctx.auth.register(&Registration::Admin(registration)),
    )
    .await;
    report(outcome, json)
}

pub fn logout() -> Result<()> {
    let mut ctx = get_context()?;
    ctx.auth.logout()?;
    output::success("Logged out");
    Ok(())
}

pub fn whoami(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let identity = ctx.identity();

    if json {
        let value = match identity {
            Some(Identity::User(u)) => json!({"mode": "user", "user": u}),
            Some(Identity::Admin(a)) => json!({"mode": "admin", "admin": a}),
            None => json!({"mode": ctx.auth.mode(), "authenticated": false}),
        };
        return output::json(&value);
    }

    match identity {
        Some(identity) => print_identity(identity),
        None => println!(
            "{} ({} mode)",
            "Not logged in".dimmed(),
            ctx.auth.mode()
        ),
    }
    Ok(())
}

pub fn mode(target: Option<&str>) -> Result<()> {
    let mut ctx = get_context()?;
    let Some(target) = target else {
        println!("{}", ctx.auth.mode());
        return Ok(());
    };

    let kind: IdentityKind = target.parse()?;
    if kind == ctx.auth.mode() {
        println!("Already in {} mode", kind);
        return Ok(());
    }
    let had_session = ctx.auth.is_authenticated();
    ctx.auth.switch_mode(kind);
    output::success(&format!("Switched to {} mode", kind));
    if had_session {
        println!("{}", "The previous session was signed out.".dimmed());
    }
    Ok(())
}

fn report(outcome: AuthOutcome, json: bool) -> Result<()> {
    match outcome {
        AuthOutcome::Authenticated(identity) => {
            if json {
                let data = match &identity {
                    Identity::User(u) => serde_json::to_value(u)?,
                    Identity::Admin(a) => serde_json::to_value(a)?,
                };
                return output::json(&OperationResult::ok(data));
            }
            output::success(&format!("Signed in as {}", identity.username()));
            print_identity(&identity);
            Ok(())
        }
        AuthOutcome::Rejected(reason) => {
            if json {
                output::json(&OperationResult::<()>::fail(reason.clone()))?;
            }
            bail!(reason)
        }
    }
}

fn print_identity(identity: &Identity) {
    println!("  Username: {}", identity.username().bold());
    println!("  Name:     {}", identity.display_name());
    println!("  Email:    {}", identity.email());
    match identity.role() {
        Some(role) => println!("  Role:     {}", role),
        None => println!("  ID:       {}", identity.id()),
    }
}
