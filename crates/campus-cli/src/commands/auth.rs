//! The `campus login`, `register`, `reset-password`, `logout` and
//! `whoami` commands.

use std::path::Path;

use anyhow::Result;

use campus_core::auth;
use campus_core::model::Role;
use campus_core::validate::RegistrationForm;

use super::{shown, App};

pub struct RegisterArgs {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

pub async fn login(config_path: Option<&Path>, username: &str, password: &str) -> Result<()> {
    let mut app = App::load(config_path)?;
    // A new login never reuses the old token.
    app.session = None;
    let backend = app.backend()?;

    let outcome = auth::login(backend.as_ref(), &app.store, username, password)
        .await
        .map_err(shown)?;
    println!(
        "Logged in as {} ({}).",
        outcome.session.username, outcome.session.role
    );
    println!("Dashboard: {}", outcome.route);
    Ok(())
}

pub async fn register(config_path: Option<&Path>, args: RegisterArgs) -> Result<()> {
    let app = App::load(config_path)?;
    let backend = app.backend()?;

    let role = match args.role.as_deref() {
        Some(role) => Some(role.parse::<Role>().map_err(anyhow::Error::msg)?),
        None => None,
    };
    let form = RegistrationForm {
        firstname: args.firstname,
        lastname: args.lastname,
        username: args.username,
        email: args.email,
        password: args.password,
        role,
    };
    let message = auth::register(backend.as_ref(), form)
        .await
        .map_err(shown)?;
    println!("{message}");
    Ok(())
}

pub async fn reset_password(config_path: Option<&Path>, email: &str) -> Result<()> {
    let app = App::load(config_path)?;
    let backend = app.backend()?;

    let message = auth::reset_password(backend.as_ref(), email)
        .await
        .map_err(shown)?;
    println!("{message}");
    Ok(())
}

pub fn logout(config_path: Option<&Path>) -> Result<()> {
    let app = App::load(config_path)?;
    auth::logout(&app.store).map_err(shown)?;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(config_path: Option<&Path>) -> Result<()> {
    let app = App::load(config_path)?;
    match &app.session {
        Some(session) => {
            println!("Username: {}", session.username);
            println!("Role:     {}", session.role);
            match session.user_id {
                Some(id) => println!("User ID:  {id}"),
                None => println!("User ID:  unknown"),
            }
            println!("Home:     {}", session.home());
        }
        None => println!("Not logged in. Run `campus login` first."),
    }
    Ok(())
}
