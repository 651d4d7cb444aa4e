//! Account creation from the command line, mainly for bootstrapping admins.

use anyhow::Context;

use crate::config::Config;
use crate::db::{NewUser, Store};
use crate::domain::Role;

pub async fn cmd_create_user(
    config: &Config,
    name: String,
    email: String,
    password: String,
    role: &str,
) -> anyhow::Result<()> {
    let role: Role = role.parse().map_err(anyhow::Error::msg)?;

    if password.chars().count() < config.security.min_password_length {
        anyhow::bail!(
            "Password must be at least {} characters",
            config.security.min_password_length
        );
    }

    let store = Store::new(&config.general.database_path).await?;
    let user = store
        .create_user(
            NewUser {
                name,
                email: email.clone(),
                password,
                role,
                avatar: Some(config.security.default_avatar.clone()),
            },
            &config.security,
        )
        .await
        .context("Failed to create user")?;

    let Some(user) = user else {
        println!("A user with email {email} already exists.");
        return Ok(());
    };

    println!("✓ Created {} account #{}", user.role.as_str(), user.id);
    println!("  Name:    {}", user.name);
    println!("  Email:   {}", user.email);
    println!("  API key: {}", user.api_key);

    Ok(())
}
