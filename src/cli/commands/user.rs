//! Account command handlers

use std::io::{self, BufRead, Write};

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthError, AuthService, Registration, SeaOrmAuthService};

pub async fn cmd_user_create(
    config: &Config,
    username: &str,
    password: Option<&str>,
    email: Option<&str>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password.to_string(),
        None => prompt_password()?,
    };

    let store = Store::new(&config.general.database_path).await?;
    let auth = SeaOrmAuthService::new(store, config.security.clone());

    let registration = Registration {
        username: username.to_string(),
        email: email.map(str::to_string),
        password: password.clone(),
        password_confirm: password,
    };

    match auth.register(&registration).await {
        Ok(user) => {
            println!("✓ Created user '{}' (id {})", user.username, user.id);
            println!("  API key: {}", user.api_key);
            Ok(())
        }
        Err(AuthError::Validation(field)) => {
            anyhow::bail!("{}: {}", field.field, field.message)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn cmd_user_delete(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let auth = SeaOrmAuthService::new(store, config.security.clone());

    match auth.delete_user(username).await {
        Ok(()) => {
            println!("✓ Deleted user '{username}' and their library");
            Ok(())
        }
        Err(AuthError::UserNotFound) => {
            println!("No user named '{username}'.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn prompt_password() -> anyhow::Result<String> {
    print!("Password: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
