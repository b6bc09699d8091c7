//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a user with the Admin and User roles
//! CATALOG_USER_PASSWORD='S3cure!pass' catalog-cli user create -e jane@example.com -f Jane -l Doe --admin
//!
//! # List users
//! catalog-cli user list
//! ```

use product_catalog_web::models::AddUserForm;
use product_catalog_web::services::{AdminError, AdminService};

use product_catalog_core::{AccountId, RoleName};

use super::{CommandError, open_state};

/// Create a new user.
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the input is invalid, the email is taken, the
/// password fails the policy, or the database is unreachable.
pub async fn create(
    email: &str,
    first_name: &str,
    last_name: &str,
    password: String,
    admin: bool,
) -> Result<AccountId, CommandError> {
    let state = open_state().await?;

    let form = AddUserForm {
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        email: email.to_owned(),
        password,
        role_selected: admin.then(|| RoleName::Admin.to_string()),
    };

    tracing::info!("Creating user: {} (admin: {})", email, admin);
    let account = AdminService::new(state.identity(), state.stores())
        .create_user(&form)
        .await
        .inspect_err(|e| {
            if let AdminError::Identity(err) = e {
                for issue in err.issues().unwrap_or_default() {
                    tracing::error!("  - {}", issue.description);
                }
            }
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        account.id,
        account.email
    );
    Ok(account.id)
}

/// Print every user with their role.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the database
/// is unreachable.
pub async fn list() -> Result<(), CommandError> {
    let state = open_state().await?;

    let users = AdminService::new(state.identity(), state.stores()).list_users().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:<36}  {:<32}  {:<24}  ROLE", "ID", "EMAIL", "NAME");
        for user in &users {
            let name = format!("{} {}", user.first_name, user.last_name);
            println!(
                "{:<36}  {:<32}  {:<24}  {}",
                user.id.to_string(),
                user.email.as_str(),
                name,
                user.role_name
            );
        }
    }

    tracing::info!("{} user(s)", users.len());
    Ok(())
}
