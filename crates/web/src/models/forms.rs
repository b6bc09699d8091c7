//! Request bodies for the auth, admin and product workflows.
//!
//! Every form derives [`Validate`]; workflows call `validate()` before doing
//! anything else. Missing fields deserialize to empty values so they surface
//! as validation errors rather than body rejections.

use serde::Deserialize;
use validator::Validate;

use product_catalog_core::{Price, ProductId};

/// Self-service registration.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "The First Name field is required."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "The Last Name field is required."))]
    pub last_name: String,
    #[validate(email(message = "The Email field is not a valid e-mail address."))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 100,
        message = "The Password must be at least 8 and at max 100 characters long."
    ))]
    pub password: String,
    #[validate(must_match(
        other = "password",
        message = "The password and confirmation password do not match."
    ))]
    pub confirm_password: String,
}

/// Password sign-in.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(email(message = "The Email field is not a valid e-mail address."))]
    pub email: String,
    #[validate(length(min = 1, message = "The Password field is required."))]
    pub password: String,
    /// Keep the session alive across browser restarts.
    pub remember_me: bool,
}

/// Account created by a super admin.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AddUserForm {
    #[validate(length(min = 1, message = "The First Name field is required."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "The Last Name field is required."))]
    pub last_name: String,
    #[validate(email(message = "The Email field is not a valid e-mail address."))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 100,
        message = "The Password must be at least 8 and at max 100 characters long."
    ))]
    pub password: String,
    /// `"Admin"` grants Admin and User; anything else grants User only.
    pub role_selected: Option<String>,
}

impl AddUserForm {
    /// Whether the Admin role was selected.
    #[must_use]
    pub fn wants_admin(&self) -> bool {
        self.role_selected.as_deref() == Some("Admin")
    }
}

/// Profile and role changes made by a super admin.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateUserForm {
    #[validate(length(min = 1, message = "The First Name field is required."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "The Last Name field is required."))]
    pub last_name: String,
    /// Role to assign in place of the current one. Unparseable or unknown
    /// ids leave the account without a role.
    pub role_id: Option<String>,
}

/// Product create/update body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProductForm {
    /// Ignored on create; must match the path id on update.
    pub id: ProductId,
    #[validate(length(min = 1, message = "The Name field is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "The Description field is required."))]
    pub description: String,
    #[validate(length(min = 1, message = "The Category field is required."))]
    pub category: String,
    pub price: Price,
}
