//! Domain models for the catalog.

pub mod account;
pub mod forms;
pub mod product;
pub mod role;
pub mod session;

pub use account::{
    Account, AccountProfile, IdentityAccount, LockoutState, NewAccount, RoleOption, UserEditView,
    UserView,
};
pub use forms::{AddUserForm, LoginForm, ProductForm, RegisterForm, UpdateUserForm};
pub use product::Product;
pub use role::{Role, RoleAssignment};
pub use session::{CurrentUser, keys as session_keys};
