//! Well-known client routes shared by the guard and the API client.

/// Login entry point; target of every forced sign-out navigation.
pub const LOGIN: &str = "/login";
/// Account registration page.
pub const REGISTER: &str = "/register";
/// Landing page for authenticated non-admin users.
pub const DASHBOARD: &str = "/dashboard";
/// Landing page for authenticated admins; also the admin path prefix.
pub const ADMIN_HOME: &str = "/admin";
