//! User domain types.

use chrono::{DateTime, Utc};

use skillet_core::{Email, UserId};

/// An account (domain type).
///
/// Email doubles as the username. The password never appears here; repositories
/// hand the Argon2 hash back separately and only to the auth service.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized email address.
    pub email: Email,
    /// Display name (may be empty).
    pub name: String,
    /// Whether the user can access staff-only surfaces.
    pub is_staff: bool,
    /// Whether the user bypasses all permission checks.
    pub is_superuser: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
