//! Application services.
//!
//! Services sit between the route handlers and the repositories and own the
//! logic that spans more than one table or touches the filesystem.

pub mod auth;
pub mod media;
