//! Core domain entities.
//!
//! - [`User`] - A user record as stored in the database
//! - [`NewUser`] - A registration about to be stored
//! - [`CachedUser`] - The snapshot kept by the user cache
//! - [`Role`], [`Status`] - Closed sets of account roles and lifecycle states

pub mod user;

pub use user::{CachedUser, NewUser, Role, Status, User};
