//! HTTP handlers

mod access;
mod health;
mod login;

pub use access::access;
pub use health::{health, ready};
pub use login::login;
