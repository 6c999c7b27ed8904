//! Credential model: redacted secrets, the bearer credential record, and grant labels.

pub mod credential;
pub mod grant;
pub mod secret;

pub use credential::*;
pub use grant::*;
pub use secret::*;
