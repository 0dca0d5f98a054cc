//! App-service authentication

mod login;

pub use login::{compute_login_digest, generate_challenge, verify_login_digest, LoginParams};
