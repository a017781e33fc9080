pub mod auth;

pub use auth::{AdminUser, AuthError, AuthUser, JwtSessionResolver, Session, SessionResolver};
