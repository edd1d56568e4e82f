pub mod auth;
pub mod gateway;
