pub mod health;
pub mod login;
