pub mod cognito;
pub mod identity;
pub mod login;
