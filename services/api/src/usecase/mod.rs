pub mod contact;
pub mod login_code;
pub mod session;
pub mod user;
