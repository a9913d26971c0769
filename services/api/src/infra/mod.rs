pub mod db;
pub mod locks;
pub mod mail;
pub mod rate_limit;
pub mod templates;
