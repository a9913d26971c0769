//! sea-orm entities for the Folio API database.

pub mod login_tokens;
pub mod users;
