pub mod lobby;
pub mod session;
pub mod tick;
pub mod types;
