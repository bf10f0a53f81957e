pub mod datasets;
pub mod users;
