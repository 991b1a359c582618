pub mod cutting;
pub mod query;
pub mod rooms;
