pub mod health;
pub mod statistics;
