pub mod activity;
pub mod mood;
pub mod streak;
