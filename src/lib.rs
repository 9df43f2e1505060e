pub mod auction;
pub mod auth;
pub mod bidding;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod query;
pub mod state;
pub mod uploads;
pub mod users;
