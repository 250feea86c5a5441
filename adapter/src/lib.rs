pub mod database;
pub mod gateway;
pub mod notifier;
pub mod redis;
pub mod repository;
