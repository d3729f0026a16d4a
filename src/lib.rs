pub mod classify;
pub mod config;
pub mod fetch;
pub mod group;
pub mod humanize;
pub mod observability;
