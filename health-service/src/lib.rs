//! Health Service - users, health reports and AI-assisted chat history.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
