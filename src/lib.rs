//! # Conference Bot
//!
//! A Telegram companion bot for conferences with a JSON admin API.
//!
//! ## Features
//! - Event program with live/upcoming/finished status
//! - Questions to the current speaker, readable by the speaker
//! - Per-event notification subscriptions with three switches
//! - Program-change, new-event and reminder broadcasts
//! - Networking profiles and Telegram Payments donations
//! - Persistent storage with SQLite

/// Bot commands, dialogue state and update handlers
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Notification delivery, reminders and text rendering
pub mod services;
/// Utility functions for datetime, validation, and formatting
pub mod utils;
/// Admin API and health checks
pub mod web;
