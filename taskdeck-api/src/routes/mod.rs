/// API route handlers
///
/// This module contains all REST handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and the current identity
/// - `tasks`: Task CRUD and status changes

pub mod auth;
pub mod health;
pub mod tasks;
