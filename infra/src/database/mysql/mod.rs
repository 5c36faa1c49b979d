//! MySQL-specific database implementations

pub mod sms_repository_impl;

pub use sms_repository_impl::MySqlSmsRepository;
