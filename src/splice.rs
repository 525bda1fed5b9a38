//! Main module for declsplice library functionality

pub mod config;
pub mod dialect;
pub mod directive;
pub mod error;
pub mod guard;
pub mod modules;
pub mod property;
pub mod query;
pub mod template;
pub mod testing;
