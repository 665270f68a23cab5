//! Core library components.
//!
//! This module contains the reusable logic for decoding the key directory,
//! tracking changes, and synchronizing the admin repository with its remote.

pub mod admin;
pub mod conf;
pub mod config;
pub mod constants;
pub mod domain;
pub mod git;
pub mod keypath;
pub mod keyset;
pub mod keystore;
pub mod types;
