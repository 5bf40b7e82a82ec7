//! Integration tests for foldsync

mod cli_route;
mod config_integration;
mod hasher_verification;
mod scheduler;
