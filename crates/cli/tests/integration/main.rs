//! End-to-end tests driving the exodep binary against local recipes.

mod common;
mod run_tests;
