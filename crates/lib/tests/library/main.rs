//! Whole-recipe tests for exodep-lib.

mod common;
mod driver_tests;
mod recipe_tests;
