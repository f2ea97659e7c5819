pub mod common;
pub mod repository_tests;
