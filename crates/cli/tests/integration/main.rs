mod common;
mod generate_tests;
mod plan_tests;
