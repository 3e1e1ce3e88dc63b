mod common;
mod modules_tests;
mod planning_tests;
