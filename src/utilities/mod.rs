pub mod config;
pub mod constants;
pub mod file_management;
pub mod http;
pub mod json_values;
pub mod storefront;
pub mod string_manipulators;
