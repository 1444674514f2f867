pub mod rest;

pub use rest::{ApiStatusError, RestClient};
