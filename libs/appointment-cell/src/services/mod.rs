pub mod booking;
pub mod filter;
pub mod lifecycle;
pub mod wizard;
