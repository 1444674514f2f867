pub mod currency;
pub mod phone;

pub use currency::parse_masked_amount;
pub use phone::{mask_phone, normalize_phone};
