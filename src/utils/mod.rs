pub mod error;
pub mod format;
pub mod number;

pub use error::AppError;
pub use format::{format_amount, format_number, format_price};
pub use number::parse_decimal;
