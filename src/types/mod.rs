pub mod symbol;
pub mod funding_rate;
pub mod order_book;
pub mod timestamp;
pub mod aggregate;
