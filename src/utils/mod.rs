pub mod filter;
pub mod validate;
