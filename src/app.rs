pub mod constant;
pub mod lazy;
