pub mod agreement;
pub mod asset;
pub mod quote;
