pub mod request;
pub mod signature;
pub mod reload;
