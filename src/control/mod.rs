pub mod session;
pub mod export;
