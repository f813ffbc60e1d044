pub mod config;
pub mod wind_data;
