pub mod aggregate;
pub mod args;
pub mod fetch;
pub mod http_client;
pub mod pages;
pub mod rankings;
pub mod startgg;
pub mod stores;
