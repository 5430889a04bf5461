pub mod client;
pub mod request;

pub use client::MembraneClient;
pub use request::{ApiRequest, RequestOptions};
