pub mod client;
pub mod errors;
pub mod types;

pub use client::HttpQuoteFetcher;
pub use errors::HttpError;
