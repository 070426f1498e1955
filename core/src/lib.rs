pub mod error;
pub mod events;
pub mod models;
pub mod time;

pub use error::FetchError;
pub use models::Quote;
