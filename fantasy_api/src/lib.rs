mod backoff;
mod client;
mod errors;
pub mod types;
pub use self::backoff::{fibonacci, RetryPolicy};
pub use self::client::{Client, DEFAULT_BASE_URL};
pub use self::errors::Error;
