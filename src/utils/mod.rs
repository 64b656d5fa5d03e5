//! The `utils` module holds the pieces shared by every layer of `relaymq`:
//! the error types and the logging bootstrap.

pub mod error;
pub mod logging;

pub use error::{BrokerError, DeliveryError};

#[cfg(test)]
mod tests {
    use super::logging;

    #[test]
    fn logging_init_accepts_levels() {
        logging::init("info");
        logging::init("debug");
        logging::init("warning");
        logging::init("nonsense");
    }
}
