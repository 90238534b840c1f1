// Utility functions

use chrono::Utc;

/// Extension trait for Result that provides convenient error context methods.
/// Converts any error to a String with a descriptive message prefix.
pub trait ResultExt<T> {
    /// Converts the error to a String with context message.
    fn with_context(self, msg: &str) -> Result<T, String>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn with_context(self, msg: &str) -> Result<T, String> {
        self.map_err(|e| format!("{}: {}", msg, e))
    }
}

/// Generate a unique ID using timestamp and random string.
pub fn generate_id() -> String {
    let now = Utc::now().timestamp_millis();
    format!("{}-{}", now, rand_string(8))
}

/// Generate a random alphanumeric string of specified length.
fn rand_string(len: usize) -> String {
    use rand::Rng;
    use std::iter;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    iter::repeat_with(|| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .take(len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id() {
        let id1 = generate_id();
        let id2 = generate_id();
        assert_ne!(id1, id2);
        assert!(id1.len() > 8);
    }

    #[test]
    fn test_with_context() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let mapped = result.with_context("Failed to do the thing");
        assert_eq!(mapped.unwrap_err(), "Failed to do the thing: boom");
    }
}
