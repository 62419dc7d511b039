//! Connection id generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a live connection.
pub type Uid = String;

/// Generates unique connection ids.
///
/// Format: `C` + 6 base36 digits. Example: "C00001A"
pub struct UidGenerator {
    counter: AtomicU64,
}

const UID_PREFIX: char = 'C';

impl UidGenerator {
    /// Create a new generator; the first id is `C000001`.
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    /// Generate the next unique id.
    pub fn next(&self) -> Uid {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", UID_PREFIX, base36_encode_6(n))
    }
}

impl Default for UidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a number as a 6-character base36 string (wraps past 36^6).
fn base36_encode_6(mut n: u64) -> String {
    const CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut result = [b'0'; 6];

    for slot in result.iter_mut().rev() {
        *slot = CHARS[(n % 36) as usize];
        n /= 36;
    }

    String::from_utf8_lossy(&result).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_generation() {
        let generator = UidGenerator::new();
        assert_eq!(generator.next(), "C000001");
        assert_eq!(generator.next(), "C000002");
        assert_eq!(generator.next(), "C000003");
    }

    #[test]
    fn test_base36_encode() {
        assert_eq!(base36_encode_6(0), "000000");
        assert_eq!(base36_encode_6(35), "00000Z");
        assert_eq!(base36_encode_6(36), "000010");
    }
}
