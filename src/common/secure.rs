//! Secure handling of in-memory credentials.
//!
//! Password material passed to the protection helpers lives in a
//! [`SecureBuffer`], which zeroes its backing storage when dropped, and is
//! compared with [`constant_time_eq`] so that the comparison time does not
//! reveal the position of the first mismatch.

/// Compare two byte slices in constant time.
///
/// The full length of both inputs is always scanned; an early mismatch
/// does not shorten the comparison. Slices of different lengths compare
/// unequal but still scan the shorter input.
///
/// # Examples
///
/// ```
/// use longan::common::secure::constant_time_eq;
/// assert!(constant_time_eq(b"secret", b"secret"));
/// assert!(!constant_time_eq(b"secret", b"secreT"));
/// assert!(!constant_time_eq(b"secret", b"secrets"));
/// ```
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    // Length difference folds into the accumulator instead of returning
    // early, so equal-length prefixes do not finish faster.
    let mut acc = (a.len() ^ b.len()) as u8;
    let len = a.len().min(b.len());
    for i in 0..len {
        acc |= a[i] ^ b[i];
    }
    std::hint::black_box(acc) == 0
}

/// An opaque byte buffer that zeroes its contents on drop.
///
/// Used to hold password bytes between hashing and comparison so that the
/// plaintext does not linger in freed memory.
pub struct SecureBuffer {
    bytes: Vec<u8>,
}

impl SecureBuffer {
    /// Take ownership of the given bytes.
    #[inline]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Copy a string's UTF-8 bytes into a secure buffer.
    #[inline]
    pub fn from_str(value: &str) -> Self {
        Self::new(value.as_bytes().to_vec())
    }

    /// Borrow the protected bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the protected contents.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Constant-time comparison against another buffer.
    #[inline]
    pub fn eq_constant_time(&self, other: &SecureBuffer) -> bool {
        constant_time_eq(&self.bytes, &other.bytes)
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        // Volatile writes so the zeroing cannot be elided once the buffer
        // is no longer observable.
        for byte in self.bytes.iter_mut() {
            // SAFETY: `byte` is a valid, aligned, exclusive reference.
            unsafe { std::ptr::write_volatile(byte, 0) };
        }
    }
}

impl std::fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the contents.
        write!(f, "SecureBuffer({} bytes)", self.bytes.len())
    }
}
