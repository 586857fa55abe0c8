/// Errors raised while decoding (or fixed-width encoding) textual IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// The input does not have the fixed length the ID type requires.
    #[error("invalid length: expected {expected}, got {len}")]
    InvalidLength { expected: usize, len: usize },

    /// The input contains a byte outside of the alphabet.
    #[error("invalid ascii byte {byte:#04x} at index {index}")]
    InvalidAscii { byte: u8, index: usize },

    /// The decoded value does not fit in the target width, or padding bits
    /// are set.
    #[error("value overflows the target width")]
    Overflow,
}
