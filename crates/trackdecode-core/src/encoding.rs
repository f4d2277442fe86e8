//! Hex boundary between transport payloads and raw packets.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum HexError {
    #[error("malformed hex packet: {0}")]
    Malformed(#[from] hex::FromHexError),
}

/// Decode a hex string into packet bytes.
///
/// ASCII whitespace is ignored so grouped dumps (`02 00105e5f ...`) decode
/// as-is. Digits are case-insensitive, two per byte.
///
/// # Examples
/// ```
/// use trackdecode_core::decode_hex;
///
/// assert_eq!(decode_hex("02 aB ff")?, vec![0x02, 0xAB, 0xFF]);
/// assert!(decode_hex("abc").is_err());
/// # Ok::<(), trackdecode_core::HexError>(())
/// ```
pub fn decode_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(hex::decode(digits)?)
}
