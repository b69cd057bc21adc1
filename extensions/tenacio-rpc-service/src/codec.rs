//! `bitcode` helpers shared by operation definitions.
//!
//! Sequences, tuples and nested collections are handled by `bitcode` itself,
//! element by element and in order; an operation only has to name its
//! argument and result types. Decoding never panics: malformed input yields
//! an `io::ErrorKind::InvalidData` error.

use std::io;

pub fn encode_value<T>(value: &T) -> Result<Vec<u8>, io::Error>
where
    T: bitcode::Encode + ?Sized,
{
    Ok(bitcode::encode(value))
}

pub fn decode_value<T>(bytes: &[u8]) -> Result<T, io::Error>
where
    T: bitcode::DecodeOwned,
{
    bitcode::decode::<T>(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Encoding of an operation without arguments or without a result.
pub fn encode_unit() -> Result<Vec<u8>, io::Error> {
    Ok(Vec::new())
}

pub fn decode_unit(bytes: &[u8]) -> Result<(), io::Error> {
    if bytes.is_empty() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("expected an empty payload, got {} bytes", bytes.len()),
        ))
    }
}
