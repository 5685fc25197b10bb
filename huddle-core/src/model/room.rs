use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Room codes are short enough to read out loud over another channel.
pub const ROOM_CODE_LEN: usize = 6;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Identifier of a room on the relay: exactly six characters from `[A-Z0-9]`.
///
/// Collisions are not checked locally; the relay owns room membership.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomCode(String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoomCodeError {
    #[error("room code must be exactly {ROOM_CODE_LEN} characters, got {0}")]
    Length(usize),
    #[error("room code may only contain A-Z and 0-9")]
    Alphabet,
}

impl RoomCode {
    /// Generates a fresh code, drawing each character uniformly from the
    /// alphabet.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code = (0..ROOM_CODE_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Validates user input before anything touches the network. Lowercase
    /// letters are accepted and uppercased, matching what people type.
    pub fn parse(input: &str) -> Result<Self, RoomCodeError> {
        let code = input.trim().to_ascii_uppercase();
        if code.len() != ROOM_CODE_LEN {
            return Err(RoomCodeError::Length(code.len()));
        }
        if !code.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(RoomCodeError::Alphabet);
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
