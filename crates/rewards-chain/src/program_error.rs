//! Custom error codes returned by the reward manager program
//!
//! Some values overlap with system program errors, so a decoded code is only
//! meaningful when the failing instruction belongs to the reward manager.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardManagerError {
    IncorrectOwner,
    SignCollision,
    WrongSigner,
    NotEnoughSigners,
    Secp256InstructionMissing,
    InstructionLoadError,
    RepeatedSenders,
    SignatureVerificationFailed,
    OperatorCollision,
    AlreadySent,
    IncorrectMessages,
    MessagesOverflow,
    MathOverflow,
    InvalidRecipient,
}

impl RewardManagerError {
    pub fn from_code(code: u32) -> Option<Self> {
        use RewardManagerError::*;
        let err = match code {
            0 => IncorrectOwner,
            1 => SignCollision,
            2 => WrongSigner,
            3 => NotEnoughSigners,
            4 => Secp256InstructionMissing,
            5 => InstructionLoadError,
            6 => RepeatedSenders,
            7 => SignatureVerificationFailed,
            8 => OperatorCollision,
            9 => AlreadySent,
            10 => IncorrectMessages,
            11 => MessagesOverflow,
            12 => MathOverflow,
            13 => InvalidRecipient,
            _ => return None,
        };
        Some(err)
    }

    /// Find a custom program error code in a relay or RPC error message.
    ///
    /// Recognizes `custom program error: 0x9` and `{"Custom":9}` forms.
    pub fn find_in(text: &str) -> Option<Self> {
        const HEX_MARKER: &str = "custom program error: 0x";
        const JSON_MARKER: &str = "\"Custom\":";

        let lower = text.to_ascii_lowercase();
        if let Some(pos) = lower.find(HEX_MARKER) {
            let digits: String = lower[pos + HEX_MARKER.len()..]
                .chars()
                .take_while(|c| c.is_ascii_hexdigit())
                .collect();
            return u32::from_str_radix(&digits, 16).ok().and_then(Self::from_code);
        }
        if let Some(pos) = text.find(JSON_MARKER) {
            let digits: String = text[pos + JSON_MARKER.len()..]
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            return digits.parse().ok().and_then(Self::from_code);
        }
        None
    }
}

impl fmt::Display for RewardManagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
