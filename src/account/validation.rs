//! Input validation for account identifiers

use std::fmt;

use crate::error::LedgerError;

/// Validated CPF in the `NNN.NNN-NN` form
///
/// Fields are private to force validation through `new()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    const LEN: usize = 10;

    /// Create a new validated Cpf
    ///
    /// # Examples
    /// ```
    /// use funds_ledger::account::Cpf;
    ///
    /// assert!(Cpf::new("220.321-11").is_ok());
    /// assert!(Cpf::new("22032111").is_err());
    /// ```
    pub fn new(value: &str) -> Result<Self, LedgerError> {
        let bytes = value.as_bytes();
        if bytes.len() != Self::LEN {
            return Err(LedgerError::InvalidCpf);
        }

        let valid = bytes.iter().enumerate().all(|(i, b)| match i {
            3 => *b == b'.',
            7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

        if !valid {
            return Err(LedgerError::InvalidCpf);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
