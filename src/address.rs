//! Email address representation and parsing.

use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use email_address::EmailAddress;

/// An email address with an optional display name.
///
/// Parsed from either _Some Name \<user@domain.tld\>_ or a bare
/// _user@domain.tld_ string:
///
/// ```
/// use mailjet_transport::Address;
///
/// let address: Address = "Jane Doe <jane@example.com>".parse().unwrap();
/// assert_eq!(address.name(), Some("Jane Doe"));
/// assert_eq!(address.email(), "jane@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    name: Option<String>,
    email: String,
}

impl Address {
    /// Creates an address from an already validated name and email pair.
    pub fn new<E: Into<String>>(name: Option<String>, email: E) -> Self {
        Address {
            name: name.filter(|n| !n.is_empty()),
            email: email.into(),
        }
    }

    /// The display name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The email part of the address.
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => f.write_str(&self.email),
        }
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.trim();

        let (name, email) = match src.strip_suffix('>') {
            Some(rest) => {
                let (name, email) = rest
                    .rsplit_once('<')
                    .ok_or(AddressError::Unbalanced)?;
                (strip_quotes(name.trim()), email.trim())
            }
            None if src.contains('<') => return Err(AddressError::Unbalanced),
            None => ("", src),
        };

        if email.is_empty() {
            return Err(AddressError::MissingEmail);
        }
        if EmailAddress::from_str(email).is_err() {
            return Err(AddressError::InvalidEmail);
        }

        let name = (!name.is_empty()).then(|| name.to_string());
        Ok(Address::new(name, email))
    }
}

fn strip_quotes(name: &str) -> &str {
    name.strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .unwrap_or(name)
}

/// Errors when parsing an address string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// No email part was present after parsing
    MissingEmail,
    /// The email part is not a valid address
    InvalidEmail,
    /// Unbalanced angle bracket
    Unbalanced,
}

impl StdError for AddressError {}

impl Display for AddressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AddressError::MissingEmail => f.write_str("missing email part"),
            AddressError::InvalidEmail => f.write_str("invalid email address"),
            AddressError::Unbalanced => f.write_str("unbalanced angle bracket"),
        }
    }
}
