//! # Ledger Identifiers
//!
//! Account ids are written `name@domain`, asset ids `name#domain`. Both are
//! globally unique; the domain part references a [`Domain`](crate::Domain)
//! that must exist before the entity can be created.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A domain identifier.
pub type DomainId = String;

/// A role identifier.
pub type RoleId = String;

/// Errors from parsing structured identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdParseError {
    /// The separator character was not found.
    #[error("Missing '{separator}' separator in id '{input}'")]
    MissingSeparator { separator: char, input: String },

    /// The name or domain part was empty.
    #[error("Empty {part} in id '{input}'")]
    EmptyPart { part: &'static str, input: String },
}

/// Globally unique account identifier, `name@domain`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId {
    /// Account name, unique within its domain.
    pub name: String,
    /// Domain the account belongs to.
    pub domain: DomainId,
}

impl AccountId {
    /// Create an account id from its parts.
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.domain)
    }
}

impl FromStr for AccountId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, domain) = split_id(s, '@')?;
        Ok(Self {
            name: name.to_owned(),
            domain: domain.to_owned(),
        })
    }
}

/// Globally unique asset identifier, `name#domain`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId {
    /// Asset name, unique within its domain.
    pub name: String,
    /// Domain the asset is defined in.
    pub domain: DomainId,
}

impl AssetId {
    /// Create an asset id from its parts.
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.domain)
    }
}

impl FromStr for AssetId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, domain) = split_id(s, '#')?;
        Ok(Self {
            name: name.to_owned(),
            domain: domain.to_owned(),
        })
    }
}

fn split_id(input: &str, separator: char) -> Result<(&str, &str), IdParseError> {
    let (name, domain) = input
        .split_once(separator)
        .ok_or_else(|| IdParseError::MissingSeparator {
            separator,
            input: input.to_owned(),
        })?;
    if name.is_empty() {
        return Err(IdParseError::EmptyPart {
            part: "name",
            input: input.to_owned(),
        });
    }
    if domain.is_empty() {
        return Err(IdParseError::EmptyPart {
            part: "domain",
            input: input.to_owned(),
        });
    }
    Ok((name, domain))
}
