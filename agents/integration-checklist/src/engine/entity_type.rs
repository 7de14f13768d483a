//! Entity type taxonomy
//!
//! The categories of scan targets an integration may declare in
//! `entityTypes`. Three tokens (`IP`, `hash`, `*`) are shorthand that the
//! platform expands into concrete types.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Ip,
    IPv4,
    IPv4Cidr,
    IPv6,
    Mac,
    Md5,
    Sha1,
    Sha256,
    Cve,
    Domain,
    Email,
    Hash,
    String,
    Url,
    Any,
}

impl EntityType {
    /// Every known token, in the order used for remediation messages
    pub const ALL: [EntityType; 15] = [
        EntityType::Ip,
        EntityType::IPv4,
        EntityType::IPv4Cidr,
        EntityType::IPv6,
        EntityType::Mac,
        EntityType::Md5,
        EntityType::Sha1,
        EntityType::Sha256,
        EntityType::Cve,
        EntityType::Domain,
        EntityType::Email,
        EntityType::Hash,
        EntityType::String,
        EntityType::Url,
        EntityType::Any,
    ];

    /// Types that name exactly one kind of entity
    pub const CONCRETE: [EntityType; 12] = [
        EntityType::IPv4,
        EntityType::IPv4Cidr,
        EntityType::IPv6,
        EntityType::Mac,
        EntityType::Md5,
        EntityType::Sha1,
        EntityType::Sha256,
        EntityType::Cve,
        EntityType::Domain,
        EntityType::Email,
        EntityType::String,
        EntityType::Url,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Ip => "IP",
            EntityType::IPv4 => "IPv4",
            EntityType::IPv4Cidr => "IPv4CIDR",
            EntityType::IPv6 => "IPv6",
            EntityType::Mac => "MAC",
            EntityType::Md5 => "MD5",
            EntityType::Sha1 => "SHA1",
            EntityType::Sha256 => "SHA256",
            EntityType::Cve => "cve",
            EntityType::Domain => "domain",
            EntityType::Email => "email",
            EntityType::Hash => "hash",
            EntityType::String => "string",
            EntityType::Url => "url",
            EntityType::Any => "*",
        }
    }

    pub fn is_expandable(&self) -> bool {
        matches!(self, EntityType::Ip | EntityType::Hash | EntityType::Any)
    }

    /// The concrete types a shorthand token stands for (empty for concrete types)
    pub fn expansion(&self) -> &'static [EntityType] {
        match self {
            EntityType::Ip => &[EntityType::IPv4, EntityType::IPv6],
            EntityType::Hash => &[EntityType::Md5, EntityType::Sha1, EntityType::Sha256],
            EntityType::Any => &Self::CONCRETE,
            _ => &[],
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token matching is exact: casing matters.
impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown entity type: {}", s))
    }
}

/// Join types as `"IPv4", "IPv6"` for remediation messages
pub fn quoted_list(types: &[EntityType]) -> String {
    types
        .iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!("IPv4".parse::<EntityType>().unwrap(), EntityType::IPv4);
        assert_eq!("*".parse::<EntityType>().unwrap(), EntityType::Any);
        assert!("ipv4".parse::<EntityType>().is_err());
        assert!("Domain".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_every_token_round_trips_through_as_str() {
        for t in EntityType::ALL {
            assert_eq!(t.as_str().parse::<EntityType>().unwrap(), t);
        }
    }

    #[test]
    fn test_expansions() {
        assert_eq!(EntityType::Ip.expansion(), &[EntityType::IPv4, EntityType::IPv6]);
        assert_eq!(EntityType::Hash.expansion().len(), 3);
        assert_eq!(EntityType::Any.expansion(), &EntityType::CONCRETE);
        assert!(EntityType::Domain.expansion().is_empty());
        assert!(EntityType::CONCRETE.iter().all(|t| !t.is_expandable()));
    }

    #[test]
    fn test_quoted_list() {
        assert_eq!(
            quoted_list(&[EntityType::Md5, EntityType::Sha1]),
            "\"MD5\", \"SHA1\""
        );
    }
}
