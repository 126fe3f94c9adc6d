//! Address type selector used by sFlow `address` unions

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Address family carried in a record's address-type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    Ipv4,
    Ipv6,
}

impl AddressType {
    /// Wire value of the selector.
    pub const fn code(&self) -> u32 {
        match self {
            AddressType::Ipv4 => 1,
            AddressType::Ipv6 => 2,
        }
    }

    /// Parse the selector; any value other than 1 or 2 is invalid.
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(AddressType::Ipv4),
            2 => Some(AddressType::Ipv6),
            _ => None,
        }
    }

    /// Address width in bytes.
    pub const fn width(&self) -> usize {
        match self {
            AddressType::Ipv4 => 4,
            AddressType::Ipv6 => 16,
        }
    }

    /// Family of an in-memory address.
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressType::Ipv4,
            IpAddr::V6(_) => AddressType::Ipv6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn only_one_and_two_are_valid(code in any::<u64>()) {
            let parsed = AddressType::from_code(code);
            match code {
                1 => prop_assert_eq!(parsed, Some(AddressType::Ipv4)),
                2 => prop_assert_eq!(parsed, Some(AddressType::Ipv6)),
                _ => prop_assert!(parsed.is_none()),
            }
        }
    }

    #[test]
    fn codes_and_widths() {
        assert_eq!(AddressType::Ipv4.code(), 1);
        assert_eq!(AddressType::Ipv6.code(), 2);
        assert_eq!(AddressType::Ipv4.width(), 4);
        assert_eq!(AddressType::Ipv6.width(), 16);
        assert_eq!(AddressType::of(&"10.1.2.3".parse().unwrap()), AddressType::Ipv4);
        assert_eq!(AddressType::of(&"2001:db8::1".parse().unwrap()), AddressType::Ipv6);
    }
}
