//! Extended socket records for IPv4 and IPv6, and their proxy variants.

use serde::Serialize;
use std::net::{Ipv4Addr, Ipv6Addr};

use super::TypedRecord;
use crate::Result;
use crate::types::{AddressWidth, FieldRef, FieldSpec, Fields, Schema};

static SOCKET_IPV4: Schema = Schema::new(
    "ExtendedSocketIPv4Flow",
    &[
        FieldSpec::u32("protocol"),
        FieldSpec::address("local_ip", AddressWidth::V4),
        FieldSpec::address("remote_ip", AddressWidth::V4),
        FieldSpec::u32("local_port"),
        FieldSpec::u32("remote_port"),
    ],
);

static SOCKET_IPV6: Schema = Schema::new(
    "ExtendedSocketIPv6Flow",
    &[
        FieldSpec::u32("protocol"),
        FieldSpec::address("local_ip", AddressWidth::V6),
        FieldSpec::address("remote_ip", AddressWidth::V6),
        FieldSpec::u32("local_port"),
        FieldSpec::u32("remote_port"),
    ],
);

static PROXY_SOCKET_IPV4: Schema =
    Schema::new("ExtendedProxySocketIPv4Flow", &[FieldSpec::nested("socket", &SOCKET_IPV4)]);

static PROXY_SOCKET_IPV6: Schema =
    Schema::new("ExtendedProxySocketIPv6Flow", &[FieldSpec::nested("socket", &SOCKET_IPV6)]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtendedSocketIpv4Flow {
    pub protocol: u32,
    pub local_ip: Ipv4Addr,
    pub remote_ip: Ipv4Addr,
    pub local_port: u32,
    pub remote_port: u32,
}

impl Default for ExtendedSocketIpv4Flow {
    fn default() -> Self {
        Self {
            protocol: 0,
            local_ip: Ipv4Addr::UNSPECIFIED,
            remote_ip: Ipv4Addr::UNSPECIFIED,
            local_port: 0,
            remote_port: 0,
        }
    }
}

impl TypedRecord for ExtendedSocketIpv4Flow {
    const TYPE_CODE: u32 = 2100;

    fn schema() -> &'static Schema {
        &SOCKET_IPV4
    }

    fn from_fields(fields: Fields) -> Result<Self> {
        Ok(Self {
            protocol: fields.u32(FieldRef(0))?,
            local_ip: fields.ipv4(FieldRef(1))?,
            remote_ip: fields.ipv4(FieldRef(2))?,
            local_port: fields.u32(FieldRef(3))?,
            remote_port: fields.u32(FieldRef(4))?,
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new(&SOCKET_IPV4)
            .with(self.protocol)
            .with(self.local_ip)
            .with(self.remote_ip)
            .with(self.local_port)
            .with(self.remote_port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtendedSocketIpv6Flow {
    pub protocol: u32,
    pub local_ip: Ipv6Addr,
    pub remote_ip: Ipv6Addr,
    pub local_port: u32,
    pub remote_port: u32,
}

impl Default for ExtendedSocketIpv6Flow {
    fn default() -> Self {
        Self {
            protocol: 0,
            local_ip: Ipv6Addr::UNSPECIFIED,
            remote_ip: Ipv6Addr::UNSPECIFIED,
            local_port: 0,
            remote_port: 0,
        }
    }
}

impl TypedRecord for ExtendedSocketIpv6Flow {
    const TYPE_CODE: u32 = 2101;

    fn schema() -> &'static Schema {
        &SOCKET_IPV6
    }

    fn from_fields(fields: Fields) -> Result<Self> {
        Ok(Self {
            protocol: fields.u32(FieldRef(0))?,
            local_ip: fields.ipv6(FieldRef(1))?,
            remote_ip: fields.ipv6(FieldRef(2))?,
            local_port: fields.u32(FieldRef(3))?,
            remote_port: fields.u32(FieldRef(4))?,
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new(&SOCKET_IPV6)
            .with(self.protocol)
            .with(self.local_ip)
            .with(self.remote_ip)
            .with(self.local_port)
            .with(self.remote_port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExtendedProxySocketIpv4Flow {
    pub socket: ExtendedSocketIpv4Flow,
}

impl TypedRecord for ExtendedProxySocketIpv4Flow {
    const TYPE_CODE: u32 = 2102;

    fn schema() -> &'static Schema {
        &PROXY_SOCKET_IPV4
    }

    fn from_fields(mut fields: Fields) -> Result<Self> {
        let socket = ExtendedSocketIpv4Flow::from_fields(fields.take_record(FieldRef(0))?)?;
        Ok(Self { socket })
    }

    fn to_fields(&self) -> Fields {
        Fields::new(&PROXY_SOCKET_IPV4).with(self.socket.to_fields())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExtendedProxySocketIpv6Flow {
    pub socket: ExtendedSocketIpv6Flow,
}

impl TypedRecord for ExtendedProxySocketIpv6Flow {
    const TYPE_CODE: u32 = 2103;

    fn schema() -> &'static Schema {
        &PROXY_SOCKET_IPV6
    }

    fn from_fields(mut fields: Fields) -> Result<Self> {
        let socket = ExtendedSocketIpv6Flow::from_fields(fields.take_record(FieldRef(0))?)?;
        Ok(Self { socket })
    }

    fn to_fields(&self) -> Fields {
        Fields::new(&PROXY_SOCKET_IPV6).with(self.socket.to_fields())
    }
}
