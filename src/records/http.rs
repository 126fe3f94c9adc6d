//! HTTP request flow and HTTP counter records.

use serde::Serialize;

use super::{TypedRecord, serialize_lossy};
use crate::Result;
use crate::types::{FieldRef, FieldSpec, Fields, Schema, wire_len};

static HTTP_REQUEST: Schema = Schema::new(
    "HTTPRequestFlow",
    &[
        FieldSpec::u32("method"),
        FieldSpec::u32("protocol"),
        FieldSpec::u32("uri_len"),
        FieldSpec::opaque("uri", FieldRef(2)),
        FieldSpec::u32("host_len"),
        FieldSpec::opaque("host", FieldRef(4)),
        FieldSpec::u32("referer_len"),
        FieldSpec::opaque("referer", FieldRef(6)),
        FieldSpec::u32("user_agent_len"),
        FieldSpec::opaque("user_agent", FieldRef(8)),
        FieldSpec::u32("xff_len"),
        FieldSpec::opaque("xff", FieldRef(10)),
        FieldSpec::u32("auth_user_len"),
        FieldSpec::opaque("auth_user", FieldRef(12)),
        FieldSpec::u32("mime_type_len"),
        FieldSpec::opaque("mime_type", FieldRef(14)),
        FieldSpec::u64("req_bytes"),
        FieldSpec::u64("resp_bytes"),
        FieldSpec::u32("duration"),
        FieldSpec::u32("status"),
    ],
);

static HTTP_COUNTER: Schema = Schema::new(
    "HTTPCounter",
    &[
        FieldSpec::u32("method_option_count"),
        FieldSpec::u32("method_get_count"),
        FieldSpec::u32("method_head_count"),
        FieldSpec::u32("method_post_count"),
        FieldSpec::u32("method_put_count"),
        FieldSpec::u32("method_delete_count"),
        FieldSpec::u32("method_trace_count"),
        FieldSpec::u32("method_connect_count"),
        FieldSpec::u32("method_other_count"),
        FieldSpec::u32("status_1xx_count"),
        FieldSpec::u32("status_2xx_count"),
        FieldSpec::u32("status_3xx_count"),
        FieldSpec::u32("status_4xx_count"),
        FieldSpec::u32("status_5xx_count"),
        FieldSpec::u32("status_other_count"),
    ],
);

/// Request method codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HttpMethod {
    Other = 0,
    Options = 1,
    Get = 2,
    Head = 3,
    Post = 4,
    Put = 5,
    Delete = 6,
    Trace = 7,
    Connect = 8,
}

impl HttpMethod {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => HttpMethod::Other,
            1 => HttpMethod::Options,
            2 => HttpMethod::Get,
            3 => HttpMethod::Head,
            4 => HttpMethod::Post,
            5 => HttpMethod::Put,
            6 => HttpMethod::Delete,
            7 => HttpMethod::Trace,
            8 => HttpMethod::Connect,
            _ => return None,
        })
    }
}

/// One sampled HTTP operation. Header values are kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HttpRequestFlow {
    pub method: u32,
    /// major * 1000 + minor, so HTTP/1.1 is 1001
    pub protocol: u32,
    #[serde(serialize_with = "serialize_lossy")]
    pub uri: Vec<u8>,
    #[serde(serialize_with = "serialize_lossy")]
    pub host: Vec<u8>,
    #[serde(serialize_with = "serialize_lossy")]
    pub referer: Vec<u8>,
    #[serde(serialize_with = "serialize_lossy")]
    pub user_agent: Vec<u8>,
    #[serde(serialize_with = "serialize_lossy")]
    pub xff: Vec<u8>,
    #[serde(serialize_with = "serialize_lossy")]
    pub auth_user: Vec<u8>,
    #[serde(serialize_with = "serialize_lossy")]
    pub mime_type: Vec<u8>,
    pub req_bytes: u64,
    pub resp_bytes: u64,
    /// Microseconds
    pub duration: u32,
    pub status: u32,
}

impl HttpRequestFlow {
    pub fn method_kind(&self) -> Option<HttpMethod> {
        HttpMethod::from_code(self.method)
    }
}

impl TypedRecord for HttpRequestFlow {
    const TYPE_CODE: u32 = 2206;

    fn schema() -> &'static Schema {
        &HTTP_REQUEST
    }

    fn from_fields(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            method: fields.u32(FieldRef(0))?,
            protocol: fields.u32(FieldRef(1))?,
            uri: fields.take_bytes(FieldRef(3))?,
            host: fields.take_bytes(FieldRef(5))?,
            referer: fields.take_bytes(FieldRef(7))?,
            user_agent: fields.take_bytes(FieldRef(9))?,
            xff: fields.take_bytes(FieldRef(11))?,
            auth_user: fields.take_bytes(FieldRef(13))?,
            mime_type: fields.take_bytes(FieldRef(15))?,
            req_bytes: fields.u64(FieldRef(16))?,
            resp_bytes: fields.u64(FieldRef(17))?,
            duration: fields.u32(FieldRef(18))?,
            status: fields.u32(FieldRef(19))?,
        })
    }

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new(&HTTP_REQUEST).with(self.method).with(self.protocol);
        for text in [
            &self.uri,
            &self.host,
            &self.referer,
            &self.user_agent,
            &self.xff,
            &self.auth_user,
            &self.mime_type,
        ] {
            fields.push(wire_len(text.len()));
            fields.push(text.clone());
        }
        fields
            .with(self.req_bytes)
            .with(self.resp_bytes)
            .with(self.duration)
            .with(self.status)
    }
}

/// Per-method and per-status-class request counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HttpCounter {
    pub method_option_count: u32,
    pub method_get_count: u32,
    pub method_head_count: u32,
    pub method_post_count: u32,
    pub method_put_count: u32,
    pub method_delete_count: u32,
    pub method_trace_count: u32,
    pub method_connect_count: u32,
    pub method_other_count: u32,
    pub status_1xx_count: u32,
    pub status_2xx_count: u32,
    pub status_3xx_count: u32,
    pub status_4xx_count: u32,
    pub status_5xx_count: u32,
    pub status_other_count: u32,
}

impl TypedRecord for HttpCounter {
    const TYPE_CODE: u32 = 2201;

    fn schema() -> &'static Schema {
        &HTTP_COUNTER
    }

    fn from_fields(fields: Fields) -> Result<Self> {
        let at = |i| fields.u32(FieldRef(i));
        Ok(Self {
            method_option_count: at(0)?,
            method_get_count: at(1)?,
            method_head_count: at(2)?,
            method_post_count: at(3)?,
            method_put_count: at(4)?,
            method_delete_count: at(5)?,
            method_trace_count: at(6)?,
            method_connect_count: at(7)?,
            method_other_count: at(8)?,
            status_1xx_count: at(9)?,
            status_2xx_count: at(10)?,
            status_3xx_count: at(11)?,
            status_4xx_count: at(12)?,
            status_5xx_count: at(13)?,
            status_other_count: at(14)?,
        })
    }

    fn to_fields(&self) -> Fields {
        [
            self.method_option_count,
            self.method_get_count,
            self.method_head_count,
            self.method_post_count,
            self.method_put_count,
            self.method_delete_count,
            self.method_trace_count,
            self.method_connect_count,
            self.method_other_count,
            self.status_1xx_count,
            self.status_2xx_count,
            self.status_3xx_count,
            self.status_4xx_count,
            self.status_5xx_count,
            self.status_other_count,
        ]
        .into_iter()
        .fold(Fields::new(&HTTP_COUNTER), Fields::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecoderLimits;

    fn request() -> HttpRequestFlow {
        HttpRequestFlow {
            method: HttpMethod::Get.code(),
            protocol: 1001,
            uri: b"/index.html".to_vec(),
            host: b"example.org".to_vec(),
            user_agent: b"curl/8.5".to_vec(),
            mime_type: b"text/html".to_vec(),
            req_bytes: 0,
            resp_bytes: 5120,
            duration: 830,
            status: 200,
            ..Default::default()
        }
    }

    #[test]
    fn request_round_trip_with_empty_strings() {
        let flow = request();
        assert!(flow.referer.is_empty());

        let framed = flow.encode().unwrap();
        // 11 -> 12, 11 -> 12, 8 -> 8, 9 -> 12 after padding
        let expected = 8 + 8 + 7 * 4 + (12 + 12 + 8 + 12) + 16 + 8;
        assert_eq!(framed.len(), expected);
        assert_eq!(flow.encoded_len().unwrap(), expected - 8);

        let decoded = HttpRequestFlow::decode(&mut &framed[8..], &DecoderLimits::DEFAULT).unwrap();
        assert_eq!(decoded, flow);
        assert_eq!(decoded.method_kind(), Some(HttpMethod::Get));
    }

    #[test]
    fn unknown_method_code() {
        let flow = HttpRequestFlow { method: 42, ..Default::default() };
        assert_eq!(flow.method_kind(), None);
        assert_eq!(HttpMethod::from_code(8), Some(HttpMethod::Connect));
    }

    #[test]
    fn counter_round_trip() {
        let counter = HttpCounter {
            method_get_count: 900,
            method_post_count: 40,
            status_2xx_count: 920,
            status_5xx_count: 3,
            ..Default::default()
        };

        let framed = counter.encode().unwrap();
        assert_eq!(framed.len(), 8 + 15 * 4);
        let decoded = HttpCounter::decode(&mut &framed[8..], &DecoderLimits::DEFAULT).unwrap();
        assert_eq!(decoded, counter);
    }
}
