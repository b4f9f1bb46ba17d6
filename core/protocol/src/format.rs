// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Supported Thrift wire formats and the per-endpoint allowed set.

use std::fmt;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thrift::protocol::{
    TBinaryInputProtocol, TBinaryOutputProtocol, TCompactInputProtocol, TCompactOutputProtocol,
    TInputProtocol, TOutputProtocol,
};

use crate::media_type::MediaType;

lazy_static! {
    static ref BINARY_MEDIA_TYPES: [MediaType; 2] = [
        MediaType::new("application", "x-thrift").with_param("protocol", "TBINARY"),
        MediaType::new("application", "vnd.apache.thrift.binary"),
    ];
    static ref COMPACT_MEDIA_TYPES: [MediaType; 2] = [
        MediaType::new("application", "x-thrift").with_param("protocol", "TCOMPACT"),
        MediaType::new("application", "vnd.apache.thrift.compact"),
    ];
}

/// Media types that never name a Thrift protocol but are common enough from
/// non-Thrift clients that the request proceeds under the default format.
const VAGUE_MEDIA_TYPES: [(&str, &str); 2] =
    [("text", "plain"), ("application", "octet-stream")];

/// One Thrift encoding: a name, a set of acceptable media types, a canonical
/// response media type, and a protocol factory over byte buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializationFormat {
    Binary,
    Compact,
}

impl SerializationFormat {
    /// All formats this crate can encode and decode, default-candidate first.
    pub fn values() -> [SerializationFormat; 2] {
        [SerializationFormat::Binary, SerializationFormat::Compact]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SerializationFormat::Binary => "binary",
            SerializationFormat::Compact => "compact",
        }
    }

    /// Media types a request may carry to select this format.
    pub fn media_types(&self) -> &'static [MediaType] {
        match self {
            SerializationFormat::Binary => &*BINARY_MEDIA_TYPES,
            SerializationFormat::Compact => &*COMPACT_MEDIA_TYPES,
        }
    }

    /// The canonical media type stamped on responses encoded in this format.
    pub fn media_type(&self) -> &'static MediaType {
        &self.media_types()[0]
    }

    /// [`media_type`](Self::media_type) rendered as a header value.
    pub fn media_type_header(&self) -> &'static str {
        match self {
            SerializationFormat::Binary => "application/x-thrift; protocol=TBINARY",
            SerializationFormat::Compact => "application/x-thrift; protocol=TCOMPACT",
        }
    }

    pub fn is_accepted(&self, request: &MediaType) -> bool {
        self.media_types().iter().any(|mt| mt.accepts(request))
    }

    /// Binds a reader of this format over an aggregated request body.
    pub fn reader<'a>(&self, buf: &'a [u8]) -> Box<dyn TInputProtocol + 'a> {
        match self {
            SerializationFormat::Binary => Box::new(TBinaryInputProtocol::new(buf, true)),
            SerializationFormat::Compact => Box::new(TCompactInputProtocol::new(buf)),
        }
    }

    /// Binds a writer of this format over an output buffer.
    pub fn writer<'a>(&self, buf: &'a mut Vec<u8>) -> Box<dyn TOutputProtocol + 'a> {
        match self {
            SerializationFormat::Binary => Box::new(TBinaryOutputProtocol::new(buf, true)),
            SerializationFormat::Compact => Box::new(TCompactOutputProtocol::new(buf)),
        }
    }
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The ordered set of formats one endpoint accepts, default first.
///
/// Lookup order is fixed at construction so that a vague Content-Type such as
/// a bare `application/x-thrift` always resolves to the same format.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    formats: Vec<SerializationFormat>,
}

impl FormatRegistry {
    pub fn new(
        default: SerializationFormat,
        others: impl IntoIterator<Item = SerializationFormat>,
    ) -> Self {
        let mut formats = vec![default];
        for format in others {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Self { formats }
    }

    pub fn default_format(&self) -> SerializationFormat {
        self.formats[0]
    }

    pub fn allowed(&self) -> &[SerializationFormat] {
        &self.formats
    }

    /// The first allowed format whose media types accept `content_type`.
    pub fn pick(&self, content_type: &MediaType) -> Option<SerializationFormat> {
        self.formats
            .iter()
            .copied()
            .find(|f| f.is_accepted(content_type))
    }

    /// Resolves the request Content-Type to a format.
    ///
    /// A missing or unparseable header selects the default. A parsed header
    /// that matches no allowed format falls back to the default only for the
    /// vague media types non-Thrift clients tend to send; everything else is
    /// rejected with `None`.
    pub fn negotiate(&self, content_type: Option<&str>) -> Option<SerializationFormat> {
        let Some(raw) = content_type else {
            return Some(self.default_format());
        };
        let Ok(parsed) = raw.parse::<MediaType>() else {
            return Some(self.default_format());
        };

        if let Some(format) = self.pick(&parsed) {
            return Some(format);
        }

        VAGUE_MEDIA_TYPES
            .iter()
            .any(|(top, sub)| parsed.top() == *top && parsed.sub() == *sub)
            .then(|| self.default_format())
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new(SerializationFormat::Binary, SerializationFormat::values())
    }
}
