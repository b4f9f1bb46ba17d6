// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! A minimal media-type value type.
//!
//! Only the subset needed for Thrift content negotiation is implemented:
//! `type "/" subtype *( ";" parameter )`, wildcard ranges on the request
//! side, and parameter-aware matching. Quality values are carried as plain
//! parameters and ignored by matching.

use std::fmt;
use std::str::FromStr;

use crate::errors::CodecError;

const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    top: String,
    sub: String,
    params: Vec<(String, String)>,
}

impl MediaType {
    pub fn new(top: &str, sub: &str) -> Self {
        Self {
            top: top.to_ascii_lowercase(),
            sub: sub.to_ascii_lowercase(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn top(&self) -> &str {
        &self.top
    }

    pub fn sub(&self) -> &str {
        &self.sub
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether this (concrete, server-side) media type accepts the given
    /// request-side type or range.
    ///
    /// Type and subtype must match, with `*` honored on the request side.
    /// A parameter present on both sides must agree case-insensitively; a
    /// parameter present on only one side is ignored, so a bare
    /// `application/x-thrift` accepts every protocol variant.
    pub fn accepts(&self, request: &MediaType) -> bool {
        if request.top != WILDCARD && request.top != self.top {
            return false;
        }
        if request.sub != WILDCARD && request.sub != self.sub {
            return false;
        }
        for (name, value) in &request.params {
            if let Some(own) = self.param(name) {
                if !own.eq_ignore_ascii_case(value) {
                    return false;
                }
            }
        }
        true
    }
}

impl FromStr for MediaType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pieces = s.split(';');
        let essence = pieces.next().unwrap_or_default().trim();
        let (top, sub) = essence
            .split_once('/')
            .ok_or_else(|| CodecError::InvalidMediaType(s.to_string()))?;
        if top.is_empty() || sub.is_empty() {
            return Err(CodecError::InvalidMediaType(s.to_string()));
        }

        let mut media_type = MediaType::new(top.trim(), sub.trim());
        for piece in pieces {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            let (name, value) = piece
                .split_once('=')
                .ok_or_else(|| CodecError::InvalidMediaType(s.to_string()))?;
            let value = value.trim().trim_matches('"');
            media_type = media_type.with_param(name.trim(), value);
        }
        Ok(media_type)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.top, self.sub)?;
        for (name, value) in &self.params {
            write!(f, "; {}={}", name, value)?;
        }
        Ok(())
    }
}
