// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Framing helpers for Thrift reply and exception envelopes.
//!
//! A response body is exactly one `[writeMessageBegin, struct,
//! writeMessageEnd]` sequence in the chosen format; nothing else is ever
//! written. The output buffer is allocated here and handed to the caller on
//! success; on failure it is dropped with nothing leaked.

use thrift::protocol::{TMessageIdentifier, TMessageType, TOutputProtocol};
use thrift::ApplicationError;

use crate::format::SerializationFormat;
use crate::message::ThriftResult;

/// Initial response-buffer capacity; replies are typically small.
const ENCODE_BUFFER_CAPACITY: usize = 128;

pub fn message_type_name(message_type: TMessageType) -> &'static str {
    match message_type {
        TMessageType::Call => "CALL",
        TMessageType::Reply => "REPLY",
        TMessageType::Exception => "EXCEPTION",
        TMessageType::OneWay => "ONEWAY",
    }
}

/// Encodes a `REPLY` envelope followed by the result struct.
///
/// Used both for successful returns and for declared exceptions, which
/// travel inside the result struct rather than as an `EXCEPTION` envelope.
pub fn encode_reply(
    format: SerializationFormat,
    name: &str,
    seq_id: i32,
    result: &dyn ThriftResult,
) -> thrift::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(ENCODE_BUFFER_CAPACITY);
    {
        let mut o_prot = format.writer(&mut buf);
        o_prot.write_message_begin(&TMessageIdentifier::new(name, TMessageType::Reply, seq_id))?;
        result.write(&mut *o_prot)?;
        o_prot.write_message_end()?;
        o_prot.flush()?;
    }
    Ok(buf)
}

/// Encodes an `EXCEPTION` envelope carrying a Thrift application exception.
pub fn encode_exception(
    format: SerializationFormat,
    name: &str,
    seq_id: i32,
    exception: &ApplicationError,
) -> thrift::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(ENCODE_BUFFER_CAPACITY);
    {
        let mut o_prot = format.writer(&mut buf);
        o_prot.write_message_begin(&TMessageIdentifier::new(
            name,
            TMessageType::Exception,
            seq_id,
        ))?;
        thrift::Error::write_application_error_to_out_protocol(exception, &mut *o_prot)?;
        o_prot.write_message_end()?;
        o_prot.flush()?;
    }
    Ok(buf)
}
