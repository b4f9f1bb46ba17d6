// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Client-side encode/decode helpers for building request bodies and
//! picking apart response bodies in tests.

use thrift::protocol::{TInputProtocol, TMessageIdentifier, TMessageType, TOutputProtocol};
use thrift::ApplicationError;

use tram_protocol::SerializationFormat;

/// Encodes one complete message: envelope, payload struct, message end.
pub fn encode_message(
    format: SerializationFormat,
    name: &str,
    message_type: TMessageType,
    seq_id: i32,
    write_payload: impl FnOnce(&mut dyn TOutputProtocol) -> thrift::Result<()>,
) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut o_prot = format.writer(&mut buf);
        o_prot
            .write_message_begin(&TMessageIdentifier::new(name, message_type, seq_id))
            .expect("write message begin");
        write_payload(&mut *o_prot).expect("write payload");
        o_prot.write_message_end().expect("write message end");
        o_prot.flush().expect("flush");
    }
    buf
}

/// [`encode_message`] with type `CALL`.
pub fn encode_call(
    format: SerializationFormat,
    name: &str,
    seq_id: i32,
    write_payload: impl FnOnce(&mut dyn TOutputProtocol) -> thrift::Result<()>,
) -> Vec<u8> {
    encode_message(format, name, TMessageType::Call, seq_id, write_payload)
}

/// Decodes one complete message, handing the payload to `read_payload`.
pub fn decode_message<T>(
    format: SerializationFormat,
    body: &[u8],
    read_payload: impl FnOnce(&mut dyn TInputProtocol) -> thrift::Result<T>,
) -> (TMessageIdentifier, T) {
    let mut i_prot = format.reader(body);
    let ident = i_prot.read_message_begin().expect("read message begin");
    let payload = read_payload(&mut *i_prot).expect("read payload");
    i_prot.read_message_end().expect("read message end");
    (ident, payload)
}

/// Decodes an `EXCEPTION` envelope and its application error.
pub fn decode_application_error(
    format: SerializationFormat,
    body: &[u8],
) -> (TMessageIdentifier, ApplicationError) {
    decode_message(format, body, |i_prot| {
        thrift::Error::read_application_error_from_in_protocol(i_prot)
    })
}
