//! Wire model of the conformance driver protocol: the request/response pair
//! exchanged with a testee program, the wire-format enumeration, the
//! expected-failure list, and a compact seed test message.
//!
//! Messages are hand-written `prost` definitions instead of build-time
//! codegen so the harvested byte layout is pinned in source. Field numbers
//! match the upstream conformance protocol, and the seed message uses the
//! upstream test-message numbers, so payloads serialized here decode
//! unchanged under the upstream descriptors.

use prost::Message;

/// Fully qualified type name of the seed test message, carried in
/// `ConformanceRequest::message_type` so a replaying testee knows which
/// descriptor to parse the inner payload with.
pub const TEST_MESSAGE_TYPE: &str = "protobuf_test_messages.proto3.TestAllTypesProto3";

// ---------------------------------------------------------------------------
// Driver protocol
// ---------------------------------------------------------------------------

/// One generated test input, as handed to a testee program.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConformanceRequest {
    #[prost(enumeration = "WireFormat", tag = "3")]
    pub requested_output_format: i32,
    #[prost(string, tag = "4")]
    pub message_type: String,
    #[prost(oneof = "conformance_request::Payload", tags = "1, 2, 8")]
    pub payload: Option<conformance_request::Payload>,
}

pub mod conformance_request {
    /// Input encoding, one variant per supported format.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(bytes = "vec", tag = "1")]
        ProtobufPayload(Vec<u8>),
        #[prost(string, tag = "2")]
        JsonPayload(String),
        #[prost(string, tag = "8")]
        TextPayload(String),
    }
}

impl ConformanceRequest {
    /// Request carrying raw protobuf bytes as input.
    pub fn protobuf_input(payload: Vec<u8>, output: WireFormat) -> Self {
        Self {
            requested_output_format: output as i32,
            message_type: TEST_MESSAGE_TYPE.to_string(),
            payload: Some(conformance_request::Payload::ProtobufPayload(payload)),
        }
    }

    /// Request carrying a JSON document as input.
    pub fn json_input(json: impl Into<String>, output: WireFormat) -> Self {
        Self {
            requested_output_format: output as i32,
            message_type: TEST_MESSAGE_TYPE.to_string(),
            payload: Some(conformance_request::Payload::JsonPayload(json.into())),
        }
    }

    /// Request carrying a text-format document as input.
    pub fn text_input(text: impl Into<String>, output: WireFormat) -> Self {
        Self {
            requested_output_format: output as i32,
            message_type: TEST_MESSAGE_TYPE.to_string(),
            payload: Some(conformance_request::Payload::TextPayload(text.into())),
        }
    }

    /// Typed view of the requested output format field.
    pub fn output_format(&self) -> WireFormat {
        WireFormat::try_from(self.requested_output_format).unwrap_or(WireFormat::Unspecified)
    }
}

/// Verdict a testee program reports back for one request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConformanceResponse {
    #[prost(oneof = "conformance_response::Result", tags = "1, 2, 3, 4, 5, 6, 8")]
    pub result: Option<conformance_response::Result>,
}

pub mod conformance_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(string, tag = "1")]
        ParseError(String),
        #[prost(string, tag = "2")]
        RuntimeError(String),
        #[prost(bytes = "vec", tag = "3")]
        ProtobufPayload(Vec<u8>),
        #[prost(string, tag = "4")]
        JsonPayload(String),
        #[prost(string, tag = "5")]
        Skipped(String),
        #[prost(string, tag = "6")]
        SerializeError(String),
        #[prost(string, tag = "8")]
        TextPayload(String),
    }
}

impl ConformanceResponse {
    /// Field number of the populated result variant, `0` when the oneof is
    /// unset. This is the number quoted by the driver's "got type N"
    /// diagnostics; an untouched response buffer decodes to tag `0`.
    pub fn result_tag(&self) -> u32 {
        match &self.result {
            None => 0,
            Some(conformance_response::Result::ParseError(_)) => 1,
            Some(conformance_response::Result::RuntimeError(_)) => 2,
            Some(conformance_response::Result::ProtobufPayload(_)) => 3,
            Some(conformance_response::Result::JsonPayload(_)) => 4,
            Some(conformance_response::Result::Skipped(_)) => 5,
            Some(conformance_response::Result::SerializeError(_)) => 6,
            Some(conformance_response::Result::TextPayload(_)) => 8,
        }
    }
}

/// Encodings the driver can request from a testee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum WireFormat {
    Unspecified = 0,
    Protobuf = 1,
    Json = 2,
    Jspb = 3,
    TextFormat = 4,
}

/// Expected-failure list a driver run accepts. The harvesting flow always
/// passes an empty one.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FailureSet {
    #[prost(string, repeated, tag = "1")]
    pub failure: Vec<String>,
}

// ---------------------------------------------------------------------------
// Seed test message
// ---------------------------------------------------------------------------

/// Subset of the upstream proto3 test message the shipped rosters draw
/// logical inputs from. Field numbers are the upstream ones, so an encoded
/// seed parses unchanged under the full upstream descriptor.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TestAllTypesProto3 {
    #[prost(int32, tag = "1")]
    pub optional_int32: i32,
    #[prost(int64, tag = "2")]
    pub optional_int64: i64,
    #[prost(bool, tag = "13")]
    pub optional_bool: bool,
    #[prost(string, tag = "14")]
    pub optional_string: String,
    #[prost(bytes = "vec", tag = "15")]
    pub optional_bytes: Vec<u8>,
    #[prost(message, optional, tag = "18")]
    pub optional_nested_message: Option<test_all_types_proto3::NestedMessage>,
    #[prost(enumeration = "test_all_types_proto3::NestedEnum", tag = "21")]
    pub optional_nested_enum: i32,
    #[prost(int32, repeated, tag = "31")]
    pub repeated_int32: Vec<i32>,
    #[prost(string, repeated, tag = "44")]
    pub repeated_string: Vec<String>,
}

pub mod test_all_types_proto3 {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct NestedMessage {
        #[prost(int32, tag = "1")]
        pub a: i32,
        #[prost(message, optional, boxed, tag = "2")]
        pub corecursive: Option<Box<super::TestAllTypesProto3>>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum NestedEnum {
        Foo = 0,
        Bar = 1,
        Baz = 2,
        Neg = -1,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
