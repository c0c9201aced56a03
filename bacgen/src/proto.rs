//! Wire types for the event store's Streams gRPC service.
//!
//! A hand-maintained mirror of the subset of the `event_store.client`
//! protocol needed to append events, kept in the shape `prost-build` emits
//! so it can be regenerated from the upstream definitions if the subset
//! ever grows.

/// An empty placeholder, used where the protocol marks an option present
/// without carrying a value.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct Empty {}

/// Names the stream an operation applies to.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct StreamIdentifier {
    /// The stream name as raw bytes. Lower tags are reserved by the
    /// protocol.
    #[prost(bytes = "vec", tag = "3")]
    pub(crate) stream_name: ::prost::alloc::vec::Vec<u8>,
}

/// An event identifier, either structured or in string form.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct Uuid {
    #[prost(oneof = "uuid::Value", tags = "1, 2")]
    pub(crate) value: ::core::option::Option<uuid::Value>,
}
/// Nested message and enum types included in `Uuid`.
pub(crate) mod uuid {
    /// The two halves of a UUID as signed integers.
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub(crate) struct Structured {
        /// The most significant 64 bits.
        #[prost(int64, tag = "1")]
        pub(crate) most_significant_bits: i64,
        /// The least significant 64 bits.
        #[prost(int64, tag = "2")]
        pub(crate) least_significant_bits: i64,
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub(crate) enum Value {
        /// A UUID split into its two halves.
        #[prost(message, tag = "1")]
        Structured(Structured),
        /// A UUID in canonical hyphenated form.
        #[prost(string, tag = "2")]
        String(::prost::alloc::string::String),
    }
}

/// One frame of the client-streaming `Append` call. The first frame carries
/// the options, each following frame one proposed event.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct AppendReq {
    #[prost(oneof = "append_req::Content", tags = "1, 2")]
    pub(crate) content: ::core::option::Option<append_req::Content>,
}
/// Nested message and enum types included in `AppendReq`.
pub(crate) mod append_req {
    /// Where and under what concurrency expectation to append.
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub(crate) struct Options {
        /// The stream to append to.
        #[prost(message, optional, tag = "1")]
        pub(crate) stream_identifier: ::core::option::Option<super::StreamIdentifier>,
        #[prost(oneof = "options::ExpectedStreamRevision", tags = "2, 3, 4, 5")]
        pub(crate) expected_stream_revision:
            ::core::option::Option<options::ExpectedStreamRevision>,
    }
    /// Nested message and enum types included in `Options`.
    pub(crate) mod options {
        /// The optimistic-concurrency check applied before the append.
        #[allow(clippy::derive_partial_eq_without_eq)]
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub(crate) enum ExpectedStreamRevision {
            /// The stream must be at exactly this revision.
            #[prost(uint64, tag = "2")]
            Revision(u64),
            /// The stream must not exist yet.
            #[prost(message, tag = "3")]
            NoStream(super::super::Empty),
            /// No expectation. The append always succeeds.
            #[prost(message, tag = "4")]
            Any(super::super::Empty),
            /// The stream must exist, at any revision.
            #[prost(message, tag = "5")]
            StreamExists(super::super::Empty),
        }
    }
    /// A single event to append.
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub(crate) struct ProposedMessage {
        /// Client-assigned identifier for the event.
        #[prost(message, optional, tag = "1")]
        pub(crate) id: ::core::option::Option<super::Uuid>,
        /// Event metadata. The server recognizes the `type` and
        /// `content-type` keys.
        #[prost(map = "string, string", tag = "2")]
        pub(crate) metadata: ::std::collections::HashMap<
            ::prost::alloc::string::String,
            ::prost::alloc::string::String,
        >,
        /// Opaque caller metadata, stored but not interpreted.
        #[prost(bytes = "vec", tag = "3")]
        pub(crate) custom_metadata: ::prost::alloc::vec::Vec<u8>,
        /// The event body.
        #[prost(bytes = "vec", tag = "4")]
        pub(crate) data: ::prost::alloc::vec::Vec<u8>,
    }
    /// The payload of one `Append` frame.
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub(crate) enum Content {
        /// Stream and expectation for the whole call. Must come first.
        #[prost(message, tag = "1")]
        Options(Options),
        /// One event to append.
        #[prost(message, tag = "2")]
        ProposedMessage(ProposedMessage),
    }
}

/// The server's verdict on an `Append` call.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct AppendResp {
    #[prost(oneof = "append_resp::Result", tags = "1, 2")]
    pub(crate) result: ::core::option::Option<append_resp::Result>,
}
/// Nested message and enum types included in `AppendResp`.
pub(crate) mod append_resp {
    /// A transaction-log position.
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub(crate) struct Position {
        /// Commit offset in the transaction log.
        #[prost(uint64, tag = "1")]
        pub(crate) commit_position: u64,
        /// Prepare offset in the transaction log.
        #[prost(uint64, tag = "2")]
        pub(crate) prepare_position: u64,
    }
    /// The events were written.
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub(crate) struct Success {
        #[prost(oneof = "success::CurrentRevisionOption", tags = "1, 2")]
        pub(crate) current_revision_option: ::core::option::Option<success::CurrentRevisionOption>,
        #[prost(oneof = "success::PositionOption", tags = "3, 4")]
        pub(crate) position_option: ::core::option::Option<success::PositionOption>,
    }
    /// Nested message and enum types included in `Success`.
    pub(crate) mod success {
        /// The stream's revision after the append.
        #[allow(clippy::derive_partial_eq_without_eq)]
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub(crate) enum CurrentRevisionOption {
            /// Revision of the last event written.
            #[prost(uint64, tag = "1")]
            CurrentRevision(u64),
            /// The stream still does not exist.
            #[prost(message, tag = "2")]
            NoStream(super::super::Empty),
        }
        /// Where in the transaction log the events landed.
        #[allow(clippy::derive_partial_eq_without_eq)]
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub(crate) enum PositionOption {
            /// The log position of the write.
            #[prost(message, tag = "3")]
            Position(super::Position),
            /// The server did not report a position.
            #[prost(message, tag = "4")]
            NoPosition(super::super::Empty),
        }
    }
    /// The append was rejected by the concurrency check. Lower tags are
    /// reserved for a deprecated encoding of the same information.
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub(crate) struct WrongExpectedVersion {
        #[prost(oneof = "wrong_expected_version::CurrentRevisionOption", tags = "6, 7")]
        pub(crate) current_revision_option:
            ::core::option::Option<wrong_expected_version::CurrentRevisionOption>,
        #[prost(
            oneof = "wrong_expected_version::ExpectedRevisionOption",
            tags = "8, 9, 10, 11"
        )]
        pub(crate) expected_revision_option:
            ::core::option::Option<wrong_expected_version::ExpectedRevisionOption>,
    }
    /// Nested message and enum types included in `WrongExpectedVersion`.
    pub(crate) mod wrong_expected_version {
        /// Where the stream actually was.
        #[allow(clippy::derive_partial_eq_without_eq)]
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub(crate) enum CurrentRevisionOption {
            /// The stream's actual revision.
            #[prost(uint64, tag = "6")]
            CurrentRevision(u64),
            /// The stream does not exist.
            #[prost(message, tag = "7")]
            CurrentNoStream(super::super::Empty),
        }
        /// What the rejected call expected.
        #[allow(clippy::derive_partial_eq_without_eq)]
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub(crate) enum ExpectedRevisionOption {
            /// An exact revision was expected.
            #[prost(uint64, tag = "8")]
            ExpectedRevision(u64),
            /// Any revision was accepted.
            #[prost(message, tag = "9")]
            ExpectedAny(super::super::Empty),
            /// The stream was expected to exist.
            #[prost(message, tag = "10")]
            ExpectedStreamExists(super::super::Empty),
            /// The stream was expected not to exist.
            #[prost(message, tag = "11")]
            ExpectedNoStream(super::super::Empty),
        }
    }
    /// The two possible outcomes of an append.
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub(crate) enum Result {
        /// The events were written.
        #[prost(message, tag = "1")]
        Success(Success),
        /// The concurrency check failed.
        #[prost(message, tag = "2")]
        WrongExpectedVersion(WrongExpectedVersion),
    }
}
