//! Payload deserialization seam and record aggregates.
//!
//! The binary layouts of fragments and headers belong to an external
//! serialization module. The index reads a dataset into a [`Bytes`] buffer
//! and hands it, by value, to a [`PayloadParser`]; the parsed object owns the
//! buffer from then on.
//!
//! [`OpaquePayloads`] is the default parser. It keeps the bytes untouched and
//! only tags them with their role.

use bytes::Bytes;

/// Boxed error produced by a payload parser
pub type PayloadError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Turns raw dataset bytes into typed objects
pub trait PayloadParser {
    /// Parsed fragment
    type Fragment;
    /// Parsed trigger record header
    type RecordHeader;
    /// Parsed time slice header
    type TimeSliceHeader;

    /// Parse one fragment, taking ownership of its bytes
    fn parse_fragment(&self, bytes: Bytes) -> Result<Self::Fragment, PayloadError>;

    /// Parse a trigger record header, taking ownership of its bytes
    fn parse_record_header(&self, bytes: Bytes) -> Result<Self::RecordHeader, PayloadError>;

    /// Parse a time slice header, taking ownership of its bytes
    fn parse_timeslice_header(&self, bytes: Bytes)
        -> Result<Self::TimeSliceHeader, PayloadError>;
}

/// Fragment bytes, unparsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment(pub Bytes);

/// Trigger record header bytes, unparsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecordHeader(pub Bytes);

/// Time slice header bytes, unparsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTimeSliceHeader(pub Bytes);

macro_rules! raw_payload_accessors {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                /// Payload bytes
                pub fn bytes(&self) -> &Bytes {
                    &self.0
                }

                /// Consume the wrapper and return the buffer
                pub fn into_bytes(self) -> Bytes {
                    self.0
                }
            }
        )*
    };
}

raw_payload_accessors!(RawFragment, RawRecordHeader, RawTimeSliceHeader);

/// Parser that leaves payloads as opaque byte buffers
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaquePayloads;

impl PayloadParser for OpaquePayloads {
    type Fragment = RawFragment;
    type RecordHeader = RawRecordHeader;
    type TimeSliceHeader = RawTimeSliceHeader;

    fn parse_fragment(&self, bytes: Bytes) -> Result<RawFragment, PayloadError> {
        Ok(RawFragment(bytes))
    }

    fn parse_record_header(&self, bytes: Bytes) -> Result<RawRecordHeader, PayloadError> {
        Ok(RawRecordHeader(bytes))
    }

    fn parse_timeslice_header(&self, bytes: Bytes) -> Result<RawTimeSliceHeader, PayloadError> {
        Ok(RawTimeSliceHeader(bytes))
    }
}

/// One trigger record: its header plus every fragment
#[derive(Debug, Clone)]
pub struct TriggerRecord<H, F> {
    /// Record header
    pub header: H,
    /// Fragments, in dataset-path enumeration order
    pub fragments: Vec<F>,
}

impl<H, F> TriggerRecord<H, F> {
    /// Start a record with no fragments
    pub fn new(header: H) -> Self {
        Self {
            header,
            fragments: Vec::new(),
        }
    }

    /// Append a fragment
    pub fn add_fragment(&mut self, fragment: F) {
        self.fragments.push(fragment);
    }
}

/// One time slice: its header plus every fragment
#[derive(Debug, Clone)]
pub struct TimeSlice<H, F> {
    /// Time slice header
    pub header: H,
    /// Fragments, in dataset-path enumeration order
    pub fragments: Vec<F>,
}

impl<H, F> TimeSlice<H, F> {
    /// Start a time slice with no fragments
    pub fn new(header: H) -> Self {
        Self {
            header,
            fragments: Vec::new(),
        }
    }

    /// Append a fragment
    pub fn add_fragment(&mut self, fragment: F) {
        self.fragments.push(fragment);
    }
}
