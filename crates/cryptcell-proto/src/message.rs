//! Request message metadata.
//!
//! A [`Message`] describes one unit of request/response: its kind
//! (connect / call / disconnect), the authenticated caller partition, the
//! per-connection handle, and the declared sizes of the numbered input and
//! output parameters. Parameter payloads are not carried here — they are
//! pulled through the transport's read primitive on demand.

/// Identifier of a caller execution context.
///
/// Supplied and authenticated by the transport with every message; never
/// taken from the message body.
pub type PartitionId = i32;

/// Opaque per-connection handle assigned by the transport.
pub type ConnectionId = u32;

/// Number of input and output parameter slots per message.
pub const MAX_PARAMS: usize = 4;

/// Wire value of a connect message.
pub const KIND_CONNECT: i32 = 1;
/// Wire value of a call message.
pub const KIND_CALL: i32 = 2;
/// Wire value of a disconnect message.
pub const KIND_DISCONNECT: i32 = 3;

/// Decoded message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A caller opened a connection to a category.
    Connect,
    /// A caller invoked an operation on an open connection.
    Call,
    /// A caller closed a connection.
    Disconnect,
}

impl MessageKind {
    /// Decode a raw wire kind.
    ///
    /// Returns `None` for unrecognized values; the dispatcher treats that
    /// as a fatal contract violation, not a recoverable request failure.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            KIND_CONNECT => Some(Self::Connect),
            KIND_CALL => Some(Self::Call),
            KIND_DISCONNECT => Some(Self::Disconnect),
            _ => None,
        }
    }

    /// Wire value of this kind.
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Connect => KIND_CONNECT,
            Self::Call => KIND_CALL,
            Self::Disconnect => KIND_DISCONNECT,
        }
    }
}

/// One request delivered by the transport.
#[derive(Debug, Clone)]
pub struct Message {
    /// Raw message kind as delivered on the wire.
    ///
    /// Kept raw so the dispatch loop, not the transport, decides that an
    /// unknown kind is fatal.
    pub kind: i32,
    /// Authenticated caller partition.
    pub partition: PartitionId,
    /// Per-connection handle for read/write/reply.
    pub connection: ConnectionId,
    /// Declared byte length of each input parameter.
    pub in_sizes: [usize; MAX_PARAMS],
    /// Declared maximum byte length of each output slot.
    pub out_sizes: [usize; MAX_PARAMS],
}

impl Message {
    /// Build a message with the given kind and no parameters.
    pub fn new(kind: MessageKind, partition: PartitionId, connection: ConnectionId) -> Self {
        Self {
            kind: kind.to_raw(),
            partition,
            connection,
            in_sizes: [0; MAX_PARAMS],
            out_sizes: [0; MAX_PARAMS],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trip() {
        for kind in [MessageKind::Connect, MessageKind::Call, MessageKind::Disconnect] {
            assert_eq!(MessageKind::from_raw(kind.to_raw()), Some(kind));
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!(MessageKind::from_raw(0), None);
        assert_eq!(MessageKind::from_raw(4), None);
        assert_eq!(MessageKind::from_raw(-1), None);
    }

    #[test]
    fn new_message_has_empty_parameters() {
        let msg = Message::new(MessageKind::Call, 7, 42);
        assert_eq!(msg.in_sizes, [0; MAX_PARAMS]);
        assert_eq!(msg.out_sizes, [0; MAX_PARAMS]);
        assert_eq!(msg.partition, 7);
        assert_eq!(msg.connection, 42);
    }
}
