//! Transport seam and in-memory implementation.
//!
//! The transport/scheduler is an external collaborator: it authenticates
//! the caller partition, delivers messages, exposes declared per-parameter
//! sizes, and performs the raw read/write/reply primitives. The service
//! core never sees raw frames — only [`Transport`] calls.
//!
//! [`MemoryTransport`] is a synchronous in-memory implementation for tests
//! and simulation, in the same spirit as an in-memory storage backend: it
//! scripts inbound messages and records every write and reply.

use std::collections::{HashMap, VecDeque};

use cryptcell_proto::{Category, CategoryMask, ConnectionId, Message, Status};

/// Raw message-passing primitives consumed by the dispatch loop.
///
/// Reads are cursored: successive `read` calls on the same parameter
/// consume it front to back, which is what lets the core pull a large
/// parameter in fixed-size chunks.
pub trait Transport {
    /// Block (or poll, if `blocking` is false) until at least one category
    /// in `mask` has a pending message; returns the ready subset.
    fn wait(&mut self, mask: CategoryMask, blocking: bool) -> CategoryMask;

    /// Dequeue the next pending message for a category, if any.
    fn fetch(&mut self, category: Category) -> Option<Message>;

    /// Read up to `buf.len()` bytes from an input parameter of the
    /// in-flight message on `connection`; returns the bytes produced.
    fn read(&mut self, connection: ConnectionId, param: usize, buf: &mut [u8]) -> usize;

    /// Write bytes to an output slot of the in-flight message.
    fn write(&mut self, connection: ConnectionId, slot: usize, data: &[u8]);

    /// Complete the in-flight message with a status. Exactly one reply is
    /// sent per message.
    fn reply(&mut self, connection: ConnectionId, status: Status);
}

/// Input parameter with a read cursor.
#[derive(Debug, Clone)]
struct ParamBuffer {
    data: Vec<u8>,
    offset: usize,
}

/// In-memory transport: scripted inbound messages, recorded outcomes.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    queues: HashMap<u32, VecDeque<(Message, Vec<Vec<u8>>)>>,
    in_flight: HashMap<ConnectionId, Vec<ParamBuffer>>,
    writes: HashMap<(ConnectionId, usize), Vec<u8>>,
    replies: Vec<(ConnectionId, Status)>,
    /// When set, reads on this (connection, param) are truncated by one
    /// byte, simulating a framing disagreement with the scheduler.
    short_read_on: Option<(ConnectionId, usize)>,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an inbound message with its input parameter payloads.
    ///
    /// `params[i]` becomes input parameter `i`; the message's declared
    /// `in_sizes` should match the payload lengths unless a framing
    /// violation is being simulated on purpose.
    pub fn push(&mut self, category: Category, message: Message, params: Vec<Vec<u8>>) {
        self.queues.entry(category.signal().0).or_default().push_back((message, params));
    }

    /// Truncate reads on one (connection, param), simulating a transport
    /// whose framing disagrees with the declared parameter size.
    pub fn inject_short_read(&mut self, connection: ConnectionId, param: usize) {
        self.short_read_on = Some((connection, param));
    }

    /// Bytes written to an output slot, if any.
    pub fn written(&self, connection: ConnectionId, slot: usize) -> Option<&[u8]> {
        self.writes.get(&(connection, slot)).map(Vec::as_slice)
    }

    /// All replies sent so far, in order.
    pub fn replies(&self) -> &[(ConnectionId, Status)] {
        &self.replies
    }

    /// Drain the recorded replies.
    pub fn take_replies(&mut self) -> Vec<(ConnectionId, Status)> {
        std::mem::take(&mut self.replies)
    }

    /// Clear recorded writes (between scripted calls on one connection).
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl Transport for MemoryTransport {
    fn wait(&mut self, mask: CategoryMask, _blocking: bool) -> CategoryMask {
        let mut ready = CategoryMask::NONE;
        for category in Category::PRIORITY {
            if mask.contains(category)
                && self.queues.get(&category.signal().0).is_some_and(|q| !q.is_empty())
            {
                ready = ready.union(category.signal());
            }
        }
        ready
    }

    fn fetch(&mut self, category: Category) -> Option<Message> {
        let (message, params) = self.queues.get_mut(&category.signal().0)?.pop_front()?;
        let buffers = params.into_iter().map(|data| ParamBuffer { data, offset: 0 }).collect();
        self.in_flight.insert(message.connection, buffers);
        Some(message)
    }

    fn read(&mut self, connection: ConnectionId, param: usize, buf: &mut [u8]) -> usize {
        let Some(buffers) = self.in_flight.get_mut(&connection) else {
            return 0;
        };
        let Some(entry) = buffers.get_mut(param) else {
            return 0;
        };

        let mut len = buf.len().min(entry.data.len() - entry.offset);
        if self.short_read_on == Some((connection, param)) {
            len = len.saturating_sub(1);
        }
        buf[..len].copy_from_slice(&entry.data[entry.offset..entry.offset + len]);
        entry.offset += len;
        len
    }

    fn write(&mut self, connection: ConnectionId, slot: usize, data: &[u8]) {
        self.writes.insert((connection, slot), data.to_vec());
    }

    fn reply(&mut self, connection: ConnectionId, status: Status) {
        self.in_flight.remove(&connection);
        self.replies.push((connection, status));
    }
}

#[cfg(test)]
mod tests {
    use cryptcell_proto::MessageKind;

    use super::*;

    #[test]
    fn wait_reports_ready_categories() {
        let mut transport = MemoryTransport::new();
        assert!(transport.wait(CategoryMask::all(), false).is_empty());

        transport.push(Category::Hash, Message::new(MessageKind::Call, 1, 10), vec![]);
        let ready = transport.wait(CategoryMask::all(), false);
        assert!(ready.contains(Category::Hash));
        assert!(!ready.contains(Category::Mac));
    }

    #[test]
    fn reads_are_cursored() {
        let mut transport = MemoryTransport::new();
        let mut msg = Message::new(MessageKind::Call, 1, 10);
        msg.in_sizes[0] = 5;
        transport.push(Category::Hash, msg, vec![vec![1, 2, 3, 4, 5]]);
        transport.fetch(Category::Hash).unwrap();

        let mut buf = [0u8; 3];
        assert_eq!(transport.read(10, 0, &mut buf), 3);
        assert_eq!(buf, [1, 2, 3]);

        let mut rest = [0u8; 3];
        assert_eq!(transport.read(10, 0, &mut rest), 2);
        assert_eq!(&rest[..2], &[4, 5]);
    }

    #[test]
    fn short_read_injection_truncates() {
        let mut transport = MemoryTransport::new();
        let mut msg = Message::new(MessageKind::Call, 1, 10);
        msg.in_sizes[0] = 4;
        transport.push(Category::Hash, msg, vec![vec![9; 4]]);
        transport.fetch(Category::Hash).unwrap();
        transport.inject_short_read(10, 0);

        let mut buf = [0u8; 4];
        assert_eq!(transport.read(10, 0, &mut buf), 3);
    }

    #[test]
    fn writes_and_replies_are_recorded() {
        let mut transport = MemoryTransport::new();
        transport.write(10, 0, &[1, 2]);
        transport.reply(10, Status::Success);

        assert_eq!(transport.written(10, 0), Some(&[1u8, 2][..]));
        assert_eq!(transport.replies(), &[(10, Status::Success)]);
    }
}
