// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Readiness multiplexing over the connection and caller descriptors.
//!
//! The reactor is the one blocking point of the event loop: it waits on the
//! compositor connection's descriptor plus any caller-registered readers
//! (data streams, timers as timerfds, IPC sockets), so unrelated I/O
//! interleaves with compositor traffic in the same loop. Readers own their
//! descriptor (anything `AsFd`); callbacks must drain it, as polling is
//! level-triggered.

use std::os::fd::AsFd;
use std::time::Duration;

use rustix::event::{PollFd, PollFlags};

/// Identifies a registered reader for removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReaderId(u64);

struct Reader {
    id: ReaderId,
    fd: Box<dyn AsFd>,
    callback: Box<dyn FnMut()>,
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader").field("id", &self.id).finish_non_exhaustive()
    }
}

/// A poll-based readiness reactor.
#[derive(Debug, Default)]
pub struct Reactor {
    readers: Vec<Reader>,
    next_id: u64,
}

impl Reactor {
    /// Creates an empty reactor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor; `callback` runs whenever it is readable.
    /// The callback must drain the descriptor (level-triggered polling).
    pub fn add_reader(
        &mut self,
        fd: impl AsFd + 'static,
        callback: impl FnMut() + 'static,
    ) -> ReaderId {
        let id = ReaderId(self.next_id);
        self.next_id += 1;
        self.readers.push(Reader {
            id,
            fd: Box::new(fd),
            callback: Box::new(callback),
        });
        id
    }

    /// Unregisters a reader, dropping its descriptor. Returns whether it
    /// was registered.
    pub fn remove_reader(&mut self, id: ReaderId) -> bool {
        let before = self.readers.len();
        self.readers.retain(|r| r.id != id);
        self.readers.len() != before
    }

    /// Number of registered readers.
    #[must_use]
    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    /// Waits for readiness on the connection descriptor or any reader.
    ///
    /// Ready reader callbacks run before returning. Returns whether the
    /// connection descriptor itself is readable. `None` blocks
    /// indefinitely; `Some(Duration::ZERO)` polls.
    pub fn wait(
        &mut self,
        connection: impl AsFd,
        timeout: Option<Duration>,
    ) -> std::io::Result<bool> {
        let mut fds = Vec::with_capacity(self.readers.len() + 1);
        fds.push(PollFd::new(&connection, PollFlags::IN));
        for reader in &self.readers {
            fds.push(PollFd::new(&reader.fd, PollFlags::IN));
        }

        let timeout = timeout.map(|d| rustix::time::Timespec {
            tv_sec: i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            tv_nsec: i64::from(d.subsec_nanos()),
        });
        rustix::event::poll(&mut fds, timeout.as_ref())?;

        let connection_ready = fds[0]
            .revents()
            .intersects(PollFlags::IN | PollFlags::HUP | PollFlags::ERR);
        let ready: Vec<usize> = (0..self.readers.len())
            .filter(|i| {
                fds[i + 1]
                    .revents()
                    .intersects(PollFlags::IN | PollFlags::HUP | PollFlags::ERR)
            })
            .collect();
        drop(fds);

        for i in ready {
            (self.readers[i].callback)();
        }
        Ok(connection_ready)
    }
}
