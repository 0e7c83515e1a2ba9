//! Reader-thread to frame-thread handoff.
//!
//! A [`LineReader`] owns a byte source (normally a serial port) on its own
//! thread and pushes complete lines into a [`SampleQueue`]. The frame thread
//! drains the queue once per tick. The queue mutex is the only state shared
//! between the two threads.

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::SERIAL_READ_TIMEOUT_MS;

#[derive(Debug, Default)]
struct QueueInner {
    lines: VecDeque<String>,
    capacity: Option<usize>,
    dropped: u64,
}

/// FIFO of raw lines shared between one producer and one consumer.
#[derive(Clone, Debug, Default)]
pub struct SampleQueue {
    inner: Arc<Mutex<QueueInner>>,
}

impl SampleQueue {
    /// Unbounded queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue holding at most `capacity` lines; the oldest line is dropped
    /// and counted when a push would exceed it.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueInner {
                lines: VecDeque::with_capacity(capacity),
                capacity: Some(capacity.max(1)),
                dropped: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, line: String) {
        let mut inner = self.lock();
        if let Some(cap) = inner.capacity {
            while inner.lines.len() >= cap {
                inner.lines.pop_front();
                inner.dropped += 1;
            }
        }
        inner.lines.push_back(line);
    }

    /// Take every queued line in arrival order.
    pub fn drain(&self) -> Vec<String> {
        let mut inner = self.lock();
        inner.lines.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().lines.is_empty()
    }

    /// Lines discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }
}

/// Background thread turning a byte stream into queued lines.
#[derive(Debug)]
pub struct LineReader {
    name: String,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl LineReader {
    /// Start reading `source` on a new thread. The source is dropped (and a
    /// serial port therefore closed) only after the thread has exited.
    pub fn spawn<R>(name: &str, source: R, queue: SampleQueue) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let label = name.to_string();
        let handle = thread::Builder::new()
            .name(format!("serial-reader {name}"))
            .spawn(move || {
                read_lines(source, &queue, &stop_flag);
                log::debug!("reader for {label} exited");
            })?;
        Ok(Self {
            name: name.to_string(),
            stop,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the loop and wait for it. Bounded by one read timeout.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("reader thread for {} panicked", self.name);
            }
        }
    }
}

impl Drop for LineReader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The single active reader feeding a queue. Replacing the source stops and
/// joins the previous reader first, so two readers never overlap.
#[derive(Debug, Default)]
pub struct ReaderSlot {
    queue: SampleQueue,
    reader: Option<LineReader>,
}

impl ReaderSlot {
    pub fn new(queue: SampleQueue) -> Self {
        Self {
            queue,
            reader: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Name of the source being read, if any.
    pub fn current(&self) -> Option<&str> {
        self.reader.as_ref().map(LineReader::name)
    }

    pub fn replace<R>(&mut self, name: &str, source: R) -> io::Result<()>
    where
        R: Read + Send + 'static,
    {
        self.close();
        self.reader = Some(LineReader::spawn(name, source, self.queue.clone())?);
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(mut reader) = self.reader.take() {
            reader.stop();
            log::info!("closed serial port: {}", reader.name());
        }
    }

    pub fn drain(&self) -> Vec<String> {
        self.queue.drain()
    }
}

impl Drop for ReaderSlot {
    fn drop(&mut self) {
        self.close();
    }
}

fn read_lines<R: Read>(source: R, queue: &SampleQueue, stop: &AtomicBool) {
    let backoff = Duration::from_millis(SERIAL_READ_TIMEOUT_MS);
    let mut reader = BufReader::new(source);
    // Bytes of a line cut short by a timeout survive into the next read.
    let mut pending: Vec<u8> = Vec::with_capacity(64);
    while !stop.load(Ordering::Relaxed) {
        match reader.read_until(b'\n', &mut pending) {
            Ok(0) => {
                // End of stream: nothing more will arrive until the owner reopens.
                thread::sleep(backoff);
            }
            Ok(_) => {
                if pending.last() == Some(&b'\n') {
                    queue.push(take_line(&mut pending));
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                log::warn!("serial read error: {e}");
                thread::sleep(backoff);
            }
        }
    }
}

fn take_line(pending: &mut Vec<u8>) -> String {
    let mut end = pending.len();
    while end > 0 && matches!(pending[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    let line = String::from_utf8_lossy(&pending[..end]).into_owned();
    pending.clear();
    line
}
