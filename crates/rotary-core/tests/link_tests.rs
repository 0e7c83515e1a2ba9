// Reader-thread tests using an in-memory source that interleaves data
// chunks with read timeouts, the way a serial port with a short timeout
// behaves.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rotary_core::{LineReader, ReaderSlot, SampleQueue};

enum Chunk {
    Data(&'static [u8]),
    Timeout,
    Fault,
}

struct ScriptedPort {
    script: VecDeque<Chunk>,
    reads: Arc<AtomicUsize>,
}

impl ScriptedPort {
    fn new(script: Vec<Chunk>) -> (Self, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        (
            Self {
                script: script.into(),
                reads: Arc::clone(&reads),
            },
            reads,
        )
    }
}

impl Read for ScriptedPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(Chunk::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(Chunk::Fault) => Err(io::Error::new(io::ErrorKind::BrokenPipe, "device fault")),
            Some(Chunk::Timeout) | None => {
                thread::sleep(Duration::from_millis(2));
                Err(io::Error::new(io::ErrorKind::TimedOut, "timed out"))
            }
        }
    }
}

/// Records its first read and its drop into a shared log.
struct TracedPort {
    label: &'static str,
    inner: ScriptedPort,
    events: Arc<Mutex<Vec<String>>>,
    started: bool,
}

impl Read for TracedPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.started {
            self.started = true;
            self.events.lock().unwrap().push(format!("read {}", self.label));
        }
        self.inner.read(buf)
    }
}

impl Drop for TracedPort {
    fn drop(&mut self) {
        self.events.lock().unwrap().push(format!("drop {}", self.label));
    }
}

fn wait_for(queue: &SampleQueue, count: usize) -> Vec<String> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut out = Vec::new();
    while out.len() < count && Instant::now() < deadline {
        out.extend(queue.drain());
        thread::sleep(Duration::from_millis(1));
    }
    out
}

#[test]
fn lines_arrive_in_order_across_timeouts() {
    let (port, _) = ScriptedPort::new(vec![
        Chunk::Data(b"10\n"),
        Chunk::Timeout,
        Chunk::Data(b"2"),
        Chunk::Timeout,
        Chunk::Data(b".5\r\n8\n"),
    ]);
    let queue = SampleQueue::new();
    let mut reader = LineReader::spawn("test", port, queue.clone()).expect("spawn");
    let lines = wait_for(&queue, 3);
    reader.stop();
    assert_eq!(lines, vec!["10", "2.5", "8"]);
    assert!(!reader.is_running());
}

#[test]
fn read_errors_do_not_stop_the_loop() {
    let (port, reads) = ScriptedPort::new(vec![
        Chunk::Data(b"1\n"),
        Chunk::Fault,
        Chunk::Data(b"2\n"),
    ]);
    let queue = SampleQueue::new();
    let mut reader = LineReader::spawn("faulty", port, queue.clone()).expect("spawn");
    let lines = wait_for(&queue, 2);
    assert_eq!(lines, vec!["1", "2"]);
    assert!(reader.is_running());
    reader.stop();
    assert!(reads.load(Ordering::SeqCst) >= 3);
}

#[test]
fn stop_joins_promptly_while_idle() {
    let (port, _) = ScriptedPort::new(Vec::new());
    let queue = SampleQueue::new();
    let mut reader = LineReader::spawn("idle", port, queue.clone()).expect("spawn");
    thread::sleep(Duration::from_millis(20));
    let started = Instant::now();
    reader.stop();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(queue.is_empty());
}

#[test]
fn dropping_the_reader_stops_it() {
    let (port, reads) = ScriptedPort::new(Vec::new());
    let queue = SampleQueue::new();
    let reader = LineReader::spawn("dropped", port, queue).expect("spawn");
    thread::sleep(Duration::from_millis(10));
    drop(reader);
    let after_drop = reads.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(reads.load(Ordering::SeqCst), after_drop);
}

#[test]
fn unbounded_queue_keeps_everything() {
    let queue = SampleQueue::new();
    for i in 0..10_000 {
        queue.push(i.to_string());
    }
    assert_eq!(queue.len(), 10_000);
    assert_eq!(queue.dropped(), 0);
    let drained = queue.drain();
    assert_eq!(drained.first().map(String::as_str), Some("0"));
    assert_eq!(drained.last().map(String::as_str), Some("9999"));
    assert!(queue.is_empty());
}

#[test]
fn reopening_stops_the_old_reader_before_the_new_one_starts() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let (first, first_reads) = ScriptedPort::new(vec![Chunk::Data(b"1\n")]);
    let (second, _) = ScriptedPort::new(vec![Chunk::Data(b"2\n")]);

    let mut slot = ReaderSlot::new(SampleQueue::new());
    slot.replace(
        "COM4",
        TracedPort {
            label: "a",
            inner: first,
            events: Arc::clone(&events),
            started: false,
        },
    )
    .expect("spawn first");
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut lines = Vec::new();
    while lines.is_empty() && Instant::now() < deadline {
        lines.extend(slot.drain());
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(lines, vec!["1"]);

    slot.replace(
        "COM5",
        TracedPort {
            label: "b",
            inner: second,
            events: Arc::clone(&events),
            started: false,
        },
    )
    .expect("spawn second");
    assert_eq!(slot.current(), Some("COM5"));

    // The first source is idle on timeouts; once replaced it is never read again.
    let after_replace = first_reads.load(Ordering::SeqCst);
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut lines = Vec::new();
    while lines.is_empty() && Instant::now() < deadline {
        lines.extend(slot.drain());
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(lines, vec!["2"]);
    assert_eq!(first_reads.load(Ordering::SeqCst), after_replace);

    slot.close();
    assert!(!slot.is_open());
    let events = events.lock().unwrap().clone();
    assert_eq!(events, vec!["read a", "drop a", "read b", "drop b"]);
}

#[test]
fn closing_an_empty_slot_is_harmless() {
    let mut slot = ReaderSlot::new(SampleQueue::new());
    slot.close();
    assert!(!slot.is_open());
    assert_eq!(slot.current(), None);
}
