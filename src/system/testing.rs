use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;

use super::source::HostSource;

/// In-memory host used by unit tests.
#[derive(Debug, Default)]
pub struct FakeHost {
    cpu_stats: RefCell<VecDeque<String>>,
    registry: Option<Vec<String>>,
    names: HashMap<u32, String>,
    records: HashMap<u32, String>,
}

pub fn stat_record(pid: u32, name: &str, utime: u64, stime: u64) -> String {
    format!("{pid} ({name}) S 1 1 1 0 -1 4194560 120 0 3 0 {utime} {stime} 0 0 20 0 1 0 4242 10000000 250")
}

pub fn cpu_line(counters: [u64; 8]) -> String {
    let fields: Vec<String> = counters.iter().map(u64::to_string).collect();
    format!("cpu  {} 0 0\ncpu0 1 1 1 1 1 1 1 1\n", fields.join(" "))
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            registry: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Each capture consumes one stat text; the last one repeats.
    pub fn with_cpu_stats<I: IntoIterator<Item = String>>(mut self, stats: I) -> Self {
        self.cpu_stats = RefCell::new(stats.into_iter().collect());
        self
    }

    pub fn with_process(mut self, pid: u32, name: &str, utime: u64, stime: u64) -> Self {
        self.push_entry(pid.to_string());
        self.names.insert(pid, format!("{name}\n"));
        self.records.insert(pid, stat_record(pid, name, utime, stime));
        self
    }

    pub fn with_raw_record(mut self, pid: u32, record: &str) -> Self {
        self.push_entry(pid.to_string());
        self.records.insert(pid, record.to_string());
        self
    }

    /// Listed in the registry, but the record is gone by the time it is read.
    pub fn with_vanished(mut self, pid: u32, name: &str) -> Self {
        self.push_entry(pid.to_string());
        self.names.insert(pid, format!("{name}\n"));
        self
    }

    pub fn with_entry(mut self, name: &str) -> Self {
        self.push_entry(name.to_string());
        self
    }

    pub fn without_registry(mut self) -> Self {
        self.registry = None;
        self
    }

    pub fn without_name(mut self, pid: u32) -> Self {
        self.names.remove(&pid);
        self
    }

    fn push_entry(&mut self, name: String) {
        self.registry.get_or_insert_with(Vec::new).push(name);
    }
}

impl HostSource for FakeHost {
    fn read_cpu_stat(&self) -> io::Result<String> {
        let mut stats = self.cpu_stats.borrow_mut();
        if stats.len() > 1 {
            return stats
                .pop_front()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound));
        }
        stats
            .front()
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn list_registry(&self) -> io::Result<Vec<String>> {
        self.registry
            .clone()
            .ok_or_else(|| io::Error::from(io::ErrorKind::PermissionDenied))
    }

    fn read_process_name(&self, pid: u32) -> io::Result<String> {
        self.names
            .get(&pid)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn read_process_record(&self, pid: u32) -> io::Result<String> {
        self.records
            .get(&pid)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}
