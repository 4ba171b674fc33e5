use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_PROC_ROOT: &str = "/proc";
const FALLBACK_CLOCK_TICKS: u64 = 100;

/// Host accounting interface the sampler and scanner read from.
///
/// Every method is a single read with no caching; callers own the
/// consistency story between calls.
pub trait HostSource {
    /// Aggregate CPU statistics text (`/proc/stat`).
    fn read_cpu_stat(&self) -> io::Result<String>;
    /// Entry names of the process registry. Non-UTF-8 names are dropped.
    fn list_registry(&self) -> io::Result<Vec<String>>;
    /// Short process name (`/proc/<pid>/comm`).
    fn read_process_name(&self, pid: u32) -> io::Result<String>;
    /// Positional accounting record (`/proc/<pid>/stat`).
    fn read_process_record(&self, pid: u32) -> io::Result<String>;
}

impl<T: HostSource + ?Sized> HostSource for &T {
    fn read_cpu_stat(&self) -> io::Result<String> {
        (**self).read_cpu_stat()
    }

    fn list_registry(&self) -> io::Result<Vec<String>> {
        (**self).list_registry()
    }

    fn read_process_name(&self, pid: u32) -> io::Result<String> {
        (**self).read_process_name(pid)
    }

    fn read_process_record(&self, pid: u32) -> io::Result<String> {
        (**self).read_process_record(pid)
    }
}

/// `HostSource` backed by a procfs-style directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pid_file(&self, pid: u32, name: &str) -> PathBuf {
        self.root.join(pid.to_string()).join(name)
    }
}

impl HostSource for ProcFs {
    fn read_cpu_stat(&self) -> io::Result<String> {
        fs::read_to_string(self.root.join("stat"))
    }

    fn list_registry(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            // An entry vanishing mid-listing is not a registry failure.
            let Ok(entry) = entry else {
                continue;
            };
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn read_process_name(&self, pid: u32) -> io::Result<String> {
        // comm is kernel-provided bytes, not guaranteed UTF-8
        let bytes = fs::read(self.pid_file(pid, "comm"))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_process_record(&self, pid: u32) -> io::Result<String> {
        let bytes = fs::read(self.pid_file(pid, "stat"))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Kernel clock ticks per second, used to turn tick counts into seconds.
pub fn clock_ticks_per_second() -> u64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf has no preconditions and only reads a constant.
        let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if ticks > 0 {
            return ticks as u64;
        }
    }
    FALLBACK_CLOCK_TICKS
}
