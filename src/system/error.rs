use std::io;

use thiserror::Error;

/// Hard failures of the CPU sampler.
#[derive(Error, Debug)]
pub enum CpuError {
    #[error("aggregate cpu statistics unavailable: {0}")]
    Unavailable(#[source] io::Error),

    #[error("malformed aggregate cpu statistics: {0}")]
    Parse(String),
}

/// Hard failures of the process scanner. Per-process read failures are
/// never reported here.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot enumerate process registry: {0}")]
    Enumeration(#[source] io::Error),
}

#[derive(Error, Debug)]
pub enum SystemError {
    #[error(transparent)]
    Cpu(#[from] CpuError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}
