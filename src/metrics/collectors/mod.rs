//! One collector per subsystem.
//!
//! Each collector queries its collaborator and maps the result into typed
//! records. Failures are returned as [`CollectError`](crate::error::CollectError);
//! degrading them is the aggregator's job.

pub mod containers;
pub mod cpu;
pub mod gpu;
pub mod memory;
pub mod network;
pub mod ports;
pub mod processes;
pub mod storage;

use std::fmt;

/// Identity of a collector, used in logs and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Compute,
    Memory,
    Storage,
    Interfaces,
    Accelerators,
    Containers,
    Sockets,
    Processes,
}

impl Subsystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::Compute => "compute",
            Subsystem::Memory => "memory",
            Subsystem::Storage => "storage",
            Subsystem::Interfaces => "interfaces",
            Subsystem::Accelerators => "accelerators",
            Subsystem::Containers => "containers",
            Subsystem::Sockets => "sockets",
            Subsystem::Processes => "processes",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_display() {
        assert_eq!(Subsystem::Sockets.to_string(), "sockets");
        assert_eq!(Subsystem::Accelerators.as_str(), "accelerators");
    }
}
