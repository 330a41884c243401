//! FSW Shared Types
//!
//! This crate provides the building blocks shared by the flight-software
//! simulator processes: the command state machine used by the FSW command
//! handler and the wire codec used by the IMU sensor simulator.

pub mod codec;
pub mod state_machine;

// Re-export commonly used types at crate root
pub use state_machine::{CommandEngine, CommandKind, Disposition, Mode};

/// Safety and channel parameters for the system
pub mod safety {
    /// Consecutive invalid commands that force the engine into safe mode
    pub const ESCALATION_SAFE_THRESHOLD: u32 = 5;

    /// Consecutive invalid commands that trip the engine into fault mode
    pub const ESCALATION_FAULT_THRESHOLD: u32 = 8;

    /// Upper bound for a single command datagram, in bytes
    pub const MAX_DATAGRAM_LEN: usize = 64;

    /// Endpoint the command handler binds and the sensor simulator
    /// broadcasts to
    pub const COMMAND_ENDPOINT: &str = "127.0.0.1:5005";

    /// Seconds the FSW process spends initializing before going ready
    pub const STARTUP_DELAY_SECS: u64 = 10;

    /// IMU broadcast period in milliseconds (12.5 Hz)
    pub const IMU_BROADCAST_PERIOD_MS: u64 = 80;

    /// IMU serial line baud rate
    pub const IMU_BAUD_RATE: u32 = 921_600;
}
