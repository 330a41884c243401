//! FSW Command State Machine
//!
//! Defines the operating-mode state machine, the per-mode command policy
//! and the invalid-command escalation counter.

use std::fmt;
use std::time::{Duration, Instant};

use crate::safety;

/// Operating modes of the flight software
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Process is initializing; commands are not accepted yet
    Restarting,
    /// Nominal operating mode
    Ready,
    /// Degraded mode, entered explicitly or by escalation
    SafeMode,
    /// Tripped mode, entered only by escalation
    FaultMode,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Restarting => "RESTARTING",
            Mode::Ready => "READY",
            Mode::SafeMode => "SAFE MODE",
            Mode::FaultMode => "FAULT MODE",
        };
        f.write_str(s)
    }
}

/// Recognized uplink commands, plus the catch-all for everything else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Enter safe mode
    EnableSafeMode,
    /// Return to the nominal mode (the only way out of fault mode)
    DisableSafeMode,
    /// Report the accepted-command counter
    ShowCommandCount,
    /// Report the safe-mode entry counter
    ShowSafeModeCount,
    /// Report elapsed time since the engine was created
    ShowUptime,
    /// Zero the accepted-command counter
    ResetCommandCount,
    /// Terminate the process
    Shutdown,
    /// Anything that is not one of the seven command literals
    Unrecognized,
}

impl CommandKind {
    /// Classify a datagram payload.
    ///
    /// Matching is exact and case-sensitive against the full payload, no
    /// trimming. Sensor broadcast traffic on the shared channel always
    /// lands on `Unrecognized`.
    pub fn parse(token: &str) -> Self {
        match token {
            "SAFE_MODE_ENABLE" => Self::EnableSafeMode,
            "SAFE_MODE_DISABLE" => Self::DisableSafeMode,
            "SHOW_CMDS_RCVD" => Self::ShowCommandCount,
            "SHOW_NUM_SAFES" => Self::ShowSafeModeCount,
            "SHOW_UPTIME" => Self::ShowUptime,
            "RESET_CMD_CNTR" => Self::ResetCommandCount,
            "SHUTDOWN" => Self::Shutdown,
            _ => Self::Unrecognized,
        }
    }
}

/// Outcome of processing one datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Command accepted and applied
    Accepted { response: String },
    /// Command rejected for the current mode, or unrecognized
    Rejected { response: String },
    /// Received while still restarting; no response is sent
    Dropped,
    /// Shutdown accepted; the caller sends the response and exits the process
    ShutdownRequested { response: String },
}

/// Is `kind` accepted in `mode`?
///
/// `Restarting` is handled before this table is consulted and accepts
/// nothing. Acceptance is independent of the escalation counter.
pub fn is_accepted(mode: Mode, kind: CommandKind) -> bool {
    use CommandKind::*;
    use Mode::*;

    match (mode, kind) {
        (Restarting, _) => false,
        (_, Unrecognized) => false,

        // Honored in every running mode; SAFE_MODE_DISABLE is the only
        // exit from fault mode
        (_, DisableSafeMode | Shutdown) => true,

        // Ready accepts the full vocabulary
        (Ready, _) => true,

        // The safe-mode entry counter stays readable from safe mode
        (SafeMode, ShowSafeModeCount) => true,

        _ => false,
    }
}

/// The command/state-machine engine.
///
/// One instance per process, created in `Restarting` and mutated only by
/// the session loop, one datagram at a time.
#[derive(Debug)]
pub struct CommandEngine {
    mode: Mode,
    valid_command_count: u64,
    safe_mode_entry_count: u64,
    consecutive_invalid_count: u32,
    started: Instant,
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandEngine {
    /// Create a new engine in `Restarting`
    pub fn new() -> Self {
        Self {
            mode: Mode::Restarting,
            valid_command_count: 0,
            safe_mode_entry_count: 0,
            consecutive_invalid_count: 0,
            started: Instant::now(),
        }
    }

    /// Current operating mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Total accepted commands since the last counter reset
    pub fn valid_command_count(&self) -> u64 {
        self.valid_command_count
    }

    /// Total commanded safe-mode entries (escalation entries do not count)
    pub fn safe_mode_entry_count(&self) -> u64 {
        self.safe_mode_entry_count
    }

    /// Consecutive rejected commands since the last accepted one
    pub fn consecutive_invalid_count(&self) -> u32 {
        self.consecutive_invalid_count
    }

    /// Elapsed time since the engine was created
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Leave `Restarting` and begin accepting commands.
    ///
    /// Called by the session loop once the transport is bound, before the
    /// first receive.
    pub fn mark_ready(&mut self) {
        if self.mode == Mode::Restarting {
            self.mode = Mode::Ready;
        }
    }

    /// Process one datagram payload and return what to do with it.
    ///
    /// Never called concurrently with itself; every mode transition and
    /// counter update happens inside this call.
    pub fn process(&mut self, token: &str) -> Disposition {
        if self.mode == Mode::Restarting {
            return Disposition::Dropped;
        }

        let kind = CommandKind::parse(token);

        if !is_accepted(self.mode, kind) {
            return self.reject();
        }

        let response = match kind {
            CommandKind::EnableSafeMode => {
                self.mode = Mode::SafeMode;
                self.safe_mode_entry_count += 1;
                "Safe Mode Enabled".to_string()
            }
            CommandKind::DisableSafeMode => {
                self.mode = Mode::Ready;
                "Safe Mode Disabled".to_string()
            }
            CommandKind::ShowCommandCount => {
                format!("Number of commands: {}", self.valid_command_count)
            }
            CommandKind::ShowSafeModeCount => {
                format!("Number of safe modes: {}", self.safe_mode_entry_count)
            }
            CommandKind::ShowUptime => {
                format!("System Up-time: {:.1} seconds", self.uptime().as_secs_f64())
            }
            CommandKind::ResetCommandCount => {
                // Reset lands before the common increment below, so the
                // post-reset counter reads 1
                self.valid_command_count = 0;
                format!("Command Counter Reset: {}", self.valid_command_count)
            }
            CommandKind::Shutdown => {
                // The final response goes out before any bookkeeping; the
                // process exits once the caller has sent it
                return Disposition::ShutdownRequested {
                    response: format!("Shutdown Initiated. Current State: {}", self.mode),
                };
            }
            CommandKind::Unrecognized => unreachable!("unrecognized commands are never accepted"),
        };

        self.consecutive_invalid_count = 0;
        self.valid_command_count += 1;

        Disposition::Accepted { response }
    }

    /// Reject the current command and apply the escalation thresholds.
    ///
    /// Escalation fires regardless of the mode the rejection occurred in,
    /// including inside safe or fault mode.
    fn reject(&mut self) -> Disposition {
        self.consecutive_invalid_count += 1;

        if self.consecutive_invalid_count >= safety::ESCALATION_FAULT_THRESHOLD {
            self.mode = Mode::FaultMode;
        } else if self.consecutive_invalid_count >= safety::ESCALATION_SAFE_THRESHOLD {
            self.mode = Mode::SafeMode;
        }

        Disposition::Rejected {
            response: "Invalid Command Received/State Configuration".to_string(),
        }
    }
}
