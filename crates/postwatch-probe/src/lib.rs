//! postwatch-probe: OS posture probing
//!
//! Provides the [`SystemProbe`] seam the agent samples through, and a
//! command-backed implementation that shells out to platform tools
//! (BitLocker/Defender/powercfg on Windows, lsblk/apt/systemctl/gsettings on
//! Linux). Every check degrades independently: a failing or hung command
//! turns that one field into `ProbeError` without touching the other three.

pub mod error;
pub mod local;
pub mod probe;
pub mod runner;

mod linux;
mod windows;

pub use error::ProbeExecError;
pub use local::LocalRunner;
pub use probe::{CommandProbe, SystemProbe};
pub use runner::{CmdOutput, CommandRunner};
