//! Router Module
//!
//! Pairing sequence, rotation cursor, and the failover dispatch loop.

pub mod dispatch;
pub mod pairing;

pub use dispatch::{Reply, Router, RouterSettings, DEFAULT_PREAMBLE};
pub use pairing::{Pair, PairingSequence, RotationCursor};
