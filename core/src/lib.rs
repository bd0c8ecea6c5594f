#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_extern_crates,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]

//! Foundational types shared by every crate in the PRISM trading execution
//! core: market identity, error classification, configuration loading,
//! logging init, shutdown signaling, and the daily-capacity admission
//! primitive. Nothing in this crate depends on any other workspace crate —
//! it sits at the base of the dependency graph.

pub mod capacity;
pub mod config;
pub mod error;
pub mod logging;
pub mod retry;
pub mod shutdown;

pub mod market;

pub use error::{Classify, ErrorKind};
pub use market::Market;
pub use shutdown::{Shutdown, ShutdownHandle};
