//! Process lifecycle: signals and the ordered shutdown sequence

mod shutdown;

pub use shutdown::{shutdown, ShutdownSignal};
