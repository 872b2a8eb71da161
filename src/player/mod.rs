//! Episode player: ad gate in front, source switcher inside

pub mod gate;
pub mod switcher;

pub use gate::{AdGate, GatePhase, GateTimer, GateView};
pub use switcher::{PlayerView, SourceSwitcher, SwitchError, SOURCE_NOT_FOUND};
