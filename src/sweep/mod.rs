// Sweep agent - drains the source wallet into the destination on every slot
pub mod agent;
pub mod dispatcher;

pub use agent::SweepAgent;
pub use dispatcher::SlotDispatcher;
