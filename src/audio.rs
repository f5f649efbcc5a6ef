mod bus;
mod handle;
mod manager;
mod mixer;
mod orphans;
mod player;
mod queue;
mod registry;
mod sink;
mod thread;
mod types;

pub use bus::*;
pub use handle::*;
pub use manager::*;
pub use mixer::effective_volume;
pub use player::*;
pub use sink::*;
pub use types::*;

#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod tests;
