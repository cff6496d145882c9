mod clock;
mod provider;

pub use clock::SyncedClock;
pub use provider::EmbeddedTimeProvider;
