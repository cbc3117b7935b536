pub mod flight;
pub mod memo;
pub mod store;

pub use flight::SingleFlight;
pub use memo::{Clock, SystemClock, VersionMemo};
pub use store::{LocalCacheStore, list_children};
