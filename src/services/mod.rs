// Service exports
pub mod cache;
pub mod items;
pub mod store;

pub use cache::{CacheStats, FeatureCache};
pub use items::{InMemoryItems, ItemRepository};
pub use store::MatchStore;
