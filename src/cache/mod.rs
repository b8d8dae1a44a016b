mod memo;
mod sqlite;

pub use memo::InflightCache;
pub use sqlite::CacheManager;
