//! Static file and SPA serving.

pub mod spa;

pub use spa::spa_fallback;
