pub mod initialize;
pub mod journal;
pub mod migrate;
pub mod pool;
pub mod queries;
pub mod settings;
pub mod stats;
