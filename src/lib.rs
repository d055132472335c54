pub mod analyzers;
pub mod error;
pub mod ingest;
pub mod output;
pub mod session;
