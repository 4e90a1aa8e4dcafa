pub mod executor;

pub use executor::QueryExecutor;
