//! Benchmark execution

pub mod executor;

pub use executor::{
    ConsoleProgress, Executor, ExecutorConfig, NoOpProgress, ProgressCallback,
};
