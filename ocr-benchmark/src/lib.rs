//! OCR Benchmark
//!
//! Benchmarks OCR and structured-extraction pipelines: each configured model
//! (an OCR step, an optional JSON-extraction step, or direct image-to-JSON
//! extraction) is run over a set of documents with known ground truth, and
//! the predicted JSON is scored against the expected output with the
//! `json-accuracy` engine.
//!
//! # Example
//!
//! ```no_run
//! use ocr_benchmark::{
//!     config::Config,
//!     dataset::load_documents,
//!     runner::{Executor, ExecutorConfig},
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load_or_default();
//!     let documents = load_documents(&config.benchmark.data_dir).unwrap();
//!
//!     let executor = Executor::new(ExecutorConfig::from_config(&config));
//!     let results = executor.run(&config.models, &documents).await;
//!
//!     ocr_benchmark::reporting::print_summary(&results);
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod providers;
pub mod reporting;
pub mod runner;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::{Config, ConfigError, ModelSpec};
    pub use crate::dataset::{
        load_documents, BenchmarkResult, Document, DocumentMetadata, ExtractionResult,
        StageUsage, Usage,
    };
    pub use crate::providers::{
        get_model_provider, GeminiProvider, ModelProvider, OpenAiProvider, ProviderError,
        ProviderResult,
    };
    pub use crate::reporting::{list_runs, load_run, print_summary, write_results};
    pub use crate::runner::{Executor, ExecutorConfig};
    pub use json_accuracy::{calculate_json_accuracy, AccuracyResult, DiffStats};
}
