//! Async executor running model pipelines over benchmark documents

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use json_accuracy::calculate_json_accuracy;

use crate::config::{builtin_concurrency, Config, ModelSpec};
use crate::dataset::{BenchmarkResult, Document, StageUsage};
use crate::providers::{get_model_provider, ModelProvider, ProviderError, ProviderResult};

/// Configuration for the executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Per-operation timeout
    pub timeout: Duration,
    /// Parallel documents per model when no override matches
    pub default_concurrency: usize,
    /// Per-model concurrency overrides
    pub concurrency_overrides: HashMap<String, usize>,
    /// Uppercase string leaves before scoring
    pub ignore_case: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            default_concurrency: 20,
            concurrency_overrides: HashMap::new(),
            ignore_case: false,
        }
    }
}

impl ExecutorConfig {
    /// Derive executor settings from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.benchmark.timeout_secs),
            default_concurrency: config.benchmark.default_concurrency,
            concurrency_overrides: config.concurrency.clone(),
            ignore_case: config.benchmark.ignore_case,
        }
    }

    fn concurrency_for(&self, model: &str) -> usize {
        self.concurrency_overrides
            .get(model)
            .copied()
            .or_else(|| builtin_concurrency(model))
            .unwrap_or(self.default_concurrency)
    }

    /// Concurrency budget for a pipeline: the tighter of its two models
    fn concurrency_for_spec(&self, spec: &ModelSpec) -> usize {
        let ocr_limit = self.concurrency_for(&spec.ocr);
        let limit = match &spec.extraction {
            Some(extraction) => ocr_limit.min(self.concurrency_for(extraction)),
            None => ocr_limit,
        };
        limit.max(1)
    }
}

/// Executor for running benchmark pipelines
pub struct Executor {
    config: ExecutorConfig,
    progress: Arc<dyn ProgressCallback>,
}

impl Executor {
    /// Create a new executor
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Report per-document progress through `progress`
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Run every model pipeline over every document. Models run concurrently;
    /// documents within a model run under that model's concurrency budget.
    pub async fn run(&self, models: &[ModelSpec], documents: &[Document]) -> Vec<BenchmarkResult> {
        let mut handles = Vec::new();

        for spec in models {
            let spec = spec.clone();
            let documents = documents.to_vec();
            let config = self.config.clone();
            let progress = self.progress.clone();

            handles.push(tokio::spawn(async move {
                let executor = Executor { config, progress };
                executor.run_model(&spec, &documents).await
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(model_results) => results.extend(model_results),
                Err(e) => tracing::error!("Model execution panicked: {}", e),
            }
        }
        results
    }

    /// Run one model pipeline, resolving its providers from the environment
    pub async fn run_model(
        &self,
        spec: &ModelSpec,
        documents: &[Document],
    ) -> Vec<BenchmarkResult> {
        let mut setup_error = None;

        // the OCR step never runs for direct image extraction
        let ocr = if spec.direct_image_extraction {
            None
        } else {
            match get_model_provider(&spec.ocr) {
                Ok(provider) => provider,
                Err(e) => {
                    setup_error = Some(format!("OCR provider '{}': {}", spec.ocr, e));
                    None
                }
            }
        };
        let extraction = match &spec.extraction {
            Some(model) => match get_model_provider(model) {
                Ok(provider) => provider,
                Err(e) => {
                    setup_error = Some(format!("extraction provider '{}': {}", model, e));
                    None
                }
            },
            None => None,
        };

        self.run_model_with_providers(spec, documents, ocr, extraction, setup_error)
            .await
    }

    /// Run one model pipeline with already-constructed providers. The seam
    /// the tests drive with in-process stubs.
    pub async fn run_model_with_providers(
        &self,
        spec: &ModelSpec,
        documents: &[Document],
        ocr: Option<Arc<dyn ModelProvider>>,
        extraction: Option<Arc<dyn ModelProvider>>,
        setup_error: Option<String>,
    ) -> Vec<BenchmarkResult> {
        let label = spec.label();
        let concurrency = self.config.concurrency_for_spec(spec);
        tracing::info!(
            "Running {} over {} documents ({} parallel)",
            label,
            documents.len(),
            concurrency
        );

        let run = Arc::new(ModelRun {
            spec: spec.clone(),
            label,
            timeout: self.config.timeout,
            ignore_case: self.config.ignore_case,
            ocr,
            extraction,
            setup_error,
            semaphore: Semaphore::new(concurrency),
            progress: self.progress.clone(),
            completed: AtomicUsize::new(0),
            total: documents.len(),
        });

        let mut handles = Vec::new();
        for document in documents {
            let run = run.clone();
            let document = document.clone();
            handles.push(tokio::spawn(async move { run.process(document).await }));
        }

        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!("Document task panicked: {}", e),
            }
        }
        results
    }
}

/// State shared by every document task of one model pipeline
struct ModelRun {
    spec: ModelSpec,
    label: String,
    timeout: Duration,
    ignore_case: bool,
    ocr: Option<Arc<dyn ModelProvider>>,
    extraction: Option<Arc<dyn ModelProvider>>,
    setup_error: Option<String>,
    semaphore: Semaphore,
    progress: Arc<dyn ProgressCallback>,
    completed: AtomicUsize,
    total: usize,
}

impl ModelRun {
    async fn process(&self, document: Document) -> BenchmarkResult {
        // acquire() only fails when the semaphore is closed, which never
        // happens here
        let _permit = self.semaphore.acquire().await.expect("semaphore closed");

        let mut result = BenchmarkResult::new(&self.spec, &document);

        if let Err(e) = self.pipeline(&document, &mut result).await {
            tracing::error!(
                "Error processing {} with {}: {}",
                document.image_url,
                self.label,
                e
            );
            result.error = Some(e.to_string());
        }

        if let Some(predicted) = result.predicted_json.clone().filter(|v| !v.is_null()) {
            let accuracy =
                calculate_json_accuracy(&document.true_json_output, &predicted, self.ignore_case);
            result.json_accuracy = Some(accuracy.score);
            result.json_diff = Some(accuracy.json_diff);
            result.full_json_diff = Some(accuracy.full_json_diff);
            result.json_diff_stats = Some(accuracy.json_diff_stats);
        }

        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        self.progress
            .on_document_complete(&self.label, &document.image_url, result.error.is_none());
        self.progress.on_progress(&self.label, completed, self.total);

        result
    }

    async fn pipeline(
        &self,
        document: &Document,
        result: &mut BenchmarkResult,
    ) -> ProviderResult<()> {
        if let Some(message) = &self.setup_error {
            return Err(ProviderError::Config(message.clone()));
        }

        if self.spec.direct_image_extraction {
            let provider = self.extraction.as_ref().ok_or_else(|| {
                ProviderError::Config(
                    "extraction provider required for direct image extraction".to_string(),
                )
            })?;
            let extraction = self
                .call(provider.extract_from_image(&document.image_url, &document.json_schema))
                .await?;
            result.predicted_json = extraction.json;
            stage_usage(result).extraction = Some(extraction.usage);
            return Ok(());
        }

        if self.spec.ocr == "ground-truth" {
            result.predicted_markdown = Some(document.true_markdown_output.clone());
        } else if let Some(provider) = &self.ocr {
            let ocr = self.call(provider.ocr(&document.image_url)).await?;
            result.predicted_markdown = ocr.text;
            stage_usage(result).ocr = Some(ocr.usage);
        }

        if let Some(provider) = &self.extraction {
            let text = result.predicted_markdown.clone().unwrap_or_default();
            let extraction = self
                .call(provider.extract_from_text(&text, &document.json_schema))
                .await?;
            result.predicted_json = extraction.json;
            stage_usage(result).extraction = Some(extraction.usage);
        }

        Ok(())
    }

    async fn call<T>(
        &self,
        operation: impl std::future::Future<Output = ProviderResult<T>>,
    ) -> ProviderResult<T> {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}

fn stage_usage(result: &mut BenchmarkResult) -> &mut StageUsage {
    result.usage.get_or_insert_with(StageUsage::default)
}

/// Progress callback for tracking execution
pub trait ProgressCallback: Send + Sync {
    fn on_document_complete(&self, model: &str, file_url: &str, success: bool);
    fn on_progress(&self, model: &str, completed: usize, total: usize);
}

/// Default no-op progress callback
pub struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_document_complete(&self, _model: &str, _file_url: &str, _success: bool) {}
    fn on_progress(&self, _model: &str, _completed: usize, _total: usize) {}
}

/// Console progress callback
pub struct ConsoleProgress;

impl ProgressCallback for ConsoleProgress {
    fn on_document_complete(&self, model: &str, file_url: &str, success: bool) {
        let status = if success { "ok" } else { "FAILED" };
        println!("  [{}] {} {}", model, file_url, status);
    }

    fn on_progress(&self, model: &str, completed: usize, total: usize) {
        if completed == total {
            println!("[{}] {}/{} documents complete", model, completed, total);
        }
    }
}
