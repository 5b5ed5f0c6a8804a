pub mod config;
pub mod evaluator;
pub mod extract;
pub mod generator;
pub mod llm;
pub mod metrics;
pub mod orchestrator;
pub mod store;
pub mod testing;
pub mod ticket;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, MetricsConfig,
    SanitizedConfig,
};
pub use evaluator::{
    prompt_fingerprint, Confidence, DiagnosticResult, EvaluateError, Evaluator, EvaluatorConfig,
    ModelOutput, ParseFailure,
};
pub use extract::{extract, extract_as, ExtractError};
pub use generator::{
    audit_batch, BatchReport, GenerateError, GeneratedBatch, GenerationConfig,
    GenerationConstraints, TicketGenerator, ValidationIssue,
};
pub use llm::{
    build_client, CompletionRequest, CompletionResponse, LlmClient, LlmConfig, LlmError,
    LlmProvider, LlmUsage, OllamaClient, OpenAiClient, RetryConfig, RetryingClient,
};
pub use orchestrator::{
    plan_runs, BaselineConfig, BaselineRunner, BatchOutcome, BatchSummary, OrchestratorError,
    RepeatPolicy, RunFailure, RunManifest, RunRecord, SelectionPolicy,
};
pub use store::{
    load_ticket_collection, load_tickets, read_json, write_json_atomic, RejectedTicket,
    StoreError, TicketCollection,
};
pub use ticket::{AmbiguityLevel, RootCause, Severity, Ticket};
