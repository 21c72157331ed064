pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export logic types
pub use logic::{
    AuxiliaryPropertyTracker, CatalogLinter, EditorError, EditorPhase, FieldError,
    FieldErrorType, FieldRules, FormError, FormRuntime, LintIssue, LintIssueType,
    PendingSubmission, PropertyEditor, SchemaResolver, SubmitAttempt, SubmitOutcome,
    ValidationResult,
};

// Export all model types
pub use model::*;

// Export seed catalog
pub use seed::*;

// Export store types
pub use store::{MemoryPropertyStore, PropertySource, PropertySubmitter};
