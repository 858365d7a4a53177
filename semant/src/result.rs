use coolc_dsl::diagnostic::Diagnostic;

/// Defines a result type for semantic analysis.
///
/// Semantic analysis either returns nothing or
/// a list of diagnostic errors.
pub type SemanticResult = Result<(), Vec<Diagnostic>>;
