//! The validation-collaborator interface
//!
//! Validation is performed by an external engine. This module defines the
//! narrow call surface: the data graph, the shape graph, a small option
//! set, and the report that comes back. Implementations typically wrap a
//! real SHACL processor; tests can stub one.

use crate::error::Result;
use graphbind_graph_ir::Graph;

/// Inference applied by the validator before checking constraints
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Inference {
    /// No inference
    #[default]
    None,
    /// RDFS entailment
    Rdfs,
    /// OWL-RL entailment
    OwlRl,
    /// RDFS followed by OWL-RL
    Both,
}

/// Options forwarded to the validation engine
#[derive(Clone, Copy, Debug, Default)]
pub struct ValidationOptions {
    /// Entailment regime to apply before validation
    pub inference: Inference,
    /// Stop at the first violation instead of collecting all of them
    pub abort_on_first: bool,
    /// Validate the shape graph itself against the SHACL-SHACL shapes
    pub meta_shacl: bool,
    /// Enable SHACL Advanced Features (rules, custom targets)
    pub advanced: bool,
    /// Emit the engine's debug trace
    pub debug: bool,
}

/// The validator's verdict
#[derive(Clone, Debug)]
pub struct ValidationReport {
    /// Whether the data graph conforms to the shapes
    pub conforms: bool,
    /// The validation report as a graph
    pub report: Graph,
    /// Human-readable report text
    pub text: String,
}

impl ValidationReport {
    /// A conforming report with no findings
    pub fn conforming() -> Self {
        Self {
            conforms: true,
            report: Graph::new(),
            text: String::new(),
        }
    }
}

/// External SHACL validation engine
///
/// Engine faults surface as [`crate::ShaclError::Validator`] and propagate
/// unchanged to the caller.
pub trait ShapeValidator {
    /// Validate a data graph against a shape graph
    fn validate(
        &self,
        data: &Graph,
        shapes: &Graph,
        options: &ValidationOptions,
    ) -> Result<ValidationReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysConforms;

    impl ShapeValidator for AlwaysConforms {
        fn validate(
            &self,
            _data: &Graph,
            _shapes: &Graph,
            _options: &ValidationOptions,
        ) -> Result<ValidationReport> {
            Ok(ValidationReport::conforming())
        }
    }

    #[test]
    fn options_default_to_plain_validation() {
        let options = ValidationOptions::default();
        assert_eq!(options.inference, Inference::None);
        assert!(!options.abort_on_first);
        assert!(!options.meta_shacl);
        assert!(!options.advanced);
        assert!(!options.debug);
    }

    #[test]
    fn stub_validator_round_trip() {
        let report = AlwaysConforms
            .validate(&Graph::new(), &Graph::new(), &ValidationOptions::default())
            .unwrap();
        assert!(report.conforms);
        assert!(report.report.is_empty());
    }
}
