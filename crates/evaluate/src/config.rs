//! Pipeline configuration.

use mef_io::CatalogQuery;
use mef_normalize::NormalizeConfig;

use crate::aggregate::FailurePolicy;

/// Configuration for [`run_models`](crate::run_models).
#[derive(Debug, Clone, Default)]
pub struct EvaluateConfig {
    on_failure: FailurePolicy,
    normalize: NormalizeConfig,
    query: CatalogQuery,
}

impl EvaluateConfig {
    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    /// Set the normalization settings applied to every model.
    pub fn with_normalize(mut self, normalize: NormalizeConfig) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set the catalog query used to fetch every model.
    pub fn with_query(mut self, query: CatalogQuery) -> Self {
        self.query = query;
        self
    }

    /// Returns the failure policy.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.on_failure
    }

    /// Returns the normalization settings.
    pub fn normalize(&self) -> &NormalizeConfig {
        &self.normalize
    }

    /// Returns the catalog query.
    pub fn query(&self) -> &CatalogQuery {
        &self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = EvaluateConfig::default();
        assert_eq!(config.failure_policy(), FailurePolicy::Abort);
        assert_eq!(config.normalize().validity_threshold(), 100.0);
        assert_eq!(config.query().variable(), "siconc");
    }

    #[test]
    fn test_builder_methods() {
        let config = EvaluateConfig::default()
            .with_failure_policy(FailurePolicy::SkipFailed)
            .with_normalize(NormalizeConfig::default().with_validity_threshold(99.0))
            .with_query(CatalogQuery::default().with_experiment("ssp245"));
        assert_eq!(config.failure_policy(), FailurePolicy::SkipFailed);
        assert_eq!(config.normalize().validity_threshold(), 99.0);
        assert_eq!(config.query().experiment(), "ssp245");
    }
}
