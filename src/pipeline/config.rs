use crate::repository::RepositoryRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Base image whose dependents get rebuilt
    pub target_image: String,
    /// Repository whose build caused this run
    pub source: RepositoryRef,
    pub dry_run: bool,
}

impl PipelineConfig {
    pub fn new(target_image: impl Into<String>, source: RepositoryRef) -> Self {
        Self {
            target_image: target_image.into(),
            source,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new("python:3.9", RepositoryRef::new("docker", "python"))
            .with_dry_run(true);

        assert_eq!(config.target_image, "python:3.9");
        assert_eq!(config.source.full_name(), "docker/python");
        assert!(config.dry_run);
    }

    #[test]
    fn test_dry_run_off_by_default() {
        let config = PipelineConfig::new("node:18", RepositoryRef::new("docker", "node"));
        assert!(!config.dry_run);
    }
}
