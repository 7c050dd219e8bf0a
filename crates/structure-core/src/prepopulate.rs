use structure_models::CompleteStructure;

use crate::service::StructureService;
use crate::Error;

/// Where the startup driver should read its structure from. Validity
/// is checked once, at construction, rather than at run time: by the time
/// [`PrepopulationConfig::run`] executes there is nothing left to reject.
#[derive(Debug, Clone)]
pub struct PrepopulationConfig {
    source: Source,
    overwrite_existing: bool,
}

#[derive(Debug, Clone)]
enum Source {
    File(String),
    Inline(Box<CompleteStructure>),
    Disabled,
}

impl PrepopulationConfig {
    /// No prepopulation runs at startup.
    pub fn disabled() -> Self {
        PrepopulationConfig {
            source: Source::Disabled,
            overwrite_existing: false,
        }
    }

    /// Prepopulate by loading and validating JSON from `path` at startup.
    pub fn from_file(path: impl Into<String>, overwrite_existing: bool) -> Self {
        PrepopulationConfig {
            source: Source::File(path.into()),
            overwrite_existing,
        }
    }

    /// Prepopulate from an inline, already-parsed structure (e.g. one
    /// decoded from an environment variable by the caller).
    pub fn from_inline(structure: CompleteStructure, overwrite_existing: bool) -> Self {
        PrepopulationConfig {
            source: Source::Inline(Box::new(structure)),
            overwrite_existing,
        }
    }

    /// Runs the driver: resolves the configured source, optionally wipes
    /// the existing structure when it is non-empty and overwrite is
    /// requested, then upserts. A no-op when prepopulation is disabled.
    pub async fn run(&self, service: &StructureService) -> Result<(), Error> {
        let structure = match &self.source {
            Source::Disabled => {
                tracing::info!("prepopulation disabled, skipping");
                return Ok(());
            }
            Source::File(path) => {
                tracing::info!(path, "loading prepopulation structure from file");
                service.load_from_json_file(path).await?
            }
            Source::Inline(structure) => {
                tracing::info!("using inline prepopulation structure");
                structure.validate()?;
                (**structure).clone()
            }
        };

        if self.overwrite_existing && !service.are_structure_tables_empty().await? {
            tracing::info!("overwrite requested and structure tables are non-empty, wiping first");
            service.delete_structure().await?;
        }

        service.update_structure(&structure).await?;
        tracing::info!("prepopulation complete");
        Ok(())
    }
}

/// Raw startup flags as they arrive from process configuration (CLI flags
/// and environment variables in `structure-server`), before the exclusive
/// precedence rule between file and inline sources has been applied.
#[derive(Debug, Clone, Default)]
pub struct RawPrepopulationConfig {
    pub populate_via_file: bool,
    pub file_path: Option<String>,
    pub populate_from_env: bool,
    pub inline_structure: Option<CompleteStructure>,
    pub overwrite_existing: bool,
}

impl RawPrepopulationConfig {
    /// Validates the exclusive precedence rule and produces a
    /// [`PrepopulationConfig`]:
    /// 1. `populate_via_file` takes precedence over everything else.
    /// 2. Otherwise, `populate_from_env` requires an inline structure.
    /// 3. Neither set ⇒ prepopulation is disabled.
    pub fn build(self) -> Result<PrepopulationConfig, Error> {
        if self.populate_via_file {
            let Some(path) = self.file_path else {
                return Err(Error::Config(
                    "populate_via_file is enabled but no file path was configured".to_string(),
                ));
            };
            if self.inline_structure.is_some() {
                return Err(Error::Config(
                    "populate_via_file is enabled but an inline structure was also configured"
                        .to_string(),
                ));
            }
            return Ok(PrepopulationConfig::from_file(path, self.overwrite_existing));
        }

        if self.populate_from_env {
            let Some(structure) = self.inline_structure else {
                return Err(Error::Config(
                    "populate_from_env is enabled but no inline structure was configured"
                        .to_string(),
                ));
            };
            return Ok(PrepopulationConfig::from_inline(
                structure,
                self.overwrite_existing,
            ));
        }

        Ok(PrepopulationConfig::disabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_has_no_source() {
        let config = PrepopulationConfig::disabled();
        assert!(matches!(config.source, Source::Disabled));
    }

    #[test]
    fn neither_flag_set_disables_prepopulation() {
        let config = RawPrepopulationConfig::default().build().expect("builds");
        assert!(matches!(config.source, Source::Disabled));
    }

    #[test]
    fn populate_via_file_without_path_is_rejected() {
        let raw = RawPrepopulationConfig {
            populate_via_file: true,
            ..Default::default()
        };
        assert!(raw.build().is_err());
    }

    #[test]
    fn populate_via_file_with_inline_structure_is_rejected() {
        let raw = RawPrepopulationConfig {
            populate_via_file: true,
            file_path: Some("/tmp/structure.json".to_string()),
            inline_structure: Some(CompleteStructure::default()),
            ..Default::default()
        };
        assert!(raw.build().is_err());
    }

    #[test]
    fn populate_from_env_without_inline_structure_is_rejected() {
        let raw = RawPrepopulationConfig {
            populate_from_env: true,
            ..Default::default()
        };
        assert!(raw.build().is_err());
    }

    #[test]
    fn populate_via_file_takes_precedence() {
        let raw = RawPrepopulationConfig {
            populate_via_file: true,
            file_path: Some("/tmp/structure.json".to_string()),
            populate_from_env: true,
            ..Default::default()
        };
        let config = raw.build().expect("builds");
        assert!(matches!(config.source, Source::File(_)));
    }
}
