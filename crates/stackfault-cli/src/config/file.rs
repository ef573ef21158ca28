use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lattice given in the run configuration, used for CSV unit cells.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileLattice {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileStructureConfig {
    pub path: Option<PathBuf>,
    pub format: Option<String>,
    pub n_stacks: Option<usize>,
    pub seed: Option<u64>,
    pub lattice: Option<FileLattice>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileFaultsConfig {
    pub faulted_layer: Option<String>,
    /// Single-structure runs.
    pub probability: Option<f64>,
    pub vector: Option<[f64; 3]>,
    /// Batch runs.
    pub probabilities: Option<Vec<f64>>,
    pub vectors: Option<Vec<[f64; 3]>>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileTransitionConfig {
    pub table: Option<PathBuf>,
    pub probabilities: Option<Vec<f64>>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileOutputConfig {
    pub directory: Option<PathBuf>,
    pub table_name: Option<String>,
}

/// The run configuration file as written by the user. Every key is optional;
/// missing values are filled from the command line and defaults.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub structure: Option<FileStructureConfig>,
    pub faults: Option<FileFaultsConfig>,
    pub transition: Option<FileTransitionConfig>,
    pub output: Option<FileOutputConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.resolve_relative_paths(path.parent().unwrap_or(Path::new("")));
        Ok(config)
    }

    /// Makes input paths relative to the directory holding the config file.
    fn resolve_relative_paths(&mut self, base: &Path) {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(path) = self.structure.as_mut().and_then(|s| s.path.as_mut()) {
            rebase(path);
        }
        if let Some(table) = self.transition.as_mut().and_then(|t| t.table.as_mut()) {
            rebase(table);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn from_file_reads_every_section() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(
            &path,
            r#"
            [structure]
            path = "cells/graphite.toml"
            n-stacks = 50
            seed = 42

            [faults]
            faulted-layer = "B"
            probabilities = [0.05, 0.1]
            vectors = [[0.333, 0.0, 0.0], [0.0, 0.333, 0.0]]

            [transition]
            table = "/abs/transitions.csv"
            probabilities = [0.2]

            [output]
            directory = "out"
            table-name = "summary.csv"
            "#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        let structure = config.structure.unwrap();
        assert_eq!(structure.path, Some(dir.path().join("cells/graphite.toml")));
        assert_eq!(structure.n_stacks, Some(50));
        assert_eq!(structure.seed, Some(42));

        let faults = config.faults.unwrap();
        assert_eq!(faults.faulted_layer.as_deref(), Some("B"));
        assert_eq!(faults.vectors.unwrap().len(), 2);

        let transition = config.transition.unwrap();
        assert_eq!(transition.table, Some(PathBuf::from("/abs/transitions.csv")));

        let output = config.output.unwrap();
        assert_eq!(output.directory, Some(PathBuf::from("out")));
        assert_eq!(output.table_name.as_deref(), Some("summary.csv"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, "[structure]\nstacks = 3\n").unwrap();
        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            FileConfig::from_file(Path::new("/no/such/run.toml")),
            Err(CliError::Io(_))
        ));
    }
}
