use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileLattice};
use super::models::{
    BatchAppConfig, MarkovAppConfig, OutputSettings, StructureSettings, SupercellAppConfig,
};
use crate::cli::{BatchArgs, CommonArgs, MarkovArgs, SupercellArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use nalgebra::Vector3;
use stackfault::core::io::unitcell::UnitcellFormat;
use stackfault::core::models::lattice::Lattice;
use stackfault::engine::config::{BatchConfigBuilder, FaultParameters, MarkovConfigBuilder};
use std::path::PathBuf;
use tracing::{debug, info};

pub fn build_supercell_config(args: &SupercellArgs) -> Result<SupercellAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(&args.common)?;

    let structure = merge_structure(&args.common, &mut file_config, &defaults)?;
    let faults = file_config.faults.take().unwrap_or_default();

    let faulted_layer = args.faulted_layer.clone().or(faults.faulted_layer);
    let vector = args.vector.or(faults.vector).map(Vector3::from);
    let probability = args.probability.or(faults.probability);
    let fault = FaultParameters::from_parts(faulted_layer.as_deref(), vector, probability)?;

    Ok(SupercellAppConfig {
        structure,
        fault,
        name: args.name.clone(),
        output: merge_output(&args.common, &mut file_config, None, &defaults),
    })
}

pub fn build_batch_config(args: &BatchArgs) -> Result<BatchAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(&args.common)?;

    let structure = merge_structure(&args.common, &mut file_config, &defaults)?;
    let faults = file_config.faults.take().unwrap_or_default();

    let mut builder = BatchConfigBuilder::new().n_stacks(structure.n_stacks);
    if let Some(layer) = args.faulted_layer.clone().or(faults.faulted_layer) {
        builder = builder.faulted_layer(layer);
    }
    if let Some(probabilities) = args.probabilities.clone().or(faults.probabilities) {
        builder = builder.probabilities(probabilities);
    }
    let vectors = if args.vectors.is_empty() {
        faults.vectors
    } else {
        Some(args.vectors.clone())
    };
    if let Some(vectors) = vectors {
        builder = builder.vectors(vectors.into_iter().map(Vector3::from).collect());
    }
    let batch = builder.build()?;

    Ok(BatchAppConfig {
        structure,
        batch,
        output: merge_output(
            &args.common,
            &mut file_config,
            args.table_name.as_deref(),
            &defaults,
        ),
    })
}

pub fn build_markov_config(args: &MarkovArgs) -> Result<MarkovAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(&args.common)?;

    let structure = merge_structure(&args.common, &mut file_config, &defaults)?;
    let faults = file_config.faults.take().unwrap_or_default();
    let transition = file_config.transition.take().unwrap_or_default();

    let table_path = args.table.clone().or(transition.table).ok_or_else(|| {
        CliError::Config(
            "No transition table given. Use --table or set `transition.table`.".to_string(),
        )
    })?;

    let mut builder = MarkovConfigBuilder::new().n_stacks(structure.n_stacks);
    if let Some(layer) = args.faulted_layer.clone().or(faults.faulted_layer) {
        builder = builder.faulted_layer(layer);
    }
    if let Some(probabilities) = args.probabilities.clone().or(transition.probabilities) {
        builder = builder.probabilities(probabilities);
    }
    let markov = builder.build()?;

    Ok(MarkovAppConfig {
        structure,
        table_path,
        markov,
        output: merge_output(&args.common, &mut file_config, None, &defaults),
    })
}

fn load_file_config(common: &CommonArgs) -> Result<FileConfig> {
    let file_config = match &common.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    apply_set_values(file_config, &common.set_values)
}

fn merge_structure(
    common: &CommonArgs,
    file_config: &mut FileConfig,
    defaults: &DefaultsConfig,
) -> Result<StructureSettings> {
    let file = file_config.structure.take().unwrap_or_default();

    let path = common.input.clone().or(file.path).ok_or_else(|| {
        CliError::Config(
            "No unit-cell file given. Use --input or set `structure.path`.".to_string(),
        )
    })?;

    let format = match (common.format, file.format) {
        (Some(f), _) => Some(UnitcellFormat::from(f)),
        (None, Some(text)) => Some(
            text.parse::<UnitcellFormat>()
                .map_err(|e| CliError::Config(e.to_string()))?,
        ),
        (None, None) => None,
    };

    let csv_lattice = match (common.lattice, file.lattice) {
        (Some([a, b, c, alpha, beta, gamma]), _) => Some(lattice(a, b, c, alpha, beta, gamma)?),
        (None, Some(FileLattice {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        })) => Some(lattice(a, b, c, alpha, beta, gamma)?),
        (None, None) => None,
    };

    let n_stacks = common
        .n_stacks
        .or(file.n_stacks)
        .unwrap_or(defaults.n_stacks);

    let (seed, seed_drawn) = match common.seed.or(file.seed) {
        Some(seed) => (seed, false),
        None => {
            let seed = rand::random::<u64>();
            info!(seed, "No seed given; drew one from entropy.");
            (seed, true)
        }
    };

    Ok(StructureSettings {
        path,
        format,
        csv_lattice,
        n_stacks,
        seed,
        seed_drawn,
    })
}

fn lattice(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<Lattice> {
    Lattice::new(a, b, c, alpha, beta, gamma)
        .map_err(|e| CliError::Config(format!("Invalid lattice: {}", e)))
}

fn merge_output(
    common: &CommonArgs,
    file_config: &mut FileConfig,
    table_name: Option<&str>,
    defaults: &DefaultsConfig,
) -> OutputSettings {
    let file = file_config.output.take().unwrap_or_default();
    OutputSettings {
        directory: common
            .output_dir
            .clone()
            .or(file.directory)
            .unwrap_or_else(|| defaults.output_directory.clone()),
        table_name: table_name
            .map(str::to_string)
            .or(file.table_name)
            .unwrap_or_else(|| defaults.table_name.clone()),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn parse_list(key: &str, value: &str) -> Result<Vec<f64>> {
    value
        .split(',')
        .map(|part| parse_value(key, part.trim(), "float"))
        .collect()
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) =
            parser::parse_assignment(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;
        debug!(key, value, "Applying configuration override.");

        match key {
            "structure.path" => {
                config.structure.get_or_insert_with(Default::default).path =
                    Some(PathBuf::from(value));
            }
            "structure.format" => {
                config.structure.get_or_insert_with(Default::default).format =
                    Some(value.to_string());
            }
            "structure.n-stacks" => {
                let n = parse_value(key, value, "integer")?;
                config.structure.get_or_insert_with(Default::default).n_stacks = Some(n);
            }
            "structure.seed" => {
                let seed = parse_value(key, value, "integer")?;
                config.structure.get_or_insert_with(Default::default).seed = Some(seed);
            }
            "faults.faulted-layer" => {
                config.faults.get_or_insert_with(Default::default).faulted_layer =
                    Some(value.to_string());
            }
            "faults.probability" => {
                let p = parse_value(key, value, "float")?;
                config.faults.get_or_insert_with(Default::default).probability = Some(p);
            }
            "faults.vector" => {
                let v = parser::parse_vector(value).map_err(|e| CliError::Config(e.to_string()))?;
                config.faults.get_or_insert_with(Default::default).vector = Some(v);
            }
            "faults.probabilities" => {
                let list = parse_list(key, value)?;
                config.faults.get_or_insert_with(Default::default).probabilities = Some(list);
            }
            "faults.vectors" => {
                let vectors = value
                    .split(';')
                    .map(parser::parse_vector)
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| CliError::Config(e.to_string()))?;
                config.faults.get_or_insert_with(Default::default).vectors = Some(vectors);
            }
            "transition.table" => {
                config.transition.get_or_insert_with(Default::default).table =
                    Some(PathBuf::from(value));
            }
            "transition.probabilities" => {
                let list = parse_list(key, value)?;
                config
                    .transition
                    .get_or_insert_with(Default::default)
                    .probabilities = Some(list);
            }
            "output.directory" => {
                config.output.get_or_insert_with(Default::default).directory =
                    Some(PathBuf::from(value));
            }
            "output.table-name" => {
                config.output.get_or_insert_with(Default::default).table_name =
                    Some(value.to_string());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use stackfault::engine::config::ConfigError;
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["stackfault"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv).command
    }

    fn batch_args(args: &[&str]) -> BatchArgs {
        match parse(&[&["batch"][..], args].concat()) {
            Commands::Batch(a) => a,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn supercell_args(args: &[&str]) -> SupercellArgs {
        match parse(&[&["supercell"][..], args].concat()) {
            Commands::Supercell(a) => a,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn markov_args(args: &[&str]) -> MarkovArgs {
        match parse(&[&["markov"][..], args].concat()) {
            Commands::Markov(a) => a,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn supercell_defaults_fill_missing_values() {
        let args = supercell_args(&["-i", "cell.toml", "--seed", "7"]);
        let app = build_supercell_config(&args).unwrap();

        assert_eq!(app.structure.path, PathBuf::from("cell.toml"));
        assert_eq!(app.structure.n_stacks, 1);
        assert_eq!(app.structure.seed, 7);
        assert!(!app.structure.seed_drawn);
        assert_eq!(app.structure.format, None);
        assert!(app.fault.is_none());
        assert_eq!(app.output.directory, PathBuf::from("."));
        assert_eq!(app.output.table_name, "models.csv");
    }

    #[test]
    fn missing_seed_is_drawn_and_flagged() {
        let app = build_supercell_config(&supercell_args(&["-i", "cell.toml"])).unwrap();
        assert!(app.structure.seed_drawn);

        let app =
            build_supercell_config(&supercell_args(&["-i", "cell.toml", "-S", "structure.seed=5"]))
                .unwrap();
        assert_eq!(app.structure.seed, 5);
        assert!(!app.structure.seed_drawn);
    }

    #[test]
    fn supercell_requires_complete_fault_parameters() {
        let args = supercell_args(&["-i", "cell.toml", "--faulted-layer", "A", "-p", "0.1"]);
        assert!(matches!(
            build_supercell_config(&args),
            Err(CliError::Parameters(ConfigError::PartialFaultParameters { .. }))
        ));

        let args = supercell_args(&[
            "-i",
            "cell.toml",
            "--faulted-layer",
            "A",
            "-p",
            "0.1",
            "--vector",
            "0.25,0,0",
        ]);
        let app = build_supercell_config(&args).unwrap();
        let fault = app.fault.unwrap();
        assert_eq!(fault.faulted_layer(), "A");
        assert_eq!(fault.displacement(), &Vector3::new(0.25, 0.0, 0.0));
    }

    #[test]
    fn missing_input_is_a_configuration_error() {
        let args = supercell_args(&[]);
        assert!(matches!(
            build_supercell_config(&args),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn batch_reads_file_and_cli_overrides_it() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("run.toml");
        fs::write(
            &cfg_path,
            r#"
            [structure]
            path = "cell.csv"
            n-stacks = 20
            seed = 3

            [structure.lattice]
            a = 2.5
            b = 2.5
            c = 7.0
            alpha = 90.0
            beta = 90.0
            gamma = 120.0

            [faults]
            faulted-layer = "A"
            probabilities = [0.1, 0.2]
            vectors = [[0.25, 0.0, 0.0]]

            [output]
            directory = "results"
            "#,
        )
        .unwrap();

        let args = batch_args(&[
            "-c",
            cfg_path.to_str().unwrap(),
            "-n",
            "30",
            "--vector",
            "0,0.25,0",
            "--vector",
            "0.25,0.25,0",
        ]);
        let app = build_batch_config(&args).unwrap();

        assert_eq!(app.structure.path, dir.path().join("cell.csv"));
        assert_eq!(app.structure.seed, 3);
        assert_eq!(app.structure.csv_lattice.unwrap().c(), 7.0);
        assert_eq!(app.batch.n_stacks, 30);
        assert_eq!(app.batch.faulted_layer, "A");
        assert_eq!(app.batch.probabilities, vec![0.1, 0.2]);
        assert_eq!(app.batch.vectors.len(), 2);
        assert_eq!(app.batch.vectors[0], Vector3::new(0.0, 0.25, 0.0));
        assert_eq!(app.output.directory, PathBuf::from("results"));
    }

    #[test]
    fn batch_without_vectors_names_the_missing_parameter() {
        let args = batch_args(&["-i", "cell.toml", "--faulted-layer", "A", "-p", "0.1"]);
        assert!(matches!(
            build_batch_config(&args),
            Err(CliError::Parameters(ConfigError::MissingParameter("vectors")))
        ));
    }

    #[test]
    fn set_values_override_file_values() {
        let args = batch_args(&[
            "-i",
            "cell.toml",
            "-S",
            "structure.n-stacks=12",
            "-S",
            "faults.faulted-layer=B",
            "-S",
            "faults.probabilities=0.05,0.5",
            "-S",
            "faults.vectors=0.33,0,0;0,0.33,0",
            "-S",
            "output.table-name=table.csv",
            "-S",
            "structure.format=toml",
        ]);
        let app = build_batch_config(&args).unwrap();
        assert_eq!(app.batch.n_stacks, 12);
        assert_eq!(app.batch.faulted_layer, "B");
        assert_eq!(app.batch.probabilities, vec![0.05, 0.5]);
        assert_eq!(app.batch.vectors[1], Vector3::new(0.0, 0.33, 0.0));
        assert_eq!(app.output.table_name, "table.csv");
        assert_eq!(app.structure.format, Some(UnitcellFormat::Toml));
    }

    #[test]
    fn unsupported_set_key_is_rejected() {
        let args = batch_args(&["-i", "cell.toml", "-S", "faults.color=red"]);
        assert!(matches!(build_batch_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn markov_requires_a_table() {
        let args = markov_args(&["-i", "cell.toml", "--faulted-layer", "B", "-p", "0.1"]);
        assert!(matches!(build_markov_config(&args), Err(CliError::Config(_))));

        let args = markov_args(&[
            "-i",
            "cell.toml",
            "-t",
            "table.csv",
            "--faulted-layer",
            "B",
            "-p",
            "0.1,0.3",
            "-n",
            "100",
        ]);
        let app = build_markov_config(&args).unwrap();
        assert_eq!(app.table_path, PathBuf::from("table.csv"));
        assert_eq!(app.markov.probabilities, vec![0.1, 0.3]);
        assert_eq!(app.markov.n_stacks, 100);
    }

    #[test]
    fn invalid_cli_lattice_is_reported() {
        let args = supercell_args(&["-i", "cell.csv", "--lattice", "2.5,2.5,-7,90,90,120"]);
        assert!(matches!(
            build_supercell_config(&args),
            Err(CliError::Config(_))
        ));
    }
}
