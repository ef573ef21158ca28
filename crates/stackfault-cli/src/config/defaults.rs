use std::path::PathBuf;

pub struct DefaultsConfig {
    pub n_stacks: usize,
    pub output_directory: PathBuf,
    pub table_name: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            n_stacks: 1,
            output_directory: PathBuf::from("."),
            table_name: "models.csv".to_string(),
        }
    }
}
