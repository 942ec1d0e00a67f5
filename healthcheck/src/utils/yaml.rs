use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::{fs::File, io::Read, path::PathBuf};

/// Parse a yaml file into a struct.
pub fn load<T: DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open the file at path: {:?}", path))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .with_context(|| format!("failed to read the file at path: {:?}", path))?;
    serde_yaml::from_str::<T>(&contents).context("Unable to parse yaml file")
}
