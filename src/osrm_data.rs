//! Local OSRM dataset provisioning.
//!
//! Downloads an OpenStreetMap extract and runs the OSRM preprocessing
//! pipeline (extract, partition, customize) in Docker so a self-hosted
//! router can serve the delivery area.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::info;

const OSRM_IMAGE: &str = "osrm/osrm-backend";

/// An extract published by Geofabrik, e.g. `south-america/brazil/sudeste`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extract {
    pub path: String,
}

impl Extract {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Extract covering Mogi das Cruzes.
    pub fn sudeste() -> Self {
        Self::new("south-america/brazil/sudeste")
    }

    /// Last path segment, used for file names.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("region")
    }

    /// Download URL of the `.osm.pbf` extract.
    pub fn url(&self) -> String {
        format!("https://download.geofabrik.de/{}-latest.osm.pbf", self.path)
    }
}

/// Where and how to prepare a dataset.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub extract: Extract,
    pub data_root: PathBuf,
    /// Lua profile shipped in the OSRM image, e.g. `car`.
    pub profile: String,
}

impl DatasetConfig {
    pub fn new(extract: Extract, data_root: impl Into<PathBuf>) -> Self {
        Self {
            extract,
            data_root: data_root.into(),
            profile: "car".to_string(),
        }
    }
}

/// Paths of a prepared dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub data_dir: PathBuf,
    pub osrm_base: PathBuf,
}

impl Dataset {
    /// File name the `osrm-routed` command should be pointed at inside `/data`.
    pub fn container_path(&self) -> String {
        format!("/data/{}", file_name(&self.osrm_base))
    }
}

/// Failures while downloading or preprocessing an extract.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    ProcessFailure(String),
}

/// Makes sure the dataset exists, running only the missing steps.
pub fn ensure_dataset(config: &DatasetConfig) -> Result<Dataset, DatasetError> {
    let data_root = if config.data_root.is_absolute() {
        config.data_root.clone()
    } else {
        std::env::current_dir()?.join(&config.data_root)
    };
    let name = config.extract.name();
    let data_dir = data_root.join(name);
    fs::create_dir_all(&data_dir)?;

    let pbf_path = data_dir.join(format!("{}-latest.osm.pbf", name));
    if !pbf_path.exists() {
        info!(url = %config.extract.url(), "downloading extract");
        download(&config.extract.url(), &pbf_path)?;
    }

    let osrm_base = data_dir.join(format!("{}-latest.osrm", name));
    if !osrm_base.exists() {
        info!(profile = %config.profile, "extracting road network");
        let profile = format!("/opt/{}.lua", config.profile);
        let pbf = format!("/data/{}", file_name(&pbf_path));
        run_in_docker(&["osrm-extract", "-p", &profile, &pbf], &data_dir)?;
    }

    if !partitioned(&osrm_base) {
        let base = format!("/data/{}", file_name(&osrm_base));
        info!("partitioning and customizing graph");
        run_in_docker(&["osrm-partition", &base], &data_dir)?;
        run_in_docker(&["osrm-customize", &base], &data_dir)?;
    }

    Ok(Dataset { data_dir, osrm_base })
}

fn download(url: &str, dest: &Path) -> Result<(), DatasetError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let tmp_path = dest.with_extension("part");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    writer.write_all(&response.bytes()?)?;
    writer.flush()?;
    fs::rename(tmp_path, dest)?;
    Ok(())
}

fn partitioned(osrm_base: &Path) -> bool {
    ["osrm.partition", "osrm.mldgr", "osrm.cells"]
        .iter()
        .all(|ext| osrm_base.with_extension(ext).exists())
}

fn run_in_docker(args: &[&str], data_dir: &Path) -> Result<(), DatasetError> {
    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg(OSRM_IMAGE)
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(DatasetError::ProcessFailure(format!(
            "{} exited with {}",
            args.first().copied().unwrap_or("docker"),
            status
        )))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}
