//! Prepares an OSRM MLD extract for a Geofabrik region.
//!
//! Downloads the `.osm.pbf` once and runs extract/partition/customize in
//! the `osrm/osrm-backend` image. Later runs reuse the files on disk.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

pub const OSRM_IMAGE: &str = "osrm/osrm-backend";

#[derive(Debug)]
pub struct PreparedRegion {
    /// Directory mounted as `/data` in the container.
    pub data_dir: PathBuf,
    /// File name of the `.osrm` base inside `data_dir`.
    pub osrm_file: String,
}

/// `region` is a Geofabrik path such as `"north-america/us/nevada"`.
pub fn prepare_region(region: &str, data_root: impl AsRef<Path>) -> io::Result<PreparedRegion> {
    let name = region.rsplit('/').next().unwrap_or("region");
    let data_root = data_root.as_ref();
    let data_dir = if data_root.is_absolute() {
        data_root.join(name)
    } else {
        std::env::current_dir()?.join(data_root).join(name)
    };
    fs::create_dir_all(&data_dir)?;

    let pbf_file = format!("{name}-latest.osm.pbf");
    let osrm_file = format!("{name}-latest.osrm");

    if !data_dir.join(&pbf_file).exists() {
        let url = format!("https://download.geofabrik.de/{region}-latest.osm.pbf");
        download(&url, &data_dir.join(&pbf_file))?;
    }

    if !data_dir.join(&osrm_file).exists() {
        osrm_tool(&data_dir, &["osrm-extract", "-p", "/opt/car.lua", &format!("/data/{pbf_file}")])?;
    }

    let partitioned = ["partition", "mldgr", "cells"]
        .iter()
        .all(|ext| data_dir.join(format!("{osrm_file}.{ext}")).exists());
    if !partitioned {
        osrm_tool(&data_dir, &["osrm-partition", &format!("/data/{osrm_file}")])?;
        osrm_tool(&data_dir, &["osrm-customize", &format!("/data/{osrm_file}")])?;
    }

    Ok(PreparedRegion { data_dir, osrm_file })
}

fn download(url: &str, dest: &Path) -> io::Result<()> {
    let bytes = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes())
        .map_err(io::Error::other)?;

    let tmp_path = dest.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    drop(writer);
    fs::rename(tmp_path, dest)
}

fn osrm_tool(data_dir: &Path, args: &[&str]) -> io::Result<()> {
    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg(OSRM_IMAGE)
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{} exited with {status}", args[0])))
    }
}
