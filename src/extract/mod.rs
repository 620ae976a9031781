// src/extract/mod.rs

use std::{
    fs::{self, File},
    io::Read,
    path::Path,
};

use anyhow::{Context, Result};
use tracing::{info, instrument};
use zip::ZipArchive;

/// Unpack every `.csv` entry of the quarterly distribution ZIP flat into
/// `data_dir`, overwriting any leftovers from a previous run. Returns the
/// number of files extracted.
#[instrument(level = "info", skip(zip_path, data_dir), fields(zip = %zip_path.as_ref().display()))]
pub fn unpack_quarter_zip<P: AsRef<Path>, Q: AsRef<Path>>(zip_path: P, data_dir: Q) -> Result<usize> {
    let data_dir = data_dir.as_ref();
    fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;

    let file = File::open(&zip_path)
        .with_context(|| format!("opening ZIP {}", zip_path.as_ref().display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("reading ZIP {}", zip_path.as_ref().display()))?;

    let mut extracted = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("accessing ZIP entry #{i}"))?;
        if !entry.is_file() || !entry.name().to_lowercase().ends_with(".csv") {
            continue;
        }

        // flatten: the extract is a single quarter, nested paths carry no meaning
        let file_name = Path::new(entry.name())
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| entry.name().to_string());

        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .with_context(|| format!("reading {} from ZIP", file_name))?;
        let dest = data_dir.join(&file_name);
        fs::write(&dest, &buf).with_context(|| format!("writing {}", dest.display()))?;
        extracted += 1;
    }

    info!(extracted, "unpacked quarterly extract");
    Ok(extracted)
}
