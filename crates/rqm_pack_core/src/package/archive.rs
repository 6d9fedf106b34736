//! Zip writing and archive digests.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;

use sha2::{Digest, Sha256};
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::staging::sorted_entries;

/// Zip everything below `staging_root` into `dest`.
///
/// Entry names are relative to `base` (the staging root's parent), so they
/// all start with the staging folder name. Directories get their own
/// entries. Returns the entry names in write order.
pub fn write_zip(
    base: &Path,
    staging_root: &Path,
    dest: &Path,
    compression_level: Option<i64>,
) -> ZipResult<Vec<String>> {
    let file = File::create(dest)?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(compression_level);

    let mut names = Vec::new();
    add_dir(&mut writer, base, staging_root, options, &mut names)?;

    let mut inner = writer.finish()?;
    io::Write::flush(&mut inner)?;
    Ok(names)
}

fn add_dir<W: io::Write + io::Seek>(
    writer: &mut ZipWriter<W>,
    base: &Path,
    dir: &Path,
    options: SimpleFileOptions,
    names: &mut Vec<String>,
) -> ZipResult<()> {
    for entry in sorted_entries(dir)? {
        let path = entry.path();
        let name = entry_name(base, &path)?;

        if fs::metadata(&path)?.is_dir() {
            let dir_name = format!("{}/", name);
            writer.add_directory(dir_name.as_str(), options)?;
            names.push(dir_name);
            add_dir(writer, base, &path, options, names)?;
        } else {
            writer.start_file(name.as_str(), options)?;
            let mut source = File::open(&path)?;
            io::copy(&mut source, writer)?;
            names.push(name);
        }
    }
    Ok(())
}

/// Zip entry name for `path`: relative to `base`, `/`-separated.
fn entry_name(base: &Path, path: &Path) -> io::Result<String> {
    let rel = path.strip_prefix(base).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not below {}", path.display(), base.display()),
        )
    })?;

    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// SHA-256 of a file as lowercase hex.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
