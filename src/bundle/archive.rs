//! Deterministic USTAR archive of the assembled bundle directory
//!
//! Entries are written in sorted order with zeroed timestamps and owners and
//! fixed permissions, so identical inputs produce byte-identical archives.

use crate::error::{BundleError, BundleResult};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tar::{EntryType, Header};
use tracing::{info, warn};
use walkdir::WalkDir;

const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

fn base_header(entry_type: EntryType, mode: u32, size: u64) -> Header {
    let mut header = Header::new_ustar();
    header.set_entry_type(entry_type);
    header.set_mode(mode);
    header.set_size(size);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    header
}

/// Archive `source_dir` into `archive_path` under its own directory name
///
/// Returns the number of entries written.
pub fn write_archive(source_dir: &Path, archive_path: &Path) -> BundleResult<usize> {
    let root_name = source_dir
        .file_name()
        .ok_or_else(|| BundleError::Internal(format!("cannot archive {}", source_dir.display())))?;

    if let Some(parent) = archive_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                BundleError::io(format!("creating directory {}", parent.display()), e)
            })?;
        }
    }

    let context = || format!("writing archive {}", archive_path.display());
    let file = File::create(archive_path).map_err(|e| BundleError::io(context(), e))?;
    let mut builder = tar::Builder::new(BufWriter::new(file));
    let mut count = 0;

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            BundleError::io(format!("walking {}", source_dir.display()), io::Error::from(e))
        })?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| BundleError::Internal(e.to_string()))?;
        let name = Path::new(root_name).join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            let mut header = base_header(EntryType::Directory, DIR_MODE, 0);
            builder
                .append_data(&mut header, &name, io::empty())
                .map_err(|e| BundleError::io(context(), e))?;
        } else if file_type.is_file() {
            let data = fs::read(entry.path()).map_err(|e| {
                BundleError::io(format!("reading {}", entry.path().display()), e)
            })?;
            let mut header = base_header(EntryType::Regular, FILE_MODE, data.len() as u64);
            builder
                .append_data(&mut header, &name, data.as_slice())
                .map_err(|e| BundleError::io(context(), e))?;
        } else {
            warn!("Skipping non-regular file {}", entry.path().display());
            continue;
        }
        count += 1;
    }

    let mut writer = builder.into_inner().map_err(|e| BundleError::io(context(), e))?;
    writer.flush().map_err(|e| BundleError::io(context(), e))?;

    info!("Archived {} entries into {}", count, archive_path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populate(root: &Path) {
        fs::create_dir_all(root.join("shaders")).unwrap();
        fs::create_dir_all(root.join("fonts")).unwrap();
        fs::write(root.join("LICENSES.md"), "# Third party licenses\n").unwrap();
        fs::write(root.join("shaders/basic.vs.cso"), [0u8, 1, 2, 3]).unwrap();
        fs::write(root.join("fonts/inter.png"), "png").unwrap();
    }

    #[test]
    fn entries_are_sorted_under_root_name() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("bundle");
        populate(&bundle);
        let archive = dir.path().join("out/bundle.tar");

        let count = write_archive(&bundle, &archive).unwrap();
        assert_eq!(count, 6);

        let mut reader = tar::Archive::new(File::open(&archive).unwrap());
        let names: Vec<String> = reader
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            [
                "bundle",
                "bundle/LICENSES.md",
                "bundle/fonts",
                "bundle/fonts/inter.png",
                "bundle/shaders",
                "bundle/shaders/basic.vs.cso",
            ]
        );
    }

    #[test]
    fn headers_are_normalized_ustar() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("bundle");
        populate(&bundle);
        let archive = dir.path().join("bundle.tar");
        write_archive(&bundle, &archive).unwrap();

        let mut reader = tar::Archive::new(File::open(&archive).unwrap());
        for entry in reader.entries().unwrap() {
            let entry = entry.unwrap();
            let header = entry.header();
            assert!(header.as_ustar().is_some());
            assert_eq!(header.mtime().unwrap(), 0);
            assert_eq!(header.uid().unwrap(), 0);
        }
    }

    #[test]
    fn identical_trees_produce_identical_archives() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("bundle");
        populate(&bundle);

        write_archive(&bundle, &dir.path().join("a.tar")).unwrap();
        // Rewrite every file so timestamps differ but content does not.
        populate(&bundle);
        write_archive(&bundle, &dir.path().join("b.tar")).unwrap();

        assert_eq!(
            fs::read(dir.path().join("a.tar")).unwrap(),
            fs::read(dir.path().join("b.tar")).unwrap()
        );
    }
}
