//! Third party license collection

use crate::bundle::layout::{copy_file, LICENSES_DIR};
use crate::depfile::DependencyRecord;
use crate::error::{BundleError, BundleResult};
use crate::manifest::LicenseItem;
use std::fs;
use std::path::Path;
use tracing::info;

/// Aggregated license file name at the bundle root
pub const LICENSES_FILE: &str = "LICENSES.md";

const LICENSES_PREAMBLE: &str = "# Third party licenses\n\n\
All third party licenses are included below as well as in the licenses directory.\n\n";

/// Copy each license into `licenses/<ID>.LICENSE.md` and write the
/// aggregated `LICENSES.md`
///
/// Not cache gated: the bundle directory is rebuilt from scratch each run.
pub fn write_licenses(
    items: &[LicenseItem],
    input_dir: &Path,
    bundle_dir: &Path,
    deps: &mut DependencyRecord,
) -> BundleResult<()> {
    let mut aggregated = String::from(LICENSES_PREAMBLE);

    for item in items {
        let source = input_dir.join(&item.path);
        deps.add(&source);

        let target = bundle_dir
            .join(LICENSES_DIR)
            .join(format!("{}.LICENSE.md", item.id.to_uppercase()));
        copy_file(&source, &target)?;

        let text = fs::read_to_string(&source).map_err(|e| {
            BundleError::io(format!("reading license {}", source.display()), e)
        })?;

        aggregated.push_str(&format!("## {}\n\n", item.name));
        aggregated.push_str(&format!("Project url: {}\n\n", item.url));
        aggregated.push_str(&text);
        aggregated.push('\n');
    }

    let path = bundle_dir.join(LICENSES_FILE);
    fs::write(&path, aggregated)
        .map_err(|e| BundleError::io(format!("writing {}", path.display()), e))?;

    info!("Collected {} licenses", items.len());
    Ok(())
}
