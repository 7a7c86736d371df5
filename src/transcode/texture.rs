//! Block compression of textures

use crate::error::BundleResult;
use crate::manifest::TextureItem;
use crate::tool::{Arg, ToolCommand, ToolStatus};
use crate::transcode::{discard_outputs, TranscodeContext};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Compressed format every texture is encoded to
pub const TEXTURE_FORMAT: &str = "BC7";

/// Compresses source images into DDS textures
pub struct TextureCompressor {
    compressor: PathBuf,
    target_dir: PathBuf,
}

impl TextureCompressor {
    pub fn new(compressor: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            compressor: compressor.into(),
            target_dir: target_dir.into(),
        }
    }

    pub fn output_path(&self, item: &TextureItem) -> PathBuf {
        self.target_dir.join(format!("{}.dds", item.name))
    }

    pub fn command(&self, item: &TextureItem, source: &Path) -> ToolCommand {
        ToolCommand::new(&self.compressor)
            .arg(Arg::group(["-fd", TEXTURE_FORMAT]))
            .arg(source)
            .arg(self.output_path(item))
            .arg(Arg::group(["-miplevels".to_string(), item.mips().to_string()]))
    }

    pub async fn compress(
        &self,
        item: &TextureItem,
        input_dir: &Path,
        ctx: &mut TranscodeContext<'_>,
    ) -> BundleResult<ToolStatus> {
        let source = input_dir.join(&item.path);
        ctx.deps.add(&source);

        let output = self.output_path(item);
        let dirty = ctx.cache.is_dirty(&source)?;
        if !dirty && output.is_file() {
            debug!("Texture {} is up to date", item.name);
            return Ok(ToolStatus::Success);
        }

        info!(
            "Compressing texture {} into {} (mips={})",
            item.path.display(),
            output.display(),
            item.mips()
        );
        let status = ctx.runner.run(&self.command(item, &source)).await;
        if !status.success() {
            discard_outputs(&[output]);
        }
        Ok(status)
    }
}
