//! Font atlas generation with msdf-atlas-gen

use crate::error::BundleResult;
use crate::manifest::FontItem;
use crate::tool::{Arg, ToolCommand, ToolStatus};
use crate::transcode::{discard_outputs, outputs_present, TranscodeContext};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Renders one or more font files into an atlas image plus metadata
pub struct AtlasGenerator {
    generator: PathBuf,
    target_dir: PathBuf,
}

impl AtlasGenerator {
    pub fn new(generator: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            generator: generator.into(),
            target_dir: target_dir.into(),
        }
    }

    pub fn image_path(&self, item: &FontItem) -> PathBuf {
        self.target_dir.join(format!("{}.png", item.name))
    }

    pub fn metadata_path(&self, item: &FontItem) -> PathBuf {
        self.target_dir.join(format!("{}.arfont", item.name))
    }

    /// Atlas image and its metadata sidecar
    pub fn outputs(&self, item: &FontItem) -> Vec<PathBuf> {
        vec![self.image_path(item), self.metadata_path(item)]
    }

    /// Build the generator invocation; fonts are separated by `-and`
    pub fn command(&self, item: &FontItem, fonts: &[PathBuf]) -> ToolCommand {
        let font_args: Vec<Arg> = fonts
            .iter()
            .enumerate()
            .map(|(i, font)| {
                let font = Arg::group([Arg::from("-font"), Arg::from(font)]);
                if i == 0 {
                    font
                } else {
                    Arg::group([Arg::from("-and"), font])
                }
            })
            .collect();

        ToolCommand::new(&self.generator)
            .arg(font_args)
            .arg(Arg::group(["-size".to_string(), item.em_size().to_string()]))
            .arg(Arg::group(["-format", "png"]))
            .arg(Arg::group([Arg::from("-arfont"), Arg::from(self.metadata_path(item))]))
            .arg(Arg::group([Arg::from("-imageout"), Arg::from(self.image_path(item))]))
    }

    /// Generate the atlas for `item` unless every font file is unchanged
    pub async fn build(
        &self,
        item: &FontItem,
        input_dir: &Path,
        ctx: &mut TranscodeContext<'_>,
    ) -> BundleResult<ToolStatus> {
        let fonts = item.font_files(input_dir);
        for font in &fonts {
            ctx.deps.add(font);
        }

        let dirty = ctx.cache.any_dirty(&fonts)?;
        let outputs = self.outputs(item);
        if !dirty && outputs_present(&outputs) {
            debug!("Font atlas {} is up to date", item.name);
            return Ok(ToolStatus::Success);
        }

        info!("Generating msdf atlas for {}", item.name);
        let status = ctx.runner.run(&self.command(item, &fonts)).await;
        if !status.success() {
            discard_outputs(&outputs);
        }
        Ok(status)
    }
}
