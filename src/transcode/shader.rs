//! HLSL compilation with dxc

use crate::config::ShaderConfig;
use crate::error::BundleResult;
use crate::manifest::{ShaderItem, ShaderTarget};
use crate::tool::{Arg, ToolCommand, ToolStatus};
use crate::transcode::{discard_outputs, TranscodeContext};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Compiles each declared stage of a shader into a shader object
pub struct ShaderCompiler {
    compiler: PathBuf,
    target_dir: PathBuf,
    pdb_dir: PathBuf,
    default_model: String,
    extension: String,
    debug: bool,
}

impl ShaderCompiler {
    pub fn new(
        compiler: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
        pdb_dir: impl Into<PathBuf>,
        config: &ShaderConfig,
        debug: bool,
    ) -> Self {
        Self {
            compiler: compiler.into(),
            target_dir: target_dir.into(),
            pdb_dir: pdb_dir.into(),
            default_model: config.model.clone(),
            extension: config.extension.clone(),
            debug,
        }
    }

    /// Object file for one stage: `<name>.<stage>.<extension>`
    pub fn output_path(&self, name: &str, stage: &str) -> PathBuf {
        self.target_dir
            .join(format!("{}.{}.{}", name, stage, self.extension))
    }

    /// Debug symbols for one stage: `<name>.<stage>.pdb`
    pub fn pdb_path(&self, name: &str, stage: &str) -> PathBuf {
        self.pdb_dir.join(format!("{}.{}.pdb", name, stage))
    }

    /// Every object file the item produces
    pub fn outputs(&self, item: &ShaderItem) -> Vec<PathBuf> {
        item.targets
            .iter()
            .map(|t| self.output_path(&item.name, &t.target))
            .collect()
    }

    /// Debug symbol files the item produces; empty unless compiling with
    /// debug info
    pub fn debug_outputs(&self, item: &ShaderItem) -> Vec<PathBuf> {
        if !self.debug {
            return Vec::new();
        }
        item.targets
            .iter()
            .map(|t| self.pdb_path(&item.name, &t.target))
            .collect()
    }

    fn stage_present(&self, name: &str, stage: &str) -> bool {
        self.output_path(name, stage).is_file()
            && (!self.debug || self.pdb_path(name, stage).is_file())
    }

    /// Build the compiler invocation for one stage
    pub fn command(&self, name: &str, source: &Path, target: &ShaderTarget) -> ToolCommand {
        let model = target.model.as_deref().unwrap_or(&self.default_model);
        let output = self.output_path(name, &target.target);

        let debug_args = if self.debug {
            Arg::group([
                Arg::from("/Zi"),
                Arg::from("/Fd"),
                Arg::from(self.pdb_path(name, &target.target)),
            ])
        } else {
            Arg::Group(vec![])
        };

        let type_args = if target.enable_16bit_types {
            Arg::from("-enable-16bit-types")
        } else {
            Arg::Group(vec![])
        };

        ToolCommand::new(&self.compiler)
            .arg(Arg::group(["/WX", "/Ges"]))
            .arg(debug_args)
            .arg(Arg::group([
                format!("-T{}_{}", target.target, model),
                format!("-E{}", target.entry),
                format!("-Fo{}", output.display()),
            ]))
            .arg(Arg::group(target.defines.iter().map(|d| format!("-D{}", d))))
            .arg(type_args)
            .arg(source)
    }

    /// Compile every stage of `item`, stopping at the first failure
    pub async fn compile(
        &self,
        item: &ShaderItem,
        input_dir: &Path,
        ctx: &mut TranscodeContext<'_>,
    ) -> BundleResult<ToolStatus> {
        let source = input_dir.join(&item.path);
        ctx.deps.add(&source);

        let dirty = ctx.cache.is_dirty(&source)?;

        for target in &item.targets {
            let output = self.output_path(&item.name, &target.target);
            if !dirty && self.stage_present(&item.name, &target.target) {
                debug!("Shader {} ({}) is up to date", item.name, target.target);
                continue;
            }

            info!(
                "Compiling shader {} {} to {}",
                item.path.display(),
                target.entry,
                output.display()
            );
            let status = ctx
                .runner
                .run(&self.command(&item.name, &source, target))
                .await;
            if !status.success() {
                discard_outputs(&self.outputs(item));
                discard_outputs(&self.debug_outputs(item));
                return Ok(status);
            }
        }

        Ok(ToolStatus::Success)
    }
}
