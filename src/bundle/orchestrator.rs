//! Bundle build state machine
//!
//! ```text
//! Init -> ValidateInputs -> PreparingOutputDirs -> ProcessingLicenses
//!      -> ProcessingFonts -> ProcessingShaders -> ProcessingTextures
//!      -> Packaging -> Done
//! ```
//!
//! Any processing state can move to `Failed`. A tool failure writes the
//! dependency file and flushes the cache before the run ends, so a rerun
//! after the fix reuses everything already built.

use crate::bundle::archive::write_archive;
use crate::bundle::layout::{copy_into, OutputLayout, FONTS_DIR, PDB_DIR, SHADERS_DIR, TEXTURES_DIR};
use crate::bundle::license::write_licenses;
use crate::bundle::redist::copy_redist;
use crate::cache::ContentCache;
use crate::config::Config;
use crate::depfile::DependencyRecord;
use crate::error::{BundleError, BundleResult};
use crate::manifest::{FontItem, Manifest, ShaderItem, TextureItem};
use crate::tool::{ToolRunner, ToolStatus};
use crate::transcode::{AtlasGenerator, ShaderCompiler, TextureCompressor, TranscodeContext};
use indicatif::ProgressBar;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Command line inputs of one bundle build
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Bundle manifest (JSON)
    pub manifest: PathBuf,
    /// Root that manifest item paths are relative to
    pub input_dir: PathBuf,
    /// Output directory holding the bundle tree, intermediates and cache
    pub output_dir: PathBuf,
    /// Archive to produce
    pub archive: PathBuf,
    /// Make-style dependency file to produce
    pub depfile: PathBuf,
    /// Emit shader debug info and ship debug redistributables
    pub debug: bool,
}

/// Build progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Init,
    ValidateInputs,
    PreparingOutputDirs,
    ProcessingLicenses,
    ProcessingFonts,
    ProcessingShaders,
    ProcessingTextures,
    Packaging,
    Done,
    Failed,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::ValidateInputs => "validate inputs",
            Self::PreparingOutputDirs => "prepare output directories",
            Self::ProcessingLicenses => "licenses",
            Self::ProcessingFonts => "fonts",
            Self::ProcessingShaders => "shaders",
            Self::ProcessingTextures => "textures",
            Self::Packaging => "packaging",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// How a build that did not hit a fatal error ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    /// An external tool failed while processing `item`
    ToolFailed {
        state: BuildState,
        item: String,
        status: ToolStatus,
    },
}

impl BuildOutcome {
    /// Process exit code: 0, or the failing tool's code
    ///
    /// Codes that do not fit a process exit status collapse to 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::ToolFailed { status, .. } => u8::try_from(status.code())
                .ok()
                .filter(|code| *code != 0)
                .unwrap_or(1),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Drives the transcoders over a manifest and packages the result
pub struct Orchestrator {
    options: BuildOptions,
    config: Config,
    runner: Arc<dyn ToolRunner>,
    layout: OutputLayout,
    cache: ContentCache,
    deps: DependencyRecord,
    state: BuildState,
    progress: ProgressBar,
}

impl Orchestrator {
    /// Resolve the output layout and load the content cache
    pub fn new(
        options: BuildOptions,
        config: Config,
        runner: Arc<dyn ToolRunner>,
    ) -> BundleResult<Self> {
        let layout = OutputLayout::new(&options.output_dir);
        let cache = ContentCache::load(&layout.cache_file())?.with_root(&options.input_dir);
        let deps = DependencyRecord::new(
            options.archive.to_string_lossy().into_owned(),
            &options.depfile,
        );
        if cache.is_empty() {
            info!("No cached inputs, building everything");
        } else {
            debug!("Loaded {} cache entries", cache.len());
        }

        Ok(Self {
            options,
            config,
            runner,
            layout,
            cache,
            deps,
            state: BuildState::Init,
            progress: ProgressBar::hidden(),
        })
    }

    /// Report progress on an interactive spinner
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Run the build to a terminal state
    ///
    /// Tool failures are returned as [`BuildOutcome::ToolFailed`]; fatal
    /// problems as errors. The dependency file and cache are persisted on
    /// every path except input validation failures, which leave no state.
    pub async fn run(&mut self) -> BundleResult<BuildOutcome> {
        let result = self.execute().await;
        self.progress.finish_and_clear();

        match result {
            Ok(BuildOutcome::Success) => {
                self.persist()?;
                self.transition(BuildState::Done);
                let stats = self.cache.stats();
                info!(
                    "Bundle written to {} ({} inputs, {} unchanged, {} changed, {} hashed)",
                    self.options.archive.display(),
                    self.deps.inputs().len(),
                    stats.clean,
                    stats.dirty,
                    stats.hashed
                );
                Ok(BuildOutcome::Success)
            }
            Ok(failure) => {
                self.transition(BuildState::Failed);
                if let Err(persist_error) = self.persist() {
                    error!("Failed to persist build state: {}", persist_error);
                }
                Ok(failure)
            }
            Err(e) => {
                self.transition(BuildState::Failed);
                if e.is_validation() {
                    self.cache.flush()?;
                } else if let Err(persist_error) = self.persist() {
                    warn!("Failed to persist build state: {}", persist_error);
                }
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> BundleResult<BuildOutcome> {
        self.transition(BuildState::ValidateInputs);
        self.validate_inputs()?;
        let manifest = Manifest::from_file(&self.options.manifest).await?;
        debug!("Manifest lists {} items", manifest.item_count());

        self.transition(BuildState::PreparingOutputDirs);
        self.layout.prepare()?;
        copy_redist(
            &self.config.redist,
            &self.layout.redist_dir(),
            self.options.debug,
            &mut self.deps,
        )?;

        self.transition(BuildState::ProcessingLicenses);
        write_licenses(
            &manifest.licenses,
            &self.options.input_dir,
            &self.layout.bundle_dir(),
            &mut self.deps,
        )?;

        self.transition(BuildState::ProcessingFonts);
        if let Some(failure) = self.process_fonts(&manifest.fonts).await? {
            return Ok(failure);
        }

        self.transition(BuildState::ProcessingShaders);
        if let Some(failure) = self.process_shaders(&manifest.shaders).await? {
            return Ok(failure);
        }

        self.transition(BuildState::ProcessingTextures);
        if let Some(failure) = self.process_textures(&manifest.textures).await? {
            return Ok(failure);
        }

        self.transition(BuildState::Packaging);
        self.progress.set_message("Packaging bundle...");
        write_archive(&self.layout.bundle_dir(), &self.options.archive)?;

        Ok(BuildOutcome::Success)
    }

    fn validate_inputs(&self) -> BundleResult<()> {
        if !self.options.manifest.is_file() {
            error!("{} does not exist", self.options.manifest.display());
            return Err(BundleError::ManifestNotFound(self.options.manifest.clone()));
        }
        if !self.options.input_dir.is_dir() {
            error!("{} does not exist", self.options.input_dir.display());
            return Err(BundleError::InputDirNotFound(self.options.input_dir.clone()));
        }
        Ok(())
    }

    async fn process_fonts(&mut self, fonts: &[FontItem]) -> BundleResult<Option<BuildOutcome>> {
        let generator = AtlasGenerator::new(
            &self.config.tools.atlas_generator,
            self.layout.intermediate_subdir(FONTS_DIR),
        );
        let target = self.layout.bundle_subdir(FONTS_DIR);

        for item in fonts {
            self.progress
                .set_message(format!("Generating font atlas {}...", item.name));
            let mut ctx = TranscodeContext {
                cache: &mut self.cache,
                deps: &mut self.deps,
                runner: self.runner.as_ref(),
            };
            let status = generator
                .build(item, &self.options.input_dir, &mut ctx)
                .await?;
            if !status.success() {
                return Ok(Some(self.tool_failed(&item.name, status)));
            }

            for font in item.font_files(&self.options.input_dir) {
                copy_into(&font, &target)?;
            }
            for output in generator.outputs(item) {
                copy_into(&output, &target)?;
            }
        }
        Ok(None)
    }

    async fn process_shaders(
        &mut self,
        shaders: &[ShaderItem],
    ) -> BundleResult<Option<BuildOutcome>> {
        let compiler = ShaderCompiler::new(
            &self.config.tools.shader_compiler,
            self.layout.shader_intermediate_dir(self.options.debug),
            self.layout.intermediate_subdir(PDB_DIR),
            &self.config.shader,
            self.options.debug,
        );
        let target = self.layout.bundle_subdir(SHADERS_DIR);
        let pdb_target = self.layout.bundle_subdir(PDB_DIR);

        for item in shaders {
            self.progress
                .set_message(format!("Compiling shader {}...", item.name));
            let mut ctx = TranscodeContext {
                cache: &mut self.cache,
                deps: &mut self.deps,
                runner: self.runner.as_ref(),
            };
            let status = compiler
                .compile(item, &self.options.input_dir, &mut ctx)
                .await?;
            if !status.success() {
                return Ok(Some(self.tool_failed(&item.name, status)));
            }

            for output in compiler.outputs(item) {
                copy_into(&output, &target)?;
            }
            for pdb in compiler.debug_outputs(item) {
                copy_into(&pdb, &pdb_target)?;
            }
        }
        Ok(None)
    }

    async fn process_textures(
        &mut self,
        textures: &[TextureItem],
    ) -> BundleResult<Option<BuildOutcome>> {
        let compressor = TextureCompressor::new(
            &self.config.tools.texture_compressor,
            self.layout.intermediate_subdir(TEXTURES_DIR),
        );
        let target = self.layout.bundle_subdir(TEXTURES_DIR);

        for item in textures {
            self.progress
                .set_message(format!("Compressing texture {}...", item.name));
            let mut ctx = TranscodeContext {
                cache: &mut self.cache,
                deps: &mut self.deps,
                runner: self.runner.as_ref(),
            };
            let status = compressor
                .compress(item, &self.options.input_dir, &mut ctx)
                .await?;
            if !status.success() {
                return Ok(Some(self.tool_failed(&item.name, status)));
            }

            copy_into(&compressor.output_path(item), &target)?;
        }
        Ok(None)
    }

    fn tool_failed(&self, item: &str, status: ToolStatus) -> BuildOutcome {
        error!("Processing {} ({}) failed: {}", item, self.state, status);
        BuildOutcome::ToolFailed {
            state: self.state,
            item: item.to_string(),
            status,
        }
    }

    /// Write the dependency file and flush the cache, attempting both even
    /// if the first fails; the first error wins
    fn persist(&mut self) -> BundleResult<()> {
        let written = self.deps.write();
        let flushed = self.cache.flush();
        written.and(flushed)
    }

    fn transition(&mut self, next: BuildState) {
        debug!("Build state: {} -> {}", self.state, next);
        self.state = next;
    }
}
