//! Integration tests for mkbundle

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn mkbundle() -> Command {
        let mut cmd = cargo_bin_cmd!("mkbundle");
        cmd.env_remove("MKBUNDLE_CONFIG");
        cmd
    }

    #[test]
    fn help_displays() {
        mkbundle()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("incremental asset bundle builder"))
            .stdout(predicate::str::contains("--depfile"));
    }

    #[test]
    fn version_displays() {
        mkbundle()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("mkbundle"));
    }

    #[test]
    fn missing_flags_are_usage_errors() {
        mkbundle()
            .args(["--bundle", "bundle.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--indir"));
    }

    #[test]
    fn missing_config_reports_hint() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");

        mkbundle()
            .args(["--bundle", "bundle.json", "--indir", "."])
            .arg("--outdir")
            .arg(&out)
            .arg("--output")
            .arg(out.join("bundle.tar"))
            .arg("--depfile")
            .arg(out.join("bundle.d"))
            .arg("--config")
            .arg(dir.path().join("missing.toml"))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Error:"))
            .stderr(predicate::str::contains("Hint:"));
    }
}

#[cfg(unix)]
mod build_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    const ONE_SHADER: &str = r#"{
        "shaders": [
            { "name": "basic", "path": "basic.hlsl", "targets": [ { "target": "vs", "entry": "vs_main" } ] }
        ]
    }"#;

    /// Temporary project with shell-script stand-ins for the external tools
    struct Project {
        dir: TempDir,
    }

    impl Project {
        fn new(manifest: &str) -> Self {
            let dir = TempDir::new().unwrap();
            let project = Self { dir };

            fs::create_dir_all(project.path("in")).unwrap();
            fs::write(project.path("in/basic.hlsl"), "float4 vs_main() : SV_Position { return 0; }")
                .unwrap();
            fs::write(project.path("bundle.json"), manifest).unwrap();

            let log = project.path("dxc.log");
            project.script(
                "dxc",
                &format!(
                    "#!/bin/sh\necho \"$@\" >> '{}'\nfor arg in \"$@\"; do\n  case \"$arg\" in\n    -Fo*) printf cso > \"${{arg#-Fo}}\" ;;\n  esac\ndone\n",
                    log.display()
                ),
            );
            project.script("failing-dxc", "#!/bin/sh\necho 'error: syntax error' >&2\nexit 7\n");
            project.script("true-tool", "#!/bin/sh\nexit 0\n");
            project
        }

        fn path(&self, relative: &str) -> PathBuf {
            self.dir.path().join(relative)
        }

        fn script(&self, name: &str, body: &str) {
            let path = self.path(name);
            fs::write(&path, body).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }

        fn config(&self, compiler: &str) -> PathBuf {
            let path = self.path("tools.toml");
            fs::write(
                &path,
                format!(
                    "[tools]\nshader_compiler = '{}'\natlas_generator = '{}'\ntexture_compressor = '{}'\ntimeout_secs = 30\n",
                    self.path(compiler).display(),
                    self.path("true-tool").display(),
                    self.path("true-tool").display()
                ),
            )
            .unwrap();
            path
        }

        fn build(&self, compiler: &str, indir: &Path) -> Command {
            let mut cmd = cargo_bin_cmd!("mkbundle");
            cmd.env_remove("MKBUNDLE_CONFIG")
                .arg("--bundle")
                .arg(self.path("bundle.json"))
                .arg("--indir")
                .arg(indir)
                .arg("--outdir")
                .arg(self.path("out"))
                .arg("--output")
                .arg(self.path("out/bundle.tar"))
                .arg("--depfile")
                .arg(self.path("out/bundle.d"))
                .arg("--config")
                .arg(self.config(compiler));
            cmd
        }

        fn compiler_runs(&self) -> usize {
            fs::read_to_string(self.path("dxc.log"))
                .map(|log| log.lines().count())
                .unwrap_or(0)
        }
    }

    #[test]
    fn fresh_build_invokes_compiler_once() {
        let project = Project::new(ONE_SHADER);

        project.build("dxc", &project.path("in")).assert().success();

        assert_eq!(project.compiler_runs(), 1);
        let depfile = fs::read_to_string(project.path("out/bundle.d")).unwrap();
        assert!(depfile.ends_with("basic.hlsl"));
        assert!(project.path("out/bundle.tar").is_file());
        assert!(project.path("out/bundle/shaders/basic.vs.cso").is_file());
        assert!(project.path("out/bundle.cache.json").is_file());
    }

    #[test]
    fn unchanged_rebuild_skips_compiler() {
        let project = Project::new(ONE_SHADER);
        project.build("dxc", &project.path("in")).assert().success();
        let depfile = fs::read(project.path("out/bundle.d")).unwrap();
        let archive = fs::read(project.path("out/bundle.tar")).unwrap();

        project.build("dxc", &project.path("in")).assert().success();

        assert_eq!(project.compiler_runs(), 1);
        assert_eq!(fs::read(project.path("out/bundle.d")).unwrap(), depfile);
        assert_eq!(fs::read(project.path("out/bundle.tar")).unwrap(), archive);
    }

    #[test]
    fn changed_source_rebuilds() {
        let project = Project::new(ONE_SHADER);
        project.build("dxc", &project.path("in")).assert().success();

        let source = project.path("in/basic.hlsl");
        fs::write(&source, "float4 vs_main() : SV_Position { return 1; }").unwrap();
        fs::File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(10))
            .unwrap();
        project.build("dxc", &project.path("in")).assert().success();

        assert_eq!(project.compiler_runs(), 2);
    }

    #[test]
    fn tool_failure_exits_with_tool_code() {
        let project = Project::new(ONE_SHADER);

        project
            .build("failing-dxc", &project.path("in"))
            .assert()
            .code(7)
            .stderr(predicate::str::contains("syntax error"));

        let depfile = fs::read_to_string(project.path("out/bundle.d")).unwrap();
        assert!(depfile.contains("basic.hlsl"));
        assert!(project.path("out/bundle.cache.json").is_file());
        assert!(!project.path("out/bundle.tar").exists());
    }

    #[test]
    fn nonexistent_input_dir_is_validation_failure() {
        let project = Project::new(ONE_SHADER);

        project
            .build("dxc", &project.path("nonexistent"))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Error:"));

        assert!(!project.path("out").exists());
        assert_eq!(project.compiler_runs(), 0);
    }
}
