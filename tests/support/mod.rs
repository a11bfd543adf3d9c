//! Shared fixtures for integration tests
//!
//! Builds a small native source tree in a temporary directory: a server and a
//! client VPC project, the directories their include lists point at, and a
//! settings file under `tools/`.

#![allow(dead_code)]

use anyhow::bail;
use modulegen::fs::RealFileSystem;
use modulegen::modules::{BindingModule, FlavorConfig, ModuleEnvironment, ModuleRegistry, ModuleType};
use modulegen::pipeline::{ModulePipeline, PipelineContext, PipelineReport, RunOptions};
use modulegen::{PipelineError, Settings};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const SERVER_VPC: &str = r#"// server project
$Macro SRCDIR "..\.."
$Macro OUTBINNAME "server"

$Configuration
{
	$Compiler
	{
		$AdditionalIncludeDirectories "$SRCDIR\public;.\python;$SRCDIR\does\not\exist"
		$PreprocessorDefinitions "GAME_DLL;ENABLE_PYTHON;MOD_$GAMENAME"
	}
}
"#;

pub const CLIENT_VPC: &str = r#"// client project
$Macro SRCDIR "..\.."
$Macro OUTBINNAME "client"

$Configuration
{
	$Compiler
	{
		$AdditionalIncludeDirectories "$SRCDIR\public,$SRCDIR\game\client\ui"
		$PreprocessorDefinitions "CLIENT_DLL;ENABLE_PYTHON"
	}
}
"#;

/// `[[modules]]` entry for a recording module
pub fn module(name: &str, module_type: &str, path: &str) -> String {
    format!(
        "\n[[modules]]\nsource = \"test\"\ntype_name = \"recording\"\noptions = {{ name = \"{}\", module_type = \"{}\", path = \"{}\" }}\n",
        name, module_type, path
    )
}

pub fn split_module(name: &str, module_type: &str, path: &str) -> String {
    format!(
        "\n[[modules]]\nsource = \"test\"\ntype_name = \"recording\"\noptions = {{ name = \"{}\", module_type = \"{}\", path = \"{}\", split = true }}\n",
        name, module_type, path
    )
}

pub fn failing_module(name: &str) -> String {
    format!(
        "\n[[modules]]\nsource = \"test\"\ntype_name = \"recording\"\noptions = {{ name = \"{}\", module_type = \"server\", path = \"python\", fail = true }}\n",
        name
    )
}

/// The three-module scenario: entities (server), physics (shared), ui (client)
pub fn scenario_modules() -> String {
    [
        module("entities", "server", "python"),
        module("physics", "shared", "../shared/python"),
        module("ui", "client", "python"),
    ]
    .concat()
}

pub struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    pub fn new(modules: &str) -> Self {
        Self::with_projects(modules, SERVER_VPC, CLIENT_VPC)
    }

    pub fn with_projects(modules: &str, server_vpc: &str, client_vpc: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path().to_path_buf();
        let fixture = Self { _dir: dir, root };

        fixture.write("src/game/server/server.vpc", server_vpc);
        fixture.write("src/game/client/client.vpc", client_vpc);
        fixture.mkdir("src/public");
        fixture.mkdir("src/game/server/python");
        fixture.mkdir("src/game/client/ui");

        fixture.set_modules(modules);
        fixture
    }

    /// Rewrite the settings file with a new module list
    pub fn set_modules(&self, modules: &str) {
        let settings = format!(
            r#"src_path = "../src"
vpc_server_path = "../src/game/server/server.vpc"
vpc_client_path = "../src/game/client/client.vpc"
client_path = "game/client/python"
server_path = "game/server/python"
shared_path = "game/shared/python"
vpc_server_auto_path = "../src/game/server/python_autogenerated.vpc"
vpc_client_auto_path = "../src/game/client/python_autogenerated.vpc"

[macros]
GAMENAME = "testmod"
{}"#,
            modules
        );
        self.write("tools/modulegen.toml", &settings);
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn src(&self) -> PathBuf {
        self.root.join("src")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join("tools/modulegen.toml")
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write fixture file");
    }

    pub fn mkdir(&self, relative: &str) {
        fs::create_dir_all(self.root.join(relative)).expect("create fixture dir");
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root.join(relative)).expect("read output file")
    }

    pub fn settings(&self) -> Settings {
        Settings::load(&RealFileSystem::new(), &self.settings_path()).expect("load settings")
    }

    /// Run the pipeline against the real file system with the recording registry
    pub fn run(&self, log: &RunLog, options: &RunOptions) -> Result<PipelineReport, PipelineError> {
        let fs = Arc::new(RealFileSystem::new());
        let context = PipelineContext::with_registry(self.settings(), fs, recording_registry(log));
        ModulePipeline::new(context).run(options)
    }
}

/// What a recording module saw when it ran
#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub name: String,
    pub server: FlavorConfig,
    pub client: FlavorConfig,
}

#[derive(Debug, Clone, Default)]
pub struct RunLog {
    runs: Arc<Mutex<Vec<RecordedRun>>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.runs().into_iter().map(|r| r.name).collect()
    }
}

#[derive(Debug, Deserialize)]
struct RecordingOptions {
    #[serde(default)]
    name: String,
    #[serde(default)]
    module_type: ModuleType,
    #[serde(default)]
    split: bool,
    #[serde(default)]
    path: PathBuf,
    #[serde(default)]
    fail: bool,
}

struct RecordingModule {
    options: RecordingOptions,
    log: RunLog,
}

impl BindingModule for RecordingModule {
    fn module_name(&self) -> &str {
        &self.options.name
    }

    fn module_type(&self) -> ModuleType {
        self.options.module_type
    }

    fn split(&self) -> bool {
        self.options.split
    }

    fn path(&self) -> &Path {
        &self.options.path
    }

    fn run(&mut self, env: &ModuleEnvironment) -> anyhow::Result<()> {
        self.log.runs.lock().unwrap().push(RecordedRun {
            name: self.options.name.clone(),
            server: env.server.clone(),
            client: env.client.clone(),
        });
        if self.options.fail {
            bail!("generator for {} crashed", self.options.name);
        }
        Ok(())
    }
}

/// Default registry plus `test::recording`, which logs every run into `log`
pub fn recording_registry(log: &RunLog) -> ModuleRegistry {
    let mut registry = ModuleRegistry::with_defaults();
    let log = log.clone();
    registry.register("test", "recording", move |decl, _settings| {
        let options: RecordingOptions = toml::Value::Table(decl.options.clone()).try_into()?;
        Ok(Box::new(RecordingModule {
            options,
            log: log.clone(),
        }) as Box<dyn BindingModule>)
    });
    registry
}
