//! Shared test doubles, fixture writers, and crate-level scenarios.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use mockall::mock;

use crate::confirm::Confirm;
use crate::descriptor::PluginId;
use crate::error::ToolError;
use crate::process::{ToolInvocation, ToolRunner};


// ---------------------------------------------------------------------------
// Recording tool runner
// ---------------------------------------------------------------------------

/// One call observed by [`RecordingRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedCall {
    pub(crate) program: String,
    /// Arguments as the program would have received them.
    pub(crate) args: Vec<String>,
    /// Command line as it would be logged.
    pub(crate) command_line: String,
    pub(crate) cwd: PathBuf,
}

type Effect = Box<dyn Fn(&ToolInvocation)>;

/// Tool runner that records invocations instead of spawning processes.
///
/// Exit statuses, side effects, environment, and the relabel probe outcome
/// are scripted per program name.
#[derive(Default)]
pub(crate) struct RecordingRunner {
    calls: RefCell<Vec<RecordedCall>>,
    probes: RefCell<Vec<RecordedCall>>,
    failures: HashMap<String, i32>,
    effects: Vec<(String, Effect)>,
    env: HashMap<String, OsString>,
    probe_succeeds: bool,
}

impl RecordingRunner {
    /// Runner with `JAVA_HOME` set, as a working build host has.
    pub(crate) fn java_host() -> Self {
        Self::default().with_env("JAVA_HOME", "/usr/lib/jvm/default")
    }

    pub(crate) fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_owned(), OsString::from(value));
        self
    }

    pub(crate) fn failing(mut self, program: &str, status: i32) -> Self {
        self.failures.insert(program.to_owned(), status);
        self
    }

    pub(crate) fn on_run(
        mut self,
        program: &str,
        effect: impl Fn(&ToolInvocation) + 'static,
    ) -> Self {
        self.effects.push((program.to_owned(), Box::new(effect)));
        self
    }

    pub(crate) const fn with_probe(mut self, succeeds: bool) -> Self {
        self.probe_succeeds = succeeds;
        self
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn programs(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|call| call.program.clone())
            .collect()
    }

    pub(crate) fn calls_to(&self, program: &str) -> Vec<RecordedCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.program == program)
            .cloned()
            .collect()
    }

    pub(crate) fn probe_count(&self) -> usize {
        self.probes.borrow().len()
    }

    fn record(invocation: &ToolInvocation) -> RecordedCall {
        RecordedCall {
            program: invocation.program().to_owned(),
            args: invocation.exposed_args(),
            command_line: invocation.command_line(),
            cwd: invocation.cwd().to_path_buf(),
        }
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError> {
        self.calls.borrow_mut().push(Self::record(invocation));
        if let Some(status) = self.failures.get(invocation.program()) {
            return Err(ToolError::NonZeroExit {
                command: invocation.command_line(),
                status: *status,
            });
        }
        for (program, effect) in &self.effects {
            if program == invocation.program() {
                effect(invocation);
            }
        }
        Ok(())
    }

    fn probe(&self, invocation: &ToolInvocation) -> bool {
        self.probes.borrow_mut().push(Self::record(invocation));
        self.probe_succeeds
    }

    fn env_var(&self, key: &str) -> Option<OsString> {
        self.env.get(key).cloned()
    }
}

/// Returns the value following `flag` in a recorded argument list.
pub(crate) fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
        .map(String::as_str)
}

// ---------------------------------------------------------------------------
// Confirmation double
// ---------------------------------------------------------------------------

mock! {
    pub(crate) Prompt {}
    impl Confirm for Prompt {
        fn confirm(&self, question: &str) -> std::io::Result<bool>;
    }
}

// ---------------------------------------------------------------------------
// Descriptor and archive fixtures
// ---------------------------------------------------------------------------

/// Descriptor contents for fixture plugins.
#[derive(Debug, Clone)]
pub(crate) struct DescriptorFixture {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    pub(crate) version: u32,
    pub(crate) parent: Option<String>,
    pub(crate) aux_packages: Vec<String>,
}

impl DescriptorFixture {
    pub(crate) fn new(id: &str, version: u32) -> Self {
        Self {
            id: id.to_owned(),
            name: None,
            version,
            parent: None,
            aux_packages: Vec::new(),
        }
    }

    pub(crate) fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    pub(crate) fn parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_owned());
        self
    }

    pub(crate) fn aux(mut self, package: &str) -> Self {
        self.aux_packages.push(package.to_owned());
        self
    }

    pub(crate) fn plugin_id(&self) -> PluginId {
        PluginId::new(self.id.as_str())
    }

    pub(crate) fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\"?>\n<map>\n");
        push_entry(&mut xml, "plugin_identifier", &format!("<string>{}</string>", self.id));
        if let Some(name) = &self.name {
            push_entry(&mut xml, "plugin_name", &format!("<string>{name}</string>"));
        }
        push_entry(&mut xml, "plugin_version", &format!("<string>{}</string>", self.version));
        if let Some(parent) = &self.parent {
            push_entry(&mut xml, "plugin_parent", &format!("<string>{parent}</string>"));
            push_entry(&mut xml, "plugin_parent_version", "<string>1</string>");
        }
        if !self.aux_packages.is_empty() {
            let items: String = self
                .aux_packages
                .iter()
                .map(|package| format!("<string>{package}</string>"))
                .collect();
            push_entry(&mut xml, "plugin_aux_packages", &format!("<list>{items}</list>"));
        }
        xml.push_str("</map>\n");
        xml
    }

    /// Writes the descriptor under `main` at its resource path.
    pub(crate) fn write_source(&self, main: &Path) -> PathBuf {
        let path = main.join(self.plugin_id().resource_path());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create package directory");
        }
        std::fs::write(&path, self.to_xml()).expect("write descriptor");
        path
    }

    /// Writes a plugin archive whose manifest flags this descriptor.
    pub(crate) fn write_jar(&self, path: &Path) {
        let resource = self
            .plugin_id()
            .resource_path()
            .to_string_lossy()
            .replace('\\', "/");
        let manifest = format!(
            "Manifest-Version: 1.0\r\n\r\nName: {resource}\r\nLockss-Plugin: true\r\n\r\n"
        );
        write_archive(path, &[(MANIFEST, manifest.as_str()), (resource.as_str(), &self.to_xml())]);
    }
}

const MANIFEST: &str = "META-INF/MANIFEST.MF";

fn push_entry(xml: &mut String, key: &str, value: &str) {
    xml.push_str(&format!("  <entry>\n    <string>{key}</string>\n    {value}\n  </entry>\n"));
}

/// Writes a zip archive holding the given members.
pub(crate) fn write_archive(path: &Path, members: &[(&str, &str)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create archive directory");
    }
    let file = File::create(path).expect("create archive");
    let mut writer = zip::ZipWriter::new(file);
    for (name, contents) in members {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .expect("start archive member");
        writer
            .write_all(contents.as_bytes())
            .expect("write archive member");
    }
    writer.finish().expect("finish archive");
}
