#![allow(dead_code)]

use sheepdog::config::{ConfigFile, ProcessSpec, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_process(mut self, spec: ProcessSpec) -> Self {
        self.config.processes.push(spec);
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    /// Validate the accumulated specs.
    pub fn try_build(self) -> anyhow::Result<ConfigFile> {
        Ok(ConfigFile::try_from(self.config)?)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ProcessSpec`.
pub struct ProcessSpecBuilder {
    spec: ProcessSpec,
}

impl ProcessSpecBuilder {
    /// A leaf running `command` (program followed by arguments).
    pub fn leaf(name: &str, command: &[&str]) -> Self {
        Self {
            spec: ProcessSpec {
                name: name.to_string(),
                command: command.iter().map(|s| s.to_string()).collect(),
                ..ProcessSpec::default()
            },
        }
    }

    /// A group of the given type (`"sequential"` / `"parallel"`, or anything
    /// else to exercise validation).
    pub fn group(name: &str, group_type: &str) -> Self {
        Self {
            spec: ProcessSpec {
                name: name.to_string(),
                group_type: Some(group_type.to_string()),
                ..ProcessSpec::default()
            },
        }
    }

    /// A spec with nothing set but the name.
    pub fn empty(name: &str) -> Self {
        Self {
            spec: ProcessSpec {
                name: name.to_string(),
                ..ProcessSpec::default()
            },
        }
    }

    pub fn command(mut self, command: &[&str]) -> Self {
        self.spec.command = command.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn child(mut self, child: ProcessSpec) -> Self {
        self.spec.children.push(child);
        self
    }

    pub fn autorun(mut self, val: bool) -> Self {
        self.spec.autorun = val;
        self
    }

    pub fn cwd(mut self, dir: &str) -> Self {
        self.spec.cwd = Some(dir.to_string());
        self
    }

    pub fn ready_pattern(mut self, pattern: &str) -> Self {
        self.spec.ready_pattern = Some(pattern.to_string());
        self
    }

    pub fn group_type(mut self, group_type: &str) -> Self {
        self.spec.group_type = Some(group_type.to_string());
        self
    }

    pub fn build(self) -> ProcessSpec {
        self.spec
    }
}
