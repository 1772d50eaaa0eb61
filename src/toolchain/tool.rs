use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::ToolchainConfig;

/// The three external tools a build can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Compiler,
    Assembler,
    Programmer,
}

impl ToolKind {
    /// Extension (without the dot) the tool's input file must carry.
    pub fn expected_extension(self) -> &'static str {
        match self {
            Self::Compiler => "c",
            Self::Assembler => "asm",
            Self::Programmer => "txt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Compiler => "compiler",
            Self::Assembler => "assembler",
            Self::Programmer => "programmer",
        }
    }

    /// The configured executable for this tool, if any.
    pub fn configured_path(self, config: &ToolchainConfig) -> Option<&Path> {
        let path = match self {
            Self::Compiler => config.compiler_path.as_deref(),
            Self::Assembler => config.assembler_path.as_deref(),
            Self::Programmer => config.programmer_path.as_deref(),
        };
        path.filter(|path| !path.as_os_str().is_empty())
    }

    /// Whether `path` carries this tool's expected extension.
    pub fn accepts(self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.expected_extension())
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One tool invocation: which tool, on which file, writing where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStep {
    pub tool: ToolKind,
    pub source: PathBuf,
    /// Directory the tool writes into; created before the step runs.
    pub output_dir: Option<PathBuf>,
    /// Assembler only: emit a linked image.
    pub link: bool,
}

impl PipelineStep {
    pub fn compile(source: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool: ToolKind::Compiler,
            source: source.into(),
            output_dir: Some(output_dir.into()),
            link: false,
        }
    }

    pub fn assemble(source: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, link: bool) -> Self {
        Self {
            tool: ToolKind::Assembler,
            source: source.into(),
            output_dir: Some(output_dir.into()),
            link,
        }
    }

    pub fn program(image: impl Into<PathBuf>) -> Self {
        Self {
            tool: ToolKind::Programmer,
            source: image.into(),
            output_dir: None,
            link: false,
        }
    }
}
