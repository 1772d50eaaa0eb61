use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::toolchain::{BuildAction, BuildContext};

#[derive(Debug, Parser)]
#[command(name = "toolshell", version, about = "Shell console and build runner for the C -> asm -> serial toolchain")]
pub struct Cli {
    /// Config file (default: <config dir>/toolshell/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace folder; build outputs go to <workspace>/out
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// The open file that build actions work on
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Write logs here instead of the default location
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one build action without the console and exit
    Build {
        #[arg(value_enum)]
        target: BuildTarget,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuildTarget {
    Compile,
    Assemble,
    AssembleLink,
    Program,
    /// Compile, assemble with link, then program
    All,
}

impl From<BuildTarget> for BuildAction {
    fn from(target: BuildTarget) -> Self {
        match target {
            BuildTarget::Compile => BuildAction::Compile,
            BuildTarget::Assemble => BuildAction::Assemble,
            BuildTarget::AssembleLink => BuildAction::AssembleAndLink,
            BuildTarget::Program => BuildAction::Program,
            BuildTarget::All => BuildAction::BuildAndProgram,
        }
    }
}

impl Cli {
    pub fn build_context(&self) -> BuildContext {
        BuildContext::new(self.workspace.clone(), self.file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_opens_console() {
        let cli = Cli::try_parse_from(["toolshell", "--workspace", "/ws"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.workspace, Some(PathBuf::from("/ws")));
    }

    #[test]
    fn build_all_maps_to_build_and_program() {
        let cli = Cli::try_parse_from([
            "toolshell", "build", "all", "--workspace", "/ws", "--file", "/ws/foo.c",
        ])
        .unwrap();
        let Some(Command::Build { target }) = cli.command else {
            panic!("expected build subcommand");
        };
        assert_eq!(BuildAction::from(target), BuildAction::BuildAndProgram);
        assert_eq!(cli.build_context().file, Some(PathBuf::from("/ws/foo.c")));
    }

    #[test]
    fn assemble_link_is_kebab_case() {
        let cli = Cli::try_parse_from(["toolshell", "build", "assemble-link"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Build {
                target: BuildTarget::AssembleLink
            })
        ));
    }
}
