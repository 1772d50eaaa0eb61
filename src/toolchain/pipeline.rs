//! Build actions: plan the tool steps for a file, then run them through one
//! shared session.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::ToolchainConfig;
use crate::toolchain::adapter::{InvocationStatus, ToolAdapter};
use crate::toolchain::error::PipelineError;
use crate::toolchain::tool::{PipelineStep, ToolKind};

/// Name of the image the assembler writes for the programmer.
pub const SERIAL_IMAGE: &str = "serial.txt";

/// A user-facing build action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildAction {
    Compile,
    Assemble,
    AssembleAndLink,
    Program,
    /// Compile, assemble with link, then program.
    BuildAndProgram,
}

impl BuildAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Assemble => "assemble",
            Self::AssembleAndLink => "assemble and link",
            Self::Program => "program",
            Self::BuildAndProgram => "build and program",
        }
    }

    fn first_tool(self) -> ToolKind {
        match self {
            Self::Compile | Self::BuildAndProgram => ToolKind::Compiler,
            Self::Assemble | Self::AssembleAndLink => ToolKind::Assembler,
            Self::Program => ToolKind::Programmer,
        }
    }
}

impl fmt::Display for BuildAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the editor has open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildContext {
    pub workspace: Option<PathBuf>,
    pub file: Option<PathBuf>,
}

impl BuildContext {
    pub fn new(workspace: Option<PathBuf>, file: Option<PathBuf>) -> Self {
        Self { workspace, file }
    }
}

/// The ordered steps of one build action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRun {
    id: Uuid,
    action: BuildAction,
    steps: Vec<PipelineStep>,
}

impl PipelineRun {
    /// Work out the steps of `action`; fails when no file or workspace is open.
    pub fn plan(
        action: BuildAction,
        context: &BuildContext,
        toolchain: &ToolchainConfig,
    ) -> Result<Self, PipelineError> {
        let file = context.file.as_deref().ok_or(PipelineError::NoOpenFile {
            expected: action.first_tool().expected_extension(),
        })?;

        let steps = match action {
            BuildAction::Program => vec![PipelineStep::program(file)],
            BuildAction::Compile => {
                vec![PipelineStep::compile(file, output_root(context, toolchain)?.file_dir(file))]
            }
            BuildAction::Assemble => vec![PipelineStep::assemble(
                file,
                output_root(context, toolchain)?.file_dir(file),
                false,
            )],
            BuildAction::AssembleAndLink => vec![PipelineStep::assemble(
                file,
                output_root(context, toolchain)?.file_dir(file),
                true,
            )],
            BuildAction::BuildAndProgram => {
                let out = output_root(context, toolchain)?;
                let compiled = out.file_dir(file);
                let asm_name = format!("{}.asm", stem_without_c(file));
                let asm_file = compiled.join(&asm_name);
                let image_dir = out.dir(&asm_name);
                let image = image_dir.join(SERIAL_IMAGE);
                vec![
                    PipelineStep::compile(file, compiled),
                    PipelineStep::assemble(asm_file, image_dir, toolchain.link),
                    PipelineStep::program(image),
                ]
            }
        };

        Ok(Self {
            id: Uuid::new_v4(),
            action,
            steps,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn action(&self) -> BuildAction {
        self.action
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub tool: ToolKind,
    pub command_line: String,
    pub status: InvocationStatus,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: Uuid,
    pub action: BuildAction,
    pub steps: Vec<StepReport>,
}

/// Runs [`PipelineRun`]s against the adapter's session.
#[derive(Clone)]
pub struct Orchestrator {
    adapter: ToolAdapter,
}

impl Orchestrator {
    pub fn new(adapter: ToolAdapter) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &ToolAdapter {
        &self.adapter
    }

    /// Re-read the config file, then plan `action` against it.
    ///
    /// A config file that fails to load is logged and the previous config
    /// stays in effect.
    pub fn plan(&self, action: BuildAction, context: &BuildContext) -> Result<PipelineRun, PipelineError> {
        let store = self.adapter.config();
        if let Err(err) = store.refresh() {
            warn!(%err, path = %store.path().display(), "Config reload failed, keeping previous config");
        }
        PipelineRun::plan(action, context, &store.get().toolchain)
    }

    /// Check every step's tool and file extension without side effects.
    pub fn validate(&self, run: &PipelineRun) -> Result<(), PipelineError> {
        for step in run.steps() {
            self.adapter
                .prepare(step)
                .map_err(|source| PipelineError::Step {
                    tool: step.tool,
                    source,
                })?;
        }
        Ok(())
    }

    /// Plan and run `action`.
    pub async fn run_action(
        &self,
        action: BuildAction,
        context: &BuildContext,
    ) -> Result<RunReport, PipelineError> {
        let run = self.plan(action, context)?;
        self.run(run).await
    }

    /// Run every step in order.
    ///
    /// The session is made ready once up front. Each step's output
    /// directory is created right before it is dispatched. Steps only wait
    /// for each other when completion tracking is on; otherwise ordering
    /// rests on the shell reading its stdin one line at a time.
    pub async fn run(&self, run: PipelineRun) -> Result<RunReport, PipelineError> {
        let span = info_span!("pipeline", run_id = %run.id, action = run.action.label());
        async move {
            self.validate(&run)?;
            if run.steps.iter().any(|step| step.tool != ToolKind::Programmer) {
                self.adapter.session().ensure_running().await?;
            }

            let mut steps = Vec::with_capacity(run.steps.len());
            for step in &run.steps {
                if let Some(dir) = &step.output_dir {
                    tokio::fs::create_dir_all(dir)
                        .await
                        .map_err(|source| PipelineError::OutputDir {
                            path: dir.clone(),
                            source,
                        })?;
                }

                let dispatched = self
                    .adapter
                    .invoke(step)
                    .await
                    .map_err(|source| PipelineError::Step {
                        tool: step.tool,
                        source,
                    })?;

                let status = match dispatched.completion {
                    Some(completion) => {
                        let exit_code = completion.wait().await?;
                        if exit_code != 0 {
                            warn!(tool = %step.tool, exit_code, "Step failed, stopping run");
                            return Err(PipelineError::StepFailed {
                                tool: step.tool,
                                exit_code,
                            });
                        }
                        InvocationStatus::Completed { exit_code }
                    }
                    None => InvocationStatus::Dispatched,
                };
                steps.push(StepReport {
                    tool: step.tool,
                    command_line: dispatched.command_line,
                    status,
                });
            }

            info!(steps = steps.len(), "Run dispatched");
            Ok(RunReport {
                run_id: run.id,
                action: run.action,
                steps,
            })
        }
        .instrument(span)
        .await
    }
}

/// `<workspace>/<output_dir>`
struct OutputRoot(PathBuf);

impl OutputRoot {
    /// `<root>/<name>/`, trailing separator included.
    fn dir(&self, name: &str) -> PathBuf {
        self.0.join(name).join("")
    }

    fn file_dir(&self, file: &Path) -> PathBuf {
        self.dir(&file_name(file))
    }
}

fn output_root(context: &BuildContext, toolchain: &ToolchainConfig) -> Result<OutputRoot, PipelineError> {
    let workspace = context.workspace.as_deref().ok_or(PipelineError::NoWorkspace)?;
    Ok(OutputRoot(workspace.join(&toolchain.output_dir)))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn stem_without_c(path: &Path) -> String {
    let name = file_name(path);
    match name.strip_suffix(".c") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::adapter::normalize_path;

    fn context(file: &str) -> BuildContext {
        BuildContext::new(Some(PathBuf::from("/ws")), Some(PathBuf::from(file)))
    }

    #[test]
    fn build_and_program_plans_three_steps() {
        let run = PipelineRun::plan(
            BuildAction::BuildAndProgram,
            &context("/ws/foo.c"),
            &ToolchainConfig::default(),
        )
        .unwrap();
        let steps = run.steps();
        assert_eq!(steps.len(), 3);

        assert_eq!(steps[0].tool, ToolKind::Compiler);
        assert_eq!(normalize_path(steps[0].output_dir.as_ref().unwrap()), "/ws/out/foo.c/");

        assert_eq!(steps[1].tool, ToolKind::Assembler);
        assert_eq!(normalize_path(&steps[1].source), "/ws/out/foo.c/foo.asm");
        assert_eq!(normalize_path(steps[1].output_dir.as_ref().unwrap()), "/ws/out/foo.asm/");
        assert!(steps[1].link);

        assert_eq!(steps[2].tool, ToolKind::Programmer);
        assert_eq!(normalize_path(&steps[2].source), "/ws/out/foo.asm/serial.txt");
    }

    #[test]
    fn single_steps_write_next_to_file_name() {
        let run = PipelineRun::plan(
            BuildAction::Assemble,
            &context("/ws/src/boot.asm"),
            &ToolchainConfig::default(),
        )
        .unwrap();
        assert_eq!(run.steps().len(), 1);
        assert_eq!(
            normalize_path(run.steps()[0].output_dir.as_ref().unwrap()),
            "/ws/out/boot.asm/"
        );
        assert!(!run.steps()[0].link);
    }

    #[test]
    fn missing_file_or_workspace_is_rejected() {
        let err = PipelineRun::plan(
            BuildAction::Compile,
            &BuildContext::new(Some(PathBuf::from("/ws")), None),
            &ToolchainConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::NoOpenFile { expected: "c" }));

        let err = PipelineRun::plan(
            BuildAction::Compile,
            &BuildContext::new(None, Some(PathBuf::from("/ws/foo.c"))),
            &ToolchainConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::NoWorkspace));
    }

    #[test]
    fn program_needs_no_workspace() {
        let run = PipelineRun::plan(
            BuildAction::Program,
            &BuildContext::new(None, Some(PathBuf::from("/ws/serial.txt"))),
            &ToolchainConfig::default(),
        )
        .unwrap();
        assert_eq!(run.steps(), &[PipelineStep::program("/ws/serial.txt")]);
    }

    #[test]
    fn runs_get_distinct_ids() {
        let config = ToolchainConfig::default();
        let a = PipelineRun::plan(BuildAction::Compile, &context("/ws/a.c"), &config).unwrap();
        let b = PipelineRun::plan(BuildAction::Compile, &context("/ws/a.c"), &config).unwrap();
        assert_ne!(a.id(), b.id());
    }
}
