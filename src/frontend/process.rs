use log::{debug, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use uuid::Uuid;
use walkdir::WalkDir;

use super::{
    parse_clang_diagnostics, parse_generator_diagnostics, Frontend, FrontendConfig,
    GenerationDiagnostic, Invocation, ParseOutcome, ResultCode, TranslationFlags,
    LIBRARY_NAMESPACE_PLACEHOLDER, LIBRARY_PATH_PLACEHOLDER,
};
use crate::capture::OutputCapture;
use crate::scraper::ScrapeError;

const OUTPUT_FILE_NAME: &str = "bindings.xml";

/// Frontend backed by external programs: `clang` for the parse step and
/// ClangSharp's P/Invoke generator (XML output mode) for generation.
pub struct ProcessFrontend {
    clang: PathBuf,
    generator: PathBuf,
    scratch_root: PathBuf,
}

/// Translation unit validated by a syntax-only clang run
#[derive(Debug)]
pub struct ProcessUnit {
    header: PathBuf,
}

impl ProcessUnit {
    pub fn header(&self) -> &Path {
        &self.header
    }
}

impl ProcessFrontend {
    pub fn new(config: &FrontendConfig) -> Self {
        Self {
            clang: config.clang_path.clone(),
            generator: config.generator_path.clone(),
            scratch_root: config.scratch_root(),
        }
    }

    /// Arguments for the syntax-only clang run.
    ///
    /// The long-form options the invoker builds are clang driver aliases, so
    /// they pass through unchanged. Attribute-visiting flags only affect
    /// cursor traversal and have no driver equivalent.
    pub fn clang_arguments(invocation: &Invocation) -> Vec<String> {
        let mut args = vec![
            "-fsyntax-only".to_string(),
            "-fno-color-diagnostics".to_string(),
            "-fdiagnostics-show-category=name".to_string(),
        ];

        if invocation.flags.contains(TranslationFlags::KEEP_GOING) {
            args.push("-ferror-limit=0".to_string());
        }
        if invocation
            .flags
            .contains(TranslationFlags::DETAILED_PREPROCESSING_RECORD)
        {
            args.push("-Xclang".to_string());
            args.push("-detailed-preprocessing-record".to_string());
        }

        args.extend(invocation.command_line.iter().cloned());
        args.push(invocation.header.display().to_string());
        args
    }

    /// Arguments for the bindings generator writing into `output_dir`
    pub fn generator_arguments(invocation: &Invocation, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            "--file".to_string(),
            invocation.header.display().to_string(),
            "--output".to_string(),
            output_dir.join(OUTPUT_FILE_NAME).display().to_string(),
            "--output-mode".to_string(),
            "Xml".to_string(),
            "--namespace".to_string(),
            LIBRARY_NAMESPACE_PLACEHOLDER.to_string(),
            "--libraryPath".to_string(),
            LIBRARY_PATH_PLACEHOLDER.to_string(),
            "--config".to_string(),
            "no-default-remappings".to_string(),
        ];

        for name in &invocation.included_names {
            args.push("--traverse".to_string());
            args.push(name.clone());
        }
        for name in &invocation.excluded_names {
            args.push("--exclude".to_string());
            args.push(name.clone());
        }
        for arg in &invocation.command_line {
            args.push("--additional".to_string());
            args.push(arg.clone());
        }

        args
    }

    fn run(program: &Path, args: &[String], log_target: &str) -> Result<Output, ScrapeError> {
        debug!(
            target: log_target,
            "Running {} {}",
            program.display(),
            args.join(" ")
        );

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ScrapeError::FrontendUnavailable {
                program: program.to_path_buf(),
                source,
            })?;

        Ok(child.wait_with_output()?)
    }
}

impl Frontend for ProcessFrontend {
    type Unit = ProcessUnit;

    fn parse(&self, invocation: &Invocation) -> Result<ParseOutcome<ProcessUnit>, ScrapeError> {
        let output = Self::run(
            &self.clang,
            &Self::clang_arguments(invocation),
            &invocation.log_target,
        )?;
        let diagnostics = parse_clang_diagnostics(&String::from_utf8_lossy(&output.stderr));

        let code = match output.status.code() {
            Some(0) => ResultCode::Success,
            Some(_) => ResultCode::Failure,
            // terminated by a signal
            None => ResultCode::Crashed,
        };

        let unit = (code == ResultCode::Success).then(|| ProcessUnit {
            header: invocation.header.clone(),
        });

        Ok(ParseOutcome {
            code,
            unit,
            diagnostics,
        })
    }

    fn generate(
        &self,
        unit: &ProcessUnit,
        invocation: &Invocation,
        outputs: &mut OutputCapture,
    ) -> Result<Vec<GenerationDiagnostic>, ScrapeError> {
        let scratch = ScratchDir::create(&self.scratch_root)?;
        let args = Self::generator_arguments(invocation, scratch.path());
        let output = Self::run(&self.generator, &args, &invocation.log_target)?;

        let mut console = String::from_utf8_lossy(&output.stdout).into_owned();
        console.push_str(&String::from_utf8_lossy(&output.stderr));
        let diagnostics = parse_generator_diagnostics(&console);

        if !output.status.success() {
            warn!(
                target: invocation.log_target.as_str(),
                "Bindings generator exited with {:?} for {}",
                output.status.code(),
                unit.header().display()
            );
        }

        for entry in WalkDir::new(scratch.path()).sort_by_file_name() {
            let entry = entry.map_err(|e| ScrapeError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(scratch.path())
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");

            let contents = fs::read(entry.path())?;
            outputs.create(&relative)?.write_all(&contents)?;
        }

        Ok(diagnostics)
    }
}

/// Uniquely named directory removed on drop
pub(crate) struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub(crate) fn create(root: &Path) -> std::io::Result<Self> {
        let path = root.join(format!("header-scraper-{}", Uuid::new_v4()));
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.path).ok();
    }
}
