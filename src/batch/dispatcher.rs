use std::path::{Path, PathBuf};

use log::{error, info};
use rayon::prelude::*;

use super::collect_descriptors;
use crate::error::UnatlasError;
use crate::parser::{ParserRef, Registration};
use crate::reconstruct::{Reconstruction, Reconstructor};

/// What happened to a single descriptor file
#[derive(Debug)]
pub struct FileOutcome {
    pub descriptor: PathBuf,
    pub result: Result<Reconstruction, UnatlasError>,
}

/// Per-file results of a batch run, in no particular order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// Total number of sprite images written across all files
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|r| r.written.len())
            .sum()
    }

    /// Total number of skipped sprite entries across all files
    pub fn warnings(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|r| r.warnings.len())
            .sum()
    }

    /// The first environment failure that should end the run, if any
    pub fn fatal(&self) -> Option<&UnatlasError> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err())
            .find(|e| e.is_fatal())
    }
}

/// Drives parse → reconstruct for every descriptor under the inputs
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher {
    pub reconstructor: Reconstructor,
}

impl Dispatcher {
    pub fn new(reconstructor: Reconstructor) -> Self {
        Self { reconstructor }
    }

    /// Unpack every descriptor found under `inputs`.
    ///
    /// The parser is resolved once. Each descriptor then runs as an
    /// independent task; one file failing never stops the others. Only
    /// request-level problems (unknown type, missing input) return `Err`.
    pub fn unpack_all(
        &self,
        inputs: &[impl AsRef<Path>],
        parser: &ParserRef,
    ) -> Result<BatchReport, UnatlasError> {
        let registration = parser.resolve()?;

        let mut descriptors = Vec::new();
        for input in inputs {
            descriptors.extend(collect_descriptors(input.as_ref(), &registration)?);
        }

        info!("Found {} descriptor file(s)", descriptors.len());

        let outcomes = descriptors
            .into_par_iter()
            .map(|descriptor| self.unpack_file(descriptor, &registration))
            .collect();

        Ok(BatchReport { outcomes })
    }

    pub fn unpack(&self, input: &Path, parser: &ParserRef) -> Result<BatchReport, UnatlasError> {
        self.unpack_all(&[input], parser)
    }

    /// Parse and reconstruct a single descriptor, capturing any failure
    pub fn unpack_file(&self, descriptor: PathBuf, registration: &Registration) -> FileOutcome {
        let result = registration
            .parser
            .parse(&descriptor)
            .map_err(UnatlasError::from)
            .and_then(|atlas| self.reconstructor.reconstruct(&atlas));

        if let Err(e) = &result {
            error!("Failed to unpack {}: {}", descriptor.display(), e);
        }

        FileOutcome { descriptor, result }
    }
}

/// Unpack a descriptor file or directory tree with default options
pub fn unpack(input: &Path, parser: &ParserRef) -> Result<BatchReport, UnatlasError> {
    Dispatcher::default().unpack(input, parser)
}
