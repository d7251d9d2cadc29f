//! Output artifact assembly and sinks.

mod artifact;
mod sink;

pub use {
    artifact::{ArtifactRef, ContainerFormat, FILENAME_PREFIX, OutputArtifact, artifact_filename},
    sink::{DirectorySink, OutputSink},
};

#[cfg(test)]
pub(crate) use sink::write_new_file;
