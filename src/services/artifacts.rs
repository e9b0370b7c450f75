use std::path::{Component, Path};

use tokio::fs::File;

use crate::error::JobError;

/// An opened rendered file, ready to be streamed.
#[derive(Debug)]
pub struct Artifact {
    pub file: File,
    pub len: u64,
}

/// Open a rendered file from the output directory.
///
/// Only plain file names are accepted; anything that could address a path
/// outside `output_dir`, or that is not a regular file, is reported as not found.
pub async fn open_artifact(output_dir: &Path, filename: &str) -> Result<Artifact, JobError> {
    let not_found = || JobError::ArtifactNotFound(filename.to_string());

    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => return Err(not_found()),
    }

    let path = output_dir.join(filename);
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => meta,
        Ok(_) => return Err(not_found()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(JobError::Io(e)),
    };

    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(JobError::Io(e)),
    };

    Ok(Artifact {
        file,
        len: metadata.len(),
    })
}
