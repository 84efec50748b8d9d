use std::path::PathBuf;
use thiserror::Error;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("directory {} not found in tree", .0.display())]
    NotFound(PathBuf),

    #[error("{} does not seem to be a directory and cannot be expanded", .0.display())]
    NotADirectory(PathBuf),

    /// A node could not find itself among its parent's children. The tree is
    /// corrupt and the session cannot continue.
    #[error("tree navigation lost track of {}: not listed under its parent", .0.display())]
    ConsistencyViolation(PathBuf),

    #[error("failed to resolve {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
