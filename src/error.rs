//! The error taxonomy shared by the store, the header codec, and the
//! plane geometry.  Configuration problems (a truncated header, corners
//! that do not describe a top-left/bottom-right pair) are fatal at
//! startup; I/O problems are fatal to the round that hit them.  Numeric
//! trouble during projection never reaches here at all: the sampler
//! simply skips the offending orbit point.

use std::io;
use std::path::{Path, PathBuf};

/// Everything that can go wrong on the farm's persistent side.
#[derive(Debug, Fail)]
pub enum Error {
    /// The on-disk header is shorter than the fixed 64-byte layout.
    #[fail(display = "truncated header: got {} bytes, need {}", got, need)]
    TruncatedHeader {
        /// How many bytes were actually present.
        got: usize,
        /// How many bytes the layout requires.
        need: usize,
    },

    /// The two corners do not describe a top-left and a bottom-right.
    #[fail(display = "bad bounding box: {}", _0)]
    BadBounds(String),

    /// Refused to create a store over a file that already exists.
    #[fail(display = "store already exists: {:?}", path)]
    StoreExists {
        /// The path that was refused.
        path: PathBuf,
    },

    /// A file operation on the store failed.
    #[fail(display = "I/O failure on {:?}: {}", path, cause)]
    Io {
        /// The store file involved.
        path: PathBuf,
        /// The operating system's complaint.
        #[fail(cause)]
        cause: io::Error,
    },

    /// Histograms of different dimensions cannot be merged.
    #[fail(display = "histogram dimensions differ: {}x{} vs {}x{}", _0, _1, _2, _3)]
    DimensionMismatch(u16, u16, u16, u16),
}

impl Error {
    /// Wraps an I/O failure together with the path it happened on.
    pub fn io(path: &Path, cause: io::Error) -> Error {
        Error::Io {
            path: path.to_path_buf(),
            cause,
        }
    }
}
