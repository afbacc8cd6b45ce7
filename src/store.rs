//! The checkpoint file.  A store is a 64-byte header followed by the
//! raw little-endian cell block, nothing else, so any language that
//! can seek can read one.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use error::Error;
use header::{Header, HEADER_SIZE};
use histogram::Histogram;

/// Handle on a store file.  Holds only the path; every operation
/// opens, works and closes, which keeps the farm free to read the
/// file from other tools between rounds.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Creates a fresh store for `header` with a zeroed cell block.
    /// Refuses to clobber: an existing file at `path` is reported as
    /// `StoreExists`, and resuming it is `open`'s job.
    pub fn create(path: &Path, header: &Header) -> Result<Store, Error> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|cause| {
                if cause.kind() == io::ErrorKind::AlreadyExists {
                    Error::StoreExists {
                        path: path.to_path_buf(),
                    }
                } else {
                    Error::io(path, cause)
                }
            })?;
        file.write_all(&header.encode())
            .map_err(|cause| Error::io(path, cause))?;
        file.write_all(&vec![0; header.cell_count() * 4])
            .map_err(|cause| Error::io(path, cause))?;
        Ok(Store {
            path: path.to_path_buf(),
        })
    }

    /// Opens an existing store, probing the header so a missing or
    /// mangled file fails here rather than mid-farm.
    pub fn open(path: &Path) -> Result<Store, Error> {
        let store = Store {
            path: path.to_path_buf(),
        };
        store.load_header()?;
        Ok(store)
    }

    /// Where the store lives.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads just the header.
    pub fn load_header(&self) -> Result<Header, Error> {
        let mut file = File::open(&self.path).map_err(|cause| Error::io(&self.path, cause))?;
        self.read_header(&mut file)
    }

    /// Reads the whole store.
    pub fn load(&self) -> Result<(Header, Histogram), Error> {
        let mut file = File::open(&self.path).map_err(|cause| Error::io(&self.path, cause))?;
        let header = self.read_header(&mut file)?;
        let histogram = self.read_cells(&mut file, &header)?;
        Ok((header, histogram))
    }

    /// Folds `delta` into the on-disk histogram and sets the progress
    /// word to `new_progress`, returning the merged histogram.
    ///
    /// The cell block is written before the progress word.  A crash
    /// between the two leaves the file understating its progress, and
    /// an understated store merely redoes a little work on resume; it
    /// never claims points its cells do not hold.
    pub fn merge_and_save(&self, delta: &Histogram, new_progress: u64) -> Result<Histogram, Error> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|cause| Error::io(&self.path, cause))?;
        let header = self.read_header(&mut file)?;
        let mut merged = self.read_cells(&mut file, &header)?;
        merged.merge(delta)?;
        file.seek(SeekFrom::Start(HEADER_SIZE as u64))
            .map_err(|cause| Error::io(&self.path, cause))?;
        file.write_all(&merged.to_le_bytes())
            .map_err(|cause| Error::io(&self.path, cause))?;
        file.seek(SeekFrom::Start(0))
            .map_err(|cause| Error::io(&self.path, cause))?;
        file.write_all(&new_progress.to_le_bytes())
            .map_err(|cause| Error::io(&self.path, cause))?;
        Ok(merged)
    }

    /// Zeroes the progress word and the cell block, keeping the
    /// geometry.  The progress word drops first so the store never
    /// claims more points than its cells hold, even mid-reset.
    pub fn reset(&self) -> Result<(), Error> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|cause| Error::io(&self.path, cause))?;
        let header = self.read_header(&mut file)?;
        file.seek(SeekFrom::Start(0))
            .map_err(|cause| Error::io(&self.path, cause))?;
        file.write_all(&0_u64.to_le_bytes())
            .map_err(|cause| Error::io(&self.path, cause))?;
        file.seek(SeekFrom::Start(HEADER_SIZE as u64))
            .map_err(|cause| Error::io(&self.path, cause))?;
        file.write_all(&vec![0; header.cell_count() * 4])
            .map_err(|cause| Error::io(&self.path, cause))?;
        Ok(())
    }

    // take() instead of read_exact, so a short file surfaces as a
    // truncated header rather than a bare I/O failure.  by_ref goes
    // through the trait: File also implements Write, which has its
    // own by_ref.
    fn read_header(&self, file: &mut File) -> Result<Header, Error> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        Read::by_ref(file)
            .take(HEADER_SIZE as u64)
            .read_to_end(&mut bytes)
            .map_err(|cause| Error::io(&self.path, cause))?;
        Header::decode(&bytes)
    }

    fn read_cells(&self, file: &mut File, header: &Header) -> Result<Histogram, Error> {
        let mut bytes = vec![0; header.cell_count() * 4];
        file.read_exact(&mut bytes)
            .map_err(|cause| Error::io(&self.path, cause))?;
        Ok(Histogram::from_le_bytes(header.width, header.height, &bytes))
    }
}
