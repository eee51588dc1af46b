use std::{fs::File, io, ops::Deref, path::Path};

use memmap2::Mmap;

/// A read-only, memory-mapped input document.
#[derive(Debug)]
pub struct MappedFile {
    _file: File,
    data: Option<Mmap>,
}

impl MappedFile {
    #[allow(unsafe_code)]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        tracing::trace!(
            path = path.as_ref().as_os_str().to_str(),
            "memory-mapping glTF document"
        );
        let file = File::options().read(true).write(false).open(path)?;
        Ok(Self {
            data: Some(unsafe { Mmap::map(&file)? }),
            _file: file,
        })
    }
}

impl Drop for MappedFile {
    fn drop(&mut self) {
        self.data.take(); // the mmap must be dropped before we close its associated file
    }
}

impl Deref for MappedFile {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.data.as_deref().unwrap_or_default()
    }
}
