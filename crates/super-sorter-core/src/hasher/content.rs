use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use blake3::Hasher;

/// Size and content digest of one file, taken from a single open handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentity {
    pub size: u64,
    pub content_hash: String,
}

/// Size and streaming BLAKE3 hash (hex) of `path`. The handle is dropped
/// before returning.
pub fn identify(path: &Path, block_size: usize) -> io::Result<FileIdentity> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();
    let content_hash = hash_reader(&mut file, block_size)?;
    Ok(FileIdentity { size, content_hash })
}

/// Reads `block_size` bytes at a time so memory use does not depend on file size.
fn hash_reader<R: Read>(reader: &mut R, block_size: usize) -> io::Result<String> {
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; block_size.max(1)];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}
