//! # Content Comparator
//!
//! Size, hash, and byte-level equality between two files.
//!
//! Deep comparison always runs size -> hash -> byte compare in that order,
//! short-circuiting on the first inequality. Shallow comparison accepts size
//! equality alone (plus modification time at the relocation call site) and is
//! a deliberately lossy trade of correctness for speed.
//!
//! Any path that cannot be read during a comparison surfaces as a
//! [`CompareError`]; callers treat that pair as not equal and report it.

use crate::error::CompareError;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use xxhash_rust::xxh3::Xxh3;

/// Read buffer size for hashing and byte comparison
const BUF_SIZE: usize = 64 * 1024;

/// How thoroughly two files are compared for equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareDepth {
    /// Size (and, at the relocation call site, mtime) equality suffices.
    /// Lossy: different content of the same length passes.
    Shallow,
    /// Size, then full-file hash, then byte-for-byte confirmation
    #[default]
    Deep,
}

/// Pairwise file equality checks at a configured depth
#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    depth: CompareDepth,
}

impl Comparator {
    pub fn new(depth: CompareDepth) -> Self {
        Self { depth }
    }

    pub fn depth(&self) -> CompareDepth {
        self.depth
    }

    pub fn sizes_equal(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        Ok(file_size(a)? == file_size(b)?)
    }

    /// Modification-time equality, used by the shallow relocation check
    pub fn mtimes_equal(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        let ma = fs::metadata(a)
            .and_then(|m| m.modified())
            .map_err(|source| read_error(a, source))?;
        let mb = fs::metadata(b)
            .and_then(|m| m.modified())
            .map_err(|source| read_error(b, source))?;
        Ok(ma == mb)
    }

    pub fn hashes_equal(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        Ok(hash_file(a)? == hash_file(b)?)
    }

    /// Streamed block-by-block comparison, short-circuiting on the first
    /// mismatching block. Equal-length trailing empty reads are a match.
    pub fn bytes_equal(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        let mut fa = File::open(a).map_err(|source| read_error(a, source))?;
        let mut fb = File::open(b).map_err(|source| read_error(b, source))?;
        let mut buf_a = vec![0u8; BUF_SIZE];
        let mut buf_b = vec![0u8; BUF_SIZE];

        loop {
            let na = read_full(&mut fa, &mut buf_a).map_err(|source| read_error(a, source))?;
            let nb = read_full(&mut fb, &mut buf_b).map_err(|source| read_error(b, source))?;
            if na != nb {
                return Ok(false);
            }
            if na == 0 {
                return Ok(true);
            }
            if buf_a[..na] != buf_b[..nb] {
                return Ok(false);
            }
        }
    }

    /// Full content equality at the configured depth: deep runs
    /// size -> hash -> bytes, shallow stops after size.
    pub fn content_equal(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        if !self.sizes_equal(a, b)? {
            return Ok(false);
        }
        match self.depth {
            CompareDepth::Shallow => Ok(true),
            CompareDepth::Deep => {
                if !self.hashes_equal(a, b)? {
                    return Ok(false);
                }
                self.bytes_equal(a, b)
            }
        }
    }

    /// Byte confirmation after an externally established hash match.
    ///
    /// Deep mode confirms with a full byte compare; shallow mode trusts the
    /// hash. Hash equality is never silently promoted to content equality
    /// beyond this rule.
    pub fn confirm_hash_match(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        match self.depth {
            CompareDepth::Shallow => Ok(true),
            CompareDepth::Deep => self.bytes_equal(a, b),
        }
    }
}

/// Size of a file in bytes
pub fn file_size(path: &Path) -> Result<u64, CompareError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| read_error(path, source))
}

/// Full-file digest over a fixed-size read buffer
pub fn hash_file(path: &Path) -> Result<u64, CompareError> {
    let mut file = File::open(path).map_err(|source| read_error(path, source))?;
    let mut hasher = Xxh3::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|source| read_error(path, source))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.digest())
}

/// Read until `buf` is full or EOF, so both sides of a byte comparison see
/// identical block boundaries.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_error(path: &Path, source: io::Error) -> CompareError {
    CompareError::Read {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[test]
    fn identical_bytes_are_equal_in_deep_mode() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"same content");
        let b = write_file(&dir, "b.jpg", b"same content");

        let comparator = Comparator::new(CompareDepth::Deep);
        assert!(comparator.content_equal(&a, &b).unwrap());
        assert!(comparator.content_equal(&b, &a).unwrap());
    }

    #[test]
    fn single_byte_difference_is_not_equal() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"same content");
        let b = write_file(&dir, "b.jpg", b"same_content");

        let comparator = Comparator::new(CompareDepth::Deep);
        assert!(!comparator.content_equal(&a, &b).unwrap());
    }

    #[test]
    fn different_sizes_short_circuit() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"short");
        let b = write_file(&dir, "b.jpg", b"much longer content");

        let comparator = Comparator::new(CompareDepth::Deep);
        assert!(!comparator.content_equal(&a, &b).unwrap());
    }

    #[test]
    fn shallow_mode_accepts_same_size_different_content() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"aaaa");
        let b = write_file(&dir, "b.jpg", b"bbbb");

        let comparator = Comparator::new(CompareDepth::Shallow);
        assert!(comparator.content_equal(&a, &b).unwrap());
        // Deep mode catches it
        let deep = Comparator::new(CompareDepth::Deep);
        assert!(!deep.content_equal(&a, &b).unwrap());
    }

    #[test]
    fn empty_files_are_equal() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"");
        let b = write_file(&dir, "b.jpg", b"");

        let comparator = Comparator::new(CompareDepth::Deep);
        assert!(comparator.content_equal(&a, &b).unwrap());
    }

    #[test]
    fn hash_is_stable_across_calls() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"some bytes worth hashing");
        assert_eq!(hash_file(&a).unwrap(), hash_file(&a).unwrap());
    }

    #[test]
    fn missing_file_reports_comparator_error() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"content");
        let missing = dir.path().join("gone.jpg");

        let comparator = Comparator::new(CompareDepth::Deep);
        assert!(comparator.content_equal(&a, &missing).is_err());
        assert!(hash_file(&missing).is_err());
    }

    #[test]
    fn confirm_hash_match_respects_depth() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.jpg", b"aaaa");
        let b = write_file(&dir, "b.jpg", b"bbbb");

        // Shallow trusts the caller's hash match
        let shallow = Comparator::new(CompareDepth::Shallow);
        assert!(shallow.confirm_hash_match(&a, &b).unwrap());

        // Deep re-checks the bytes
        let deep = Comparator::new(CompareDepth::Deep);
        assert!(!deep.confirm_hash_match(&a, &b).unwrap());
    }
}
