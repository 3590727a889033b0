//! TFile header parsing and the top-level reader interface.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::branch_reader::BranchReader;
use crate::datasource::DataSource;
use crate::decompress::decompress;
use crate::directory::{DirHeader, Directory};
use crate::error::{Result, RootError};
use crate::graph::Graph;
use crate::histogram::Histogram;
use crate::key::{Key, KeyInfo};
use crate::lazy::{BasketDecode, LazyBranch};
use crate::objects;
use crate::rbuffer::RBuffer;
use crate::tree::{BranchInfo, Tree};

const ROOT_MAGIC: &[u8; 4] = b"root";
/// Smallest possible file header.
const MIN_HEADER_LEN: usize = 64;
/// File versions at or above this use 64-bit seek pointers.
const LARGE_FILE_VERSION: u32 = 1_000_000;

/// Fields of the file header the reader needs.
#[derive(Debug, Clone, Copy)]
struct FileHeader {
    is_large: bool,
    top: DirHeader,
}

/// A ROOT file opened for reading.
pub struct RootFile {
    data: DataSource,
    header: FileHeader,
    path: PathBuf,
}

impl fmt::Debug for RootFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootFile").field("path", &self.path).field("len", &self.data.len()).finish()
    }
}

impl RootFile {
    /// Open a file from disk (memory-mapped).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        let data = DataSource::map(&file)?;
        Self::from_source(data, path)
    }

    /// Parse a file already held in memory.
    pub fn from_bytes(data: Vec<u8>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::from_source(DataSource::Owned(data), path.into())
    }

    fn from_source(data: DataSource, path: PathBuf) -> Result<Self> {
        if data.len() < MIN_HEADER_LEN || &data[..4] != ROOT_MAGIC {
            return Err(RootError::BadMagic);
        }
        let header = parse_header(&data)?;
        log::debug!(
            "opened {} ({} bytes, top key list at {})",
            path.display(),
            data.len(),
            header.top.seek_keys
        );
        Ok(Self { data, header, path })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keys of the top-level directory.
    pub fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        self.list_keys_in("")
    }

    /// Keys of the directory at `dir_path` (`""` or `"/"` for the top level).
    pub fn list_keys_in(&self, dir_path: &str) -> Result<Vec<KeyInfo>> {
        let dir = self.directory(dir_path)?;
        Ok(dir.keys().iter().map(KeyInfo::from).collect())
    }

    /// Whether an object exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_ok()
    }

    /// Read a TH1D/TH1F by path, e.g. `"h_res_EMTF_pt_test_pt_all_eta_all"`.
    pub fn get_histogram(&self, path: &str) -> Result<Histogram> {
        let key = self.find(path)?;
        let payload = self.read_key_payload(&key)?;
        objects::read_histogram(&payload, &key.class_name, key.key_len as usize)
    }

    /// Read a TGraph/TGraphErrors by path.
    pub fn get_graph(&self, path: &str) -> Result<Graph> {
        let key = self.find(path)?;
        let payload = self.read_key_payload(&key)?;
        objects::read_graph(&payload, &key.class_name, key.key_len as usize)
    }

    /// Read a TTree by path, e.g. `"ntuple/tree"`.
    pub fn get_tree(&self, path: &str) -> Result<Tree> {
        let key = match self.find(path) {
            Ok(key) => key,
            Err(RootError::KeyNotFound(_)) => return Err(RootError::TreeNotFound(path.to_string())),
            Err(e) => return Err(e),
        };
        if key.class_name != "TTree" {
            return Err(RootError::TreeNotFound(format!("{path} is a {}", key.class_name)));
        }
        let payload = self.read_key_payload(&key)?;
        objects::read_tree(&payload, key.key_len as usize)
    }

    /// A reader for the named branch of `tree`.
    pub fn branch_reader<'a>(&'a self, tree: &'a Tree, branch: &str) -> Result<BranchReader<'a>> {
        let info = tree
            .find_branch(branch)
            .ok_or_else(|| RootError::BranchNotFound(format!("{}.{branch}", tree.name)))?;
        Ok(BranchReader::new(&self.data, info, self.header.is_large))
    }

    /// A branch of `tree` decoded basket by basket, on first access.
    pub fn lazy_branch<T: BasketDecode>(&self, tree: &Tree, branch: &str) -> Result<LazyBranch<T>> {
        LazyBranch::new(&self.branch_reader(tree, branch)?)
    }

    pub(crate) fn reader_for<'a>(&'a self, info: &'a BranchInfo) -> BranchReader<'a> {
        BranchReader::new(&self.data, info, self.header.is_large)
    }

    fn directory(&self, dir_path: &str) -> Result<Directory> {
        let mut dir = Directory::read(&self.data, self.header.top, self.header.is_large)?;
        for part in dir_path.split('/').filter(|s| !s.is_empty()) {
            let key = dir
                .find_key(part)
                .ok_or_else(|| RootError::KeyNotFound(format!("{part} (in {dir_path})")))?
                .clone();
            dir = self.subdirectory(&key, dir_path)?;
        }
        Ok(dir)
    }

    fn subdirectory(&self, key: &Key, context: &str) -> Result<Directory> {
        if !key.is_directory() {
            return Err(RootError::Deserialization(format!(
                "'{}' in {context} is a {}, not a directory",
                key.name, key.class_name
            )));
        }
        let payload = self.read_key_payload(key)?;
        let header = DirHeader::read(&mut RBuffer::new(&payload))?;
        Directory::read(&self.data, header, self.header.is_large)
    }

    /// Resolve `path` to its key, walking sub-directories.
    fn find(&self, path: &str) -> Result<Key> {
        let (dir_path, name) = match path.trim_matches('/').rsplit_once('/') {
            Some((d, n)) => (d, n),
            None => ("", path.trim_matches('/')),
        };
        if name.is_empty() {
            return Err(RootError::KeyNotFound(path.to_string()));
        }
        let dir = self.directory(dir_path)?;
        dir.find_key(name).cloned().ok_or_else(|| RootError::KeyNotFound(path.to_string()))
    }

    /// The (inflated) object bytes of a key.
    fn read_key_payload(&self, key: &Key) -> Result<Vec<u8>> {
        let start = usize::try_from(key.seek_key)
            .map_err(|_| RootError::Deserialization(format!("seek {} out of range", key.seek_key)))?;
        let end = start + key.n_bytes as usize;
        if end > self.data.len() || (key.key_len as u32) > key.n_bytes {
            return Err(RootError::BufferUnderflow {
                offset: start,
                need: key.n_bytes as usize,
                have: self.data.len().saturating_sub(start),
            });
        }
        let body = &self.data[start + key.key_len as usize..end];
        if key.is_compressed() {
            decompress(body, key.obj_len as usize)
        } else {
            Ok(body.to_vec())
        }
    }
}

/// Parse the file header and the top directory record at `fBEGIN + fNbytesName`.
///
/// ```text
///  0  "root"        4  fVersion       8  fBEGIN
/// 12  fEND         16  fSeekFree     20  fNbytesFree
/// 24  nfree        28  fNbytesName   32  fUnits (u8)
/// 33  fCompress    37  fSeekInfo     41  fNbytesInfo   45  fUUID
/// ```
/// `fEND`, `fSeekFree` and `fSeekInfo` are 8 bytes wide in large files.
fn parse_header(data: &[u8]) -> Result<FileHeader> {
    let mut r = RBuffer::new(data);
    r.skip(4)?;
    let version = r.read_u32()?;
    let is_large = version >= LARGE_FILE_VERSION;
    let begin = r.read_u32()? as usize;
    let seek_width = if is_large { 8 } else { 4 };
    // fEND, fSeekFree
    r.skip(2 * seek_width)?;
    let _nbytes_free = r.read_u32()?;
    let _nfree = r.read_u32()?;
    let nbytes_name = r.read_u32()? as usize;

    let dir_pos = begin + nbytes_name;
    if dir_pos >= data.len() {
        return Err(RootError::Deserialization("top directory lies past end of file".into()));
    }
    r.set_pos(dir_pos);
    let top = DirHeader::read(&mut r)?;
    Ok(FileHeader { is_large, top })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_foreign_bytes() {
        let r = RootFile::from_bytes(vec![0u8; 100], "zeros.root");
        assert!(matches!(r, Err(RootError::BadMagic)));
    }

    #[test]
    fn rejects_truncated_header() {
        let r = RootFile::from_bytes(b"root".to_vec(), "short.root");
        assert!(matches!(r, Err(RootError::BadMagic)));
    }

    #[test]
    fn rejects_directory_past_end() {
        let mut data = b"root".to_vec();
        data.extend_from_slice(&62_000u32.to_be_bytes());
        data.extend_from_slice(&100u32.to_be_bytes());
        data.resize(28, 0);
        data.extend_from_slice(&5000u32.to_be_bytes());
        data.resize(80, 0);
        assert!(matches!(
            RootFile::from_bytes(data, "bad.root"),
            Err(RootError::Deserialization(_))
        ));
    }
}
