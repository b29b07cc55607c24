//! On-disk reference store using git's loose ref layout.
//!
//! ```text
//! .git/HEAD              "ref: refs/heads/main\n" or "<hex>\n"
//! .git/refs/heads/main   "<hex>\n"
//! ```
//!
//! Every write goes through a temp file in the target directory followed by
//! an atomic rename, so readers never observe a half-written ref.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use grit_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::{branch_ref, validate_branch_name, validate_ref_name, HEADS_PREFIX};
use crate::traits::RefStore;
use crate::types::Head;

const HEAD_FILE: &str = "HEAD";
const SYMREF_PREFIX: &str = "ref: ";

/// A [`RefStore`] backed by files under a `.git` directory.
#[derive(Clone, Debug)]
pub struct FileRefStore {
    git_dir: PathBuf,
}

impl FileRefStore {
    /// Open the ref store rooted at `git_dir` (the `.git` directory).
    pub fn new(git_dir: impl Into<PathBuf>) -> Self {
        Self {
            git_dir: git_dir.into(),
        }
    }

    /// The `.git` directory this store reads and writes.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn ref_path(&self, name: &str) -> PathBuf {
        name.split('/').fold(self.git_dir.clone(), |p, c| p.join(c))
    }

    /// Read a file, mapping "not found" to `None`.
    fn read_optional(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RefError::io(path, e)),
        }
    }

    fn write_atomic(path: &Path, contents: &str) -> Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| RefError::io(dir, e))?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RefError::io(dir, e))?;
        tmp.write_all(contents.as_bytes())
            .map_err(|e| RefError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| RefError::io(path, e))?;
        tmp.persist(path).map_err(|e| RefError::io(path, e.error))?;
        Ok(())
    }

    fn parse_id(name: &str, text: &str) -> Result<ObjectId> {
        ObjectId::from_hex(text.trim_end()).map_err(|e| RefError::Malformed {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}

impl RefStore for FileRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<ObjectId>> {
        validate_ref_name(name)?;
        match Self::read_optional(&self.ref_path(name))? {
            Some(text) => Self::parse_id(name, &text).map(Some),
            None => Ok(None),
        }
    }

    fn write_ref(&self, name: &str, target: &ObjectId) -> Result<()> {
        validate_ref_name(name)?;
        let path = self.ref_path(name);
        Self::write_atomic(&path, &format!("{target}\n"))?;
        debug!(name, target = %target, "ref updated");
        Ok(())
    }

    fn head(&self) -> Result<Option<Head>> {
        let Some(text) = Self::read_optional(&self.git_dir.join(HEAD_FILE))? else {
            return Ok(None);
        };
        let line = text.trim_end();
        if let Some(target) = line.strip_prefix(SYMREF_PREFIX) {
            let branch = target
                .strip_prefix(HEADS_PREFIX)
                .ok_or_else(|| RefError::Malformed {
                    name: HEAD_FILE.to_string(),
                    reason: format!("symbolic target outside {HEADS_PREFIX}: {target}"),
                })?;
            validate_branch_name(branch).map_err(|e| RefError::Malformed {
                name: HEAD_FILE.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(Some(Head::Symbolic(branch.to_string())));
        }
        Self::parse_id(HEAD_FILE, line).map(|id| Some(Head::Detached(id)))
    }

    fn set_head(&self, branch: &str) -> Result<()> {
        validate_branch_name(branch)?;
        let contents = format!("{SYMREF_PREFIX}{}\n", branch_ref(branch));
        Self::write_atomic(&self.git_dir.join(HEAD_FILE), &contents)?;
        debug!(branch, "HEAD set");
        Ok(())
    }

    fn set_head_detached(&self, target: &ObjectId) -> Result<()> {
        Self::write_atomic(&self.git_dir.join(HEAD_FILE), &format!("{target}\n"))?;
        debug!(target = %target, "HEAD detached");
        Ok(())
    }
}
