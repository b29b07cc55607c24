use std::fs;
use std::path::{Path, PathBuf};

use grit_build::{CommitBuilder, CommitRequest, DiskSource, TreeBuilder};
use grit_refs::{FileRefStore, Head, RefStore};
use grit_store::codec::{digest_of, split_header};
use grit_store::{Blob, LooseObjectStore, Object, ObjectKind, ObjectStore, Tree};
use grit_types::ObjectId;
use tracing::{debug, info};

use crate::config::{RepoConfig, CONFIG_FILE};
use crate::error::{SdkError, SdkResult};

/// Name of the repository metadata directory inside the work dir.
pub const GIT_DIR: &str = ".git";

/// A repository on disk: a work dir plus its `.git` directory.
///
/// Objects live in a [`LooseObjectStore`] under `.git/objects`, refs in a
/// [`FileRefStore`] rooted at `.git`.
#[derive(Debug)]
pub struct Repository {
    work_dir: PathBuf,
    git_dir: PathBuf,
    config: RepoConfig,
    store: LooseObjectStore,
    refs: FileRefStore,
}

impl Repository {
    /// Create the repository layout under `work_dir`.
    ///
    /// Safe to run on an existing repository: directories are created only
    /// if missing and an existing `HEAD` is left alone. A non-default
    /// `config` is written to `.git/grit.toml` unless one already exists.
    pub fn init(work_dir: impl AsRef<Path>, config: &RepoConfig) -> SdkResult<Self> {
        let work_dir = work_dir.as_ref().to_path_buf();
        let git_dir = work_dir.join(GIT_DIR);

        for dir in ["objects", "refs/heads", "refs/tags"] {
            let path = git_dir.join(dir);
            fs::create_dir_all(&path).map_err(|e| SdkError::io(&path, e))?;
        }

        let config_path = git_dir.join(CONFIG_FILE);
        if *config != RepoConfig::default() && !config_path.exists() {
            config.save(&config_path)?;
        }

        let repo = Self::with_config(work_dir, config.clone());
        if repo.refs.head()?.is_none() {
            repo.refs.set_head(&config.core.default_branch)?;
        }
        info!(git_dir = %repo.git_dir.display(), "initialized repository");
        Ok(repo)
    }

    /// Open an existing repository rooted at `work_dir`.
    pub fn open(work_dir: impl AsRef<Path>) -> SdkResult<Self> {
        let work_dir = work_dir.as_ref().to_path_buf();
        let git_dir = work_dir.join(GIT_DIR);
        if !git_dir.is_dir() {
            return Err(SdkError::NotInitialized(work_dir));
        }
        let config = RepoConfig::load_or_default(&git_dir.join(CONFIG_FILE))?;
        debug!(git_dir = %git_dir.display(), "opened repository");
        Ok(Self::with_config(work_dir, config))
    }

    fn with_config(work_dir: PathBuf, config: RepoConfig) -> Self {
        let git_dir = work_dir.join(GIT_DIR);
        let store = LooseObjectStore::new(git_dir.join("objects"))
            .with_compression_level(config.core.compression_level);
        let refs = FileRefStore::new(&git_dir);
        Self {
            work_dir,
            git_dir,
            config,
            store,
            refs,
        }
    }

    // ---- Accessors ----

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn store(&self) -> &LooseObjectStore {
        &self.store
    }

    pub fn refs(&self) -> &FileRefStore {
        &self.refs
    }

    pub fn head(&self) -> SdkResult<Option<Head>> {
        Ok(self.refs.head()?)
    }

    // ---- Object operations ----

    /// Resolve a full or abbreviated hex id.
    pub fn resolve(&self, spec: &str) -> SdkResult<ObjectId> {
        Ok(self.store.resolve(spec)?)
    }

    /// Hash a file as a blob, storing it when `write` is set.
    ///
    /// Relative paths are taken from the work dir.
    pub fn hash_object(&self, path: &Path, write: bool) -> SdkResult<ObjectId> {
        let path = self.work_dir.join(path);
        let data = fs::read(&path).map_err(|e| SdkError::io(&path, e))?;
        let blob = Object::Blob(Blob::new(data));
        let id = if write {
            self.store.write_object(&blob)?
        } else {
            digest_of(&blob)?
        };
        Ok(id)
    }

    /// Read and decode the object `spec` names.
    pub fn cat_file(&self, spec: &str) -> SdkResult<Object> {
        let id = self.resolve(spec)?;
        Ok(self.store.read_object(&id)?)
    }

    /// Kind and payload bytes of the object `spec` names, exactly as stored.
    ///
    /// The payload is not parsed, so commits this crate cannot decode
    /// (merges, signed commits) still come back intact.
    pub fn read_payload(&self, spec: &str) -> SdkResult<(ObjectKind, Vec<u8>)> {
        let id = self.resolve(spec)?;
        let bytes = self.store.get(&id)?;
        let (kind, payload) = split_header(&bytes).map_err(|e| e.for_object(&id))?;
        Ok((kind, payload.to_vec()))
    }

    /// Kind and payload size of the object `spec` names, without decoding it.
    pub fn object_header(&self, spec: &str) -> SdkResult<(ObjectKind, usize)> {
        let (kind, payload) = self.read_payload(spec)?;
        Ok((kind, payload.len()))
    }

    /// The tree `spec` names. A commit is peeled to its root tree.
    pub fn ls_tree(&self, spec: &str) -> SdkResult<Tree> {
        let tree = match self.cat_file(spec)? {
            Object::Commit(commit) => self.store.read_object(&commit.tree)?.into_tree()?,
            other => other.into_tree()?,
        };
        Ok(tree)
    }

    /// Snapshot the work dir (minus `.git`) and return the root tree id.
    pub fn write_tree(&self) -> SdkResult<ObjectId> {
        let id = TreeBuilder::new(&self.store, &DiskSource).build(&self.work_dir)?;
        Ok(id)
    }

    /// Commit `tree` as the configured user and advance HEAD.
    pub fn commit_tree(
        &self,
        tree: &str,
        parent: Option<&str>,
        message: &str,
    ) -> SdkResult<ObjectId> {
        let tree = self.resolve(tree)?;
        let parent = parent.map(|p| self.resolve(p)).transpose()?;
        let user = &self.config.user;
        let id = CommitBuilder::new(&self.store, &self.refs).commit(
            tree,
            parent,
            &user.name,
            &user.email,
            message,
        )?;
        Ok(id)
    }

    /// Commit with explicit signatures and advance HEAD.
    pub fn commit_with(&self, request: CommitRequest) -> SdkResult<ObjectId> {
        Ok(CommitBuilder::new(&self.store, &self.refs).commit_with(request)?)
    }

    /// Canonical bytes of HEAD's commit.
    pub fn show(&self) -> SdkResult<Vec<u8>> {
        Ok(CommitBuilder::new(&self.store, &self.refs).show()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grit_build::BuildError;
    use grit_store::StoreError;
    use grit_types::Signature;
    use tempfile::TempDir;

    fn new_repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path(), &RepoConfig::default()).unwrap();
        (dir, repo)
    }

    fn hex(id: ObjectId) -> String {
        id.to_hex()
    }

    #[test]
    fn init_creates_layout() {
        let (dir, _repo) = new_repo();
        let git = dir.path().join(".git");
        assert!(git.join("objects").is_dir());
        assert!(git.join("refs/heads").is_dir());
        assert!(git.join("refs/tags").is_dir());
        assert_eq!(
            fs::read_to_string(git.join("HEAD")).unwrap(),
            "ref: refs/heads/main\n"
        );
        assert!(!git.join(CONFIG_FILE).exists());
    }

    #[test]
    fn reinit_preserves_head_and_objects() {
        let (dir, repo) = new_repo();
        repo.refs().set_head("dev").unwrap();
        fs::write(dir.path().join("f"), "data").unwrap();
        let id = repo.hash_object(Path::new("f"), true).unwrap();

        let again = Repository::init(dir.path(), &RepoConfig::default()).unwrap();
        assert_eq!(again.head().unwrap(), Some(Head::Symbolic("dev".into())));
        assert!(again.store().exists(&id).unwrap());
    }

    #[test]
    fn init_with_custom_branch_persists_config() {
        let dir = TempDir::new().unwrap();
        let mut config = RepoConfig::default();
        config.core.default_branch = "trunk".into();
        Repository::init(dir.path(), &config).unwrap();

        let repo = Repository::open(dir.path()).unwrap();
        assert_eq!(repo.config().core.default_branch, "trunk");
        assert_eq!(repo.head().unwrap(), Some(Head::Symbolic("trunk".into())));
    }

    #[test]
    fn open_requires_git_dir() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(SdkError::NotInitialized(_))
        ));
    }

    #[test]
    fn hash_object_hello() {
        let (dir, repo) = new_repo();
        fs::write(dir.path().join("hello.txt"), "hello\n").unwrap();

        let id = repo.hash_object(Path::new("hello.txt"), false).unwrap();
        assert_eq!(hex(id), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert!(!repo.store().exists(&id).unwrap());

        repo.hash_object(Path::new("hello.txt"), true).unwrap();
        assert!(dir
            .path()
            .join(".git/objects/ce/013625030ba8dba906f756967f9e9ca394464a")
            .is_file());
    }

    #[test]
    fn hash_object_missing_file_is_io_error() {
        let (_dir, repo) = new_repo();
        assert!(matches!(
            repo.hash_object(Path::new("nope"), true),
            Err(SdkError::Io { .. })
        ));
    }

    #[test]
    fn cat_file_after_hash_object() {
        let (dir, repo) = new_repo();
        fs::write(dir.path().join("hello.txt"), "hello\n").unwrap();
        let id = repo.hash_object(Path::new("hello.txt"), true).unwrap();

        let blob = repo.cat_file(&hex(id)).unwrap().into_blob().unwrap();
        assert_eq!(blob.data, b"hello\n");
        assert_eq!(repo.object_header("ce0136").unwrap(), (ObjectKind::Blob, 6));
    }

    #[test]
    fn write_tree_single_file() {
        let (dir, repo) = new_repo();
        fs::write(dir.path().join("a.txt"), "x").unwrap();

        let tree = repo.write_tree().unwrap();
        assert_eq!(hex(tree), "9375a50d54bf5374615a3378349e298761a4b116");

        let listing = repo.ls_tree(&hex(tree)).unwrap();
        let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt"]);
        assert_eq!(
            repo.object_header(&hex(tree)).unwrap(),
            (ObjectKind::Tree, 33)
        );
    }

    #[test]
    fn write_tree_ignores_git_dir_and_keeps_nesting() {
        let (dir, repo) = new_repo();
        fs::create_dir_all(dir.path().join("src/empty")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), "").unwrap();
        fs::write(dir.path().join("README"), "r").unwrap();

        let root = repo.ls_tree(&hex(repo.write_tree().unwrap())).unwrap();
        let names: Vec<_> = root.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["README", "src"]);

        let src = repo.ls_tree(&hex(root.get("src").unwrap().object_id)).unwrap();
        assert_eq!(
            hex(src.get("empty").unwrap().object_id),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
        assert_eq!(
            hex(src.get("lib.rs").unwrap().object_id),
            "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391"
        );
    }

    #[test]
    fn commit_tree_and_show() {
        let (dir, repo) = new_repo();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        let tree = repo.write_tree().unwrap();

        let first = repo.commit_tree(&hex(tree), None, "first").unwrap();
        let shown = repo.show().unwrap();
        let (kind, payload) = split_header(&shown).unwrap();
        assert_eq!(kind, ObjectKind::Commit);
        let text = std::str::from_utf8(payload).unwrap();
        assert!(text.starts_with(
            "tree 9375a50d54bf5374615a3378349e298761a4b116\nauthor grit <grit@localhost> "
        ));
        assert!(text.ends_with("\n\nfirst"));

        let second = repo
            .commit_tree(&tree.short_hex(), Some(&hex(first)), "second")
            .unwrap();
        let commit = repo.cat_file(&hex(second)).unwrap().into_commit().unwrap();
        assert_eq!(commit.parent, Some(first));
        assert_eq!(
            fs::read_to_string(dir.path().join(".git/refs/heads/main")).unwrap(),
            format!("{second}\n")
        );
    }

    #[test]
    fn ls_tree_peels_commits() {
        let (dir, repo) = new_repo();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        let tree = repo.write_tree().unwrap();
        let sig = Signature::new("A", "a@example.com", 0, 0);
        let commit = repo
            .commit_with(CommitRequest::new(tree, sig, "m"))
            .unwrap();
        assert_eq!(repo.ls_tree(&hex(commit)).unwrap(), repo.ls_tree(&hex(tree)).unwrap());
    }

    #[test]
    fn ls_tree_of_blob_is_kind_mismatch() {
        let (dir, repo) = new_repo();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        let blob = repo.hash_object(Path::new("a.txt"), true).unwrap();
        assert!(matches!(
            repo.ls_tree(&hex(blob)),
            Err(SdkError::Store(StoreError::KindMismatch { .. }))
        ));
    }

    #[test]
    fn show_without_commits() {
        let (_dir, repo) = new_repo();
        assert!(matches!(
            repo.show(),
            Err(SdkError::Build(BuildError::NoCommits))
        ));
    }

    #[test]
    fn tampered_object_is_corrupt() {
        let (dir, repo) = new_repo();
        fs::write(dir.path().join("hello.txt"), "hello\n").unwrap();
        let id = repo.hash_object(Path::new("hello.txt"), true).unwrap();

        // swap in the (valid) compressed bytes of a different object
        fs::write(dir.path().join("other.txt"), "other\n").unwrap();
        let other = repo.hash_object(Path::new("other.txt"), true).unwrap();
        let store = repo.store();
        let path = store.object_path(&id);
        fs::remove_file(&path).unwrap();
        fs::copy(store.object_path(&other), &path).unwrap();

        let err = repo.cat_file(&hex(id)).unwrap_err();
        assert!(matches!(err, SdkError::Store(ref e) if e.is_corrupt()));
    }

    #[test]
    fn read_payload_keeps_commits_verbatim() {
        let (_dir, repo) = new_repo();
        let tree = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
        let payload = format!(
            "tree {tree}\n\
             parent 1111111111111111111111111111111111111111\n\
             parent 2222222222222222222222222222222222222222\n\
             author A <a@example.com> 0 -0000\n\
             committer A <a@example.com> 0 -0000\n\
             \n\
             merge"
        );
        let framed = grit_store::codec::frame(ObjectKind::Commit, payload.as_bytes());
        let id = ObjectId::hash(&framed);
        repo.store().put(&id, &framed).unwrap();

        let (kind, bytes) = repo.read_payload(&hex(id)).unwrap();
        assert_eq!(kind, ObjectKind::Commit);
        assert_eq!(bytes, payload.as_bytes());
        assert_eq!(
            repo.object_header(&id.short_hex()).unwrap(),
            (ObjectKind::Commit, payload.len())
        );
    }

    #[test]
    fn unknown_object_is_not_found() {
        let (_dir, repo) = new_repo();
        let missing = "0123456789abcdef0123456789abcdef01234567";
        assert!(matches!(
            repo.cat_file(missing),
            Err(SdkError::Store(StoreError::NotFound(_)))
        ));
        assert!(matches!(
            repo.cat_file("abcd"),
            Err(SdkError::Store(StoreError::NoMatch(_)))
        ));
    }
}
