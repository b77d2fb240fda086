//! Tree and label files on disk.
//!
//! A built index is persisted as two files: the binary tree (see
//! [`crate::codec`]) and the newline separated label list. Both are written
//! to a temporary sibling first and renamed into place, so a reader never
//! sees a half-written file.

use crate::codec;
use crate::error::Result;
use crate::labels::LabelTable;
use crate::locator::CountryLocator;
use crate::quadtree::QuadTree;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_TREE_FILE: &str = "quadtree.dat";
pub const DEFAULT_LABELS_FILE: &str = "countries.dat";

/// Locations of the tree file and its label file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFiles {
    tree_path: PathBuf,
    labels_path: PathBuf,
}

impl IndexFiles {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(tree_path: P, labels_path: Q) -> Self {
        Self {
            tree_path: tree_path.as_ref().to_path_buf(),
            labels_path: labels_path.as_ref().to_path_buf(),
        }
    }

    /// Default file names inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(DEFAULT_TREE_FILE), dir.join(DEFAULT_LABELS_FILE))
    }

    pub fn tree_path(&self) -> &Path {
        &self.tree_path
    }

    pub fn labels_path(&self) -> &Path {
        &self.labels_path
    }

    pub fn exists(&self) -> bool {
        self.tree_path.exists() && self.labels_path.exists()
    }

    /// Write both files. Both are staged as temporary siblings before
    /// either is renamed, so a failed write leaves the previous pair intact.
    pub fn save(&self, tree: &QuadTree, labels: &LabelTable) -> Result<()> {
        let labels_temp = write_temp(&self.labels_path, |writer| labels.write_to(writer))?;

        let bytes = codec::encode(tree);
        let tree_temp = match write_temp(&self.tree_path, |writer| {
            writer.write_all(&bytes)?;
            Ok(())
        }) {
            Ok(temp) => temp,
            Err(e) => {
                let _ = std::fs::remove_file(&labels_temp);
                return Err(e);
            }
        };

        if let Err(e) = std::fs::rename(&labels_temp, &self.labels_path) {
            let _ = std::fs::remove_file(&labels_temp);
            let _ = std::fs::remove_file(&tree_temp);
            return Err(e.into());
        }
        std::fs::rename(&tree_temp, &self.tree_path)?;

        log::info!(
            "Saved {} byte tree to {} and {} labels to {}",
            bytes.len(),
            self.tree_path.display(),
            labels.len(),
            self.labels_path.display()
        );
        Ok(())
    }

    pub fn load_tree(&self) -> Result<QuadTree> {
        let bytes = std::fs::read(&self.tree_path)?;
        codec::decode(&bytes)
    }

    pub fn load_labels(&self) -> Result<LabelTable> {
        let file = File::open(&self.labels_path)?;
        LabelTable::read_from(BufReader::new(file))
    }

    /// Load both files and join them into a validated locator.
    pub fn load(&self) -> Result<CountryLocator> {
        let labels = self.load_labels()?;
        let tree = self.load_tree()?;
        log::debug!(
            "Loaded tree from {} ({} labels)",
            self.tree_path.display(),
            labels.len()
        );
        CountryLocator::new(tree, labels)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut temp = path.to_path_buf();
    if let Some(name) = temp.file_name() {
        let mut new_name = name.to_string_lossy().into_owned();
        new_name.push_str(".tmp");
        temp.set_file_name(new_name);
    }
    temp
}

/// Write `path`'s temporary sibling and sync it to disk. Returns the
/// temporary path; the caller renames it into place.
fn write_temp<F>(path: &Path, write: F) -> Result<PathBuf>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let temp = temp_path(path);

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp)?;
    let mut writer = BufWriter::new(file);

    let result = write(&mut writer).and_then(|()| {
        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    });

    if let Err(e) = result {
        let _ = std::fs::remove_file(&temp);
        return Err(e);
    }

    Ok(temp)
}
