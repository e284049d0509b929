use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::entry::Entry;
use super::path::{parent_of, ROOT};

/// Inode of the root directory.
pub const ROOT_INO: u64 = 1;

/// Path index, inode index and per-directory children, kept as one unit.
///
/// This is a plain data structure with no locking of its own. `MetadataStore`
/// owns it behind a single lock and is the only writer; every method that
/// mutates one index updates the others in the same call.
pub struct InodeTable {
    entries: HashMap<String, Entry>,
    ino_to_path: HashMap<u64, String>,
    children: HashMap<String, BTreeSet<String>>,
    next_ino: u64,
}

impl InodeTable {
    /// A table holding only `root`.
    pub fn new(root: Entry) -> Self {
        debug_assert_eq!(root.path, ROOT);
        let mut table = Self {
            entries: HashMap::new(),
            ino_to_path: HashMap::new(),
            children: HashMap::new(),
            next_ino: root.ino + 1,
        };
        table.children.insert(ROOT.to_string(), BTreeSet::new());
        table.ino_to_path.insert(root.ino, root.path.clone());
        table.entries.insert(root.path.clone(), root);
        table
    }

    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.entries.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Entry> {
        self.entries.get_mut(path)
    }

    pub fn get_path(&self, ino: u64) -> Option<&str> {
        self.ino_to_path.get(&ino).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Hand out the next inode. Inodes are never handed out twice, even after
    /// the entry holding one is removed.
    pub fn alloc_ino(&mut self) -> u64 {
        let ino = self.next_ino;
        self.next_ino += 1;
        ino
    }

    /// Insert a new entry into every index. The caller has already checked
    /// that the path is free and the parent is a live directory.
    pub fn insert(&mut self, entry: Entry) {
        if let Some(parent) = parent_of(&entry.path) {
            self.children
                .entry(parent.to_string())
                .or_default()
                .insert(entry.path.clone());
        }
        if entry.is_dir() {
            self.children.entry(entry.path.clone()).or_default();
        }
        self.ino_to_path.insert(entry.ino, entry.path.clone());
        self.entries.insert(entry.path.clone(), entry);
    }

    /// Remove an entry from every index, returning it.
    pub fn remove_by_path(&mut self, path: &str) -> Option<Entry> {
        let entry = self.entries.remove(path)?;
        self.ino_to_path.remove(&entry.ino);
        self.children.remove(path);
        if let Some(parent) = parent_of(path) {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.remove(path);
            }
        }
        Some(entry)
    }

    pub fn child_count(&self, dir: &str) -> usize {
        self.children.get(dir).map_or(0, BTreeSet::len)
    }

    /// Immediate children of `dir`, ordered by path.
    pub fn children(&self, dir: &str) -> impl Iterator<Item = &Entry> {
        self.children
            .get(dir)
            .into_iter()
            .flatten()
            .filter_map(|p| self.entries.get(p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Ordered copies of both indexes.
    pub fn dump(&self) -> (BTreeMap<String, Entry>, BTreeMap<u64, String>) {
        let entries = self
            .entries
            .iter()
            .map(|(p, e)| (p.clone(), e.clone()))
            .collect();
        let inodes = self
            .ino_to_path
            .iter()
            .map(|(i, p)| (*i, p.clone()))
            .collect();
        (entries, inodes)
    }
}
