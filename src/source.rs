use std::fmt::{Debug, Display, Formatter};

/// Index of a file registered with the [`SourceMap`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl Display for FileId {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

/// Source location triple: file index, line (from 1) and column offset (from 0).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SourceLoc {
    pub file: FileId,
    pub line: u32,
    pub col: u32,
}

impl SourceLoc {
    pub fn new(file: FileId, line: u32, col: u32) -> Self {
        Self { file, line, col }
    }

    /// Label suffix used by the emitter, `<file>_<line>_<col>`.
    pub fn label_suffix(&self) -> String {
        format!("{}_{}_{}", self.file.0, self.line, self.col)
    }
}

impl Display for SourceLoc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.file.0, self.line, self.col)
    }
}

impl Debug for SourceLoc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SourceLoc({}.{}.{})", self.file.0, self.line, self.col)
    }
}

/// Registry of the file names seen while scanning, in first-seen order.
///
/// The first entry is the file handed to the compiler; each line marker
/// (`# 1 "foo.oh"`) appends another one.
#[derive(Debug, Default, Clone)]
pub struct SourceMap {
    names: Vec<String>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, name: impl Into<String>) -> FileId {
        let id = FileId(self.names.len() as u32);
        self.names.push(name.into());
        id
    }

    pub fn name(&self, id: FileId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_loc_display() {
        let loc = SourceLoc::new(FileId(0), 3, 14);
        assert_eq!(loc.to_string(), "0.3.14");
        assert_eq!(loc.label_suffix(), "0_3_14");
    }

    #[test]
    fn source_map_assigns_increasing_ids() {
        let mut map = SourceMap::new();
        let a = map.add_file("a.oc");
        let b = map.add_file("oclib.oh");
        assert_eq!(a, FileId(0));
        assert_eq!(b, FileId(1));
        assert_eq!(map.name(b), Some("oclib.oh"));
        assert_eq!(map.name(FileId(7)), None);
    }
}
