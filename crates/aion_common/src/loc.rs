//! Source line information attached to parse-form nodes and diagnostics.

use crate::ident::{Ident, Interner};
use serde::{Deserialize, Serialize};

/// A source position: the interned file name and a 1-based line number.
///
/// The parser resolves byte offsets to lines before handing the tree over,
/// so elaboration only ever needs the file and line for diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Loc {
    /// The interned source file name.
    pub file: Ident,
    /// The 1-based line number; 0 for synthesized nodes.
    pub line: u32,
}

impl Loc {
    /// A placeholder location for compiler-synthesized nodes.
    pub const DUMMY: Loc = Loc {
        file: Ident::DUMMY,
        line: 0,
    };

    /// Creates a location in the given file at the given line.
    pub fn new(file: Ident, line: u32) -> Self {
        Self { file, line }
    }

    /// Returns `true` if this is the placeholder location.
    pub fn is_dummy(&self) -> bool {
        self.file == Ident::DUMMY
    }

    /// Formats the location as `file:line`, or `<internal>` for [`Loc::DUMMY`].
    pub fn display(&self, interner: &Interner) -> String {
        if self.is_dummy() {
            "<internal>".to_string()
        } else {
            format!("{}:{}", interner.resolve(self.file), self.line)
        }
    }
}
