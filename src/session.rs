//! State shared by every compilation unit of one build.
//!
//! The session is passed explicitly (as `Rc<Session>`) from the driver into
//! each parser and analyzer, including the nested ones created for imports.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    rc::Rc,
};

use tracing::trace;

use crate::{
    ast::types::Type,
    config::CompilerConfig,
    semantic::modules::{FileLoader, SourceLoader},
};

/// Hands out build-unique ids for programs and struct/union types.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    next: Rc<Cell<u64>>,
}

impl IdGenerator {
    pub fn new() -> Self {
        IdGenerator::default()
    }

    pub fn next_id(&self) -> u64 {
        let id = self.next.get();
        self.next.set(id + 1);
        id
    }

    pub fn next_program_id(&self) -> String {
        self.next_id().to_string()
    }
}

pub struct Session {
    pub config: CompilerConfig,
    pub ids: IdGenerator,
    loader: Box<dyn SourceLoader>,
    importing: RefCell<Vec<PathBuf>>,
    types: RefCell<HashMap<String, Type>>,
}

impl Session {
    pub fn new(config: CompilerConfig, loader: Box<dyn SourceLoader>) -> Self {
        Session {
            config,
            ids: IdGenerator::new(),
            loader,
            importing: RefCell::new(vec![]),
            types: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_filesystem(config: CompilerConfig) -> Self {
        Session::new(config, Box::new(FileLoader))
    }

    pub fn load(&self, path: &Path) -> io::Result<String> {
        self.loader.load(path)
    }

    /// Marks `path` as being compiled. Returns false if it already is,
    /// which means the import graph has a cycle.
    pub fn begin_import(&self, path: &Path) -> bool {
        let mut importing = self.importing.borrow_mut();
        if importing.iter().any(|p| p == path) {
            return false;
        }

        trace!(path = %path.display(), depth = importing.len(), "begin import");
        importing.push(path.to_path_buf());
        true
    }

    pub fn end_import(&self, path: &Path) {
        let mut importing = self.importing.borrow_mut();
        if let Some(index) = importing.iter().rposition(|p| p == path) {
            importing.remove(index);
        }
    }

    /// The chain of files currently being compiled, outermost first.
    pub fn import_chain(&self) -> Vec<PathBuf> {
        self.importing.borrow().clone()
    }

    pub fn register_type(&self, qualified_name: &str, ty: Type) {
        self.types
            .borrow_mut()
            .insert(qualified_name.to_string(), ty);
    }

    pub fn registered_type(&self, qualified_name: &str) -> Option<Type> {
        self.types.borrow().get(qualified_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::{
        ast::types::Type,
        config::CompilerConfig,
        semantic::modules::MemoryLoader,
    };

    use super::{IdGenerator, Session};

    #[test]
    fn test_ids_are_unique_across_clones() {
        let ids = IdGenerator::new();
        let other = ids.clone();

        let first = ids.next_id();
        let second = other.next_id();
        assert_ne!(first, second);
        assert_ne!(ids.next_program_id(), other.next_program_id());
    }

    #[test]
    fn test_import_stack_detects_reentry() {
        let session = Session::new(CompilerConfig::default(), Box::new(MemoryLoader::new()));
        let a = Path::new("a.cd");
        let b = Path::new("b.cd");

        assert!(session.begin_import(a));
        assert!(session.begin_import(b));
        assert!(!session.begin_import(a));
        assert_eq!(session.import_chain().len(), 2);

        session.end_import(b);
        session.end_import(a);
        assert!(session.import_chain().is_empty());
        assert!(session.begin_import(a));
    }

    #[test]
    fn test_type_registry() {
        let session = Session::new(CompilerConfig::default(), Box::new(MemoryLoader::new()));
        session.register_type("Point-1", Type::Integer(32));

        assert_eq!(session.registered_type("Point-1"), Some(Type::Integer(32)));
        assert_eq!(session.registered_type("Point-2"), None);
    }
}
