use std::collections::HashMap;

enum UndoRecord<T> {
    Frame,
    Binding {
        name: String,
        previous: Option<(T, usize)>,
    },
}

/// Name to value bindings with lexical frames.
///
/// Entering a frame pushes a sentinel onto the undo stack. Every binding
/// pushes the value it shadowed, so leaving a frame restores the outer scope
/// exactly by replaying undo records back to the sentinel.
pub struct SymbolTable<T> {
    values: HashMap<String, (T, usize)>,
    undo: Vec<UndoRecord<T>>,
    frames: usize,
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        SymbolTable {
            values: HashMap::new(),
            undo: vec![],
            frames: 0,
        }
    }
}

impl<T> SymbolTable<T> {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: T) {
        let name = name.into();
        let previous = self.values.insert(name.clone(), (value, self.frames));
        self.undo.push(UndoRecord::Binding { name, previous });
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.values.get(name).map(|(value, _)| value)
    }

    /// Depth of the frame the visible binding of `name` was made in. Zero is
    /// the outermost scope.
    pub fn depth_of(&self, name: &str) -> Option<usize> {
        self.values.get(name).map(|(_, depth)| *depth)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn enter_frame(&mut self) {
        self.undo.push(UndoRecord::Frame);
        self.frames += 1;
    }

    /// Drops every binding made since the matching [`enter_frame`](Self::enter_frame).
    ///
    /// # Panics
    ///
    /// If no frame is open.
    pub fn leave_frame(&mut self) {
        loop {
            match self.undo.pop() {
                Some(UndoRecord::Frame) => {
                    self.frames -= 1;
                    return;
                }
                Some(UndoRecord::Binding { name, previous }) => match previous {
                    Some(value) => {
                        self.values.insert(name, value);
                    }
                    None => {
                        self.values.remove(&name);
                    }
                },
                None => panic!("leave_frame called without a matching enter_frame"),
            }
        }
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames
    }
}
