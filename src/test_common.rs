#![cfg(test)]

use crate::source::Source;
use maplit::hashmap;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;

/// An in-memory [Source] that counts how often it is read.
pub struct TestSource {
    definitions: RefCell<HashMap<String, String>>,
    failures: HashMap<String, io::ErrorKind>,
    reads: Cell<usize>,
}

impl TestSource {
    pub fn new() -> Self {
        Self {
            definitions: RefCell::new(hashmap! {
                "browser".to_string() => r#"{
                    "document": false,
                    "navigator": false,
                    "window": false
                }"#.to_string(),
                "node".to_string() => r#"{
                    "__dirname": false,
                    "process": false,
                    "require": false
                }"#.to_string(),
            }),
            failures: HashMap::new(),
            reads: Cell::new(0),
        }
    }

    /// Reads of `environment` fail with an error of `kind`.
    pub fn fail_with(mut self, environment: &str, kind: io::ErrorKind) -> Self {
        self.failures.insert(environment.to_string(), kind);
        self
    }

    pub fn define(&self, environment: &str, content: &str) {
        self.definitions
            .borrow_mut()
            .insert(environment.to_string(), content.to_string());
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl Source for TestSource {
    fn read(&self, environment: &str) -> io::Result<String> {
        self.reads.set(self.reads.get() + 1);

        if let Some(kind) = self.failures.get(environment) {
            return Err(io::Error::new(*kind, format!("cannot read {}", environment)));
        }

        self.definitions
            .borrow()
            .get(environment)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, environment.to_string()))
    }
}
