//! Named definitions and `$ref` bookkeeping.
//!
//! The table is built in two passes before any code is generated:
//! - pre-scan: register the root's `definitions` then `$defs` under their
//!   JSON pointers, with sanitized, de-duplicated names;
//! - cycle detection: DFS over pointers (not live object references) that
//!   flags every member of a `$ref` cycle as recursive.
//!
//! Generation then mutates entries in place (`processing`, `recursive`,
//! the memoized result) through [`crate::compile::Compiler`].
use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::ident::{sanitize_identifier, NameAllocator};
use crate::ir::ParseResult;
use crate::schema::{classify, classify_type, Items, Schema, SchemaObject, Shape, TypeTag};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug)]
pub struct RefEntry<'s> {
    /// `#/definitions/<key>` or `#/$defs/<key>`.
    pub pointer: String,
    pub schema: &'s Schema,
    /// Sanitized name; doubles as the type name of a recursive entry.
    pub name: String,
    /// Validator binding: `name`, or a `…Schema` name once recursive.
    pub binding: String,
    /// Set while this entry's code is being generated.
    pub processing: bool,
    pub recursive: bool,
    pub generated: Option<ParseResult>,
}

#[derive(Debug, Default)]
pub struct RefTable<'s> {
    entries: Vec<RefEntry<'s>>,
    by_pointer: IndexMap<String, usize>,
    names: NameAllocator,
    /// Entry indices in generation-completion order.
    completed: Vec<usize>,
}

// ————————————————————————————————————————————————————————————————————————————
// BUILD
// ————————————————————————————————————————————————————————————————————————————

impl<'s> RefTable<'s> {
    /// Pre-scan plus cycle detection. `reserved` names are never given to a
    /// definition.
    pub fn build(root: &'s Schema, reserved: &[&str]) -> Self {
        let mut table = Self::prescan(root, reserved);
        table.detect_cycles();
        table
    }

    /// Register the root's named definitions. Nested `definitions` are not
    /// addressable.
    pub fn prescan(root: &'s Schema, reserved: &[&str]) -> Self {
        let mut table = RefTable { names: NameAllocator::new(reserved.iter().copied()), ..Self::default() };
        let Some(obj) = root.as_object() else { return table };
        for (section, defs) in [("definitions", &obj.definitions), ("$defs", &obj.defs)] {
            for (key, schema) in defs.iter().flatten() {
                table.register(format!("#/{section}/{}", escape_pointer_token(key)), key, schema);
            }
        }
        table
    }

    fn register(&mut self, pointer: String, key: &str, schema: &'s Schema) {
        let name = self.names.allocate(&sanitize_identifier(key));
        debug!(%pointer, %name, "registered definition");
        self.by_pointer.insert(pointer.clone(), self.entries.len());
        self.entries.push(RefEntry {
            pointer,
            schema,
            binding: name.clone(),
            name,
            processing: false,
            recursive: false,
            generated: None,
        });
    }

    /// Flag every entry that sits on a `$ref` cycle.
    pub fn detect_cycles(&mut self) {
        let mut visited = HashSet::new();
        let mut on_path = Vec::new();
        let mut cyclic = BTreeSet::new();
        for idx in 0..self.entries.len() {
            if !visited.contains(&idx) {
                self.walk(idx, &mut visited, &mut on_path, &mut cyclic);
            }
        }
        for idx in cyclic {
            self.mark_recursive(idx);
        }
    }

    fn walk(&self, idx: usize, visited: &mut HashSet<usize>, on_path: &mut Vec<usize>, cyclic: &mut BTreeSet<usize>) {
        on_path.push(idx);
        let mut pointers = Vec::new();
        collect_refs(self.entries[idx].schema, &mut pointers);
        for pointer in pointers {
            let Some(&target) = self.by_pointer.get(pointer) else { continue };
            if let Some(pos) = on_path.iter().position(|&i| i == target) {
                cyclic.extend(on_path[pos..].iter().copied());
            } else if !visited.contains(&target) {
                self.walk(target, visited, on_path, cyclic);
            }
        }
        on_path.pop();
        visited.insert(idx);
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ACCESS
// ————————————————————————————————————————————————————————————————————————————

impl<'s> RefTable<'s> {
    pub fn lookup(&self, pointer: &str) -> Option<usize> {
        self.by_pointer.get(pointer).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, idx: usize) -> &RefEntry<'s> {
        &self.entries[idx]
    }

    pub fn get(&self, pointer: &str) -> Option<&RefEntry<'s>> {
        self.lookup(pointer).map(|idx| &self.entries[idx])
    }

    /// Flag an entry recursive and give it its own `…Schema` binding.
    pub fn mark_recursive(&mut self, idx: usize) {
        let entry = &mut self.entries[idx];
        if entry.recursive {
            return;
        }
        entry.recursive = true;
        entry.binding = self.names.allocate(&format!("{}Schema", entry.name));
        debug!(pointer = %entry.pointer, binding = %entry.binding, "definition is recursive");
    }

    pub fn begin(&mut self, idx: usize) {
        self.entries[idx].processing = true;
    }

    /// Store generated code and record completion order.
    pub fn finish(&mut self, idx: usize, result: ParseResult) {
        let entry = &mut self.entries[idx];
        entry.processing = false;
        entry.generated = Some(result);
        self.completed.push(idx);
    }

    /// Generated entries, dependencies before dependents.
    pub fn completed(&self) -> impl Iterator<Item = &RefEntry<'s>> {
        self.completed.iter().map(|&idx| &self.entries[idx])
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Collect the `$ref`s the dispatcher would actually follow from `schema`,
/// honoring the same keyword precedence.
fn collect_refs<'a>(schema: &'a Schema, out: &mut Vec<&'a str>) {
    collect_shape_refs(classify(schema), out);
}

fn collect_shape_refs<'a>(shape: Shape<'a>, out: &mut Vec<&'a str>) {
    match shape {
        Shape::Reference(pointer) => out.push(pointer),
        Shape::AllOf(xs) | Shape::AnyOf(xs) | Shape::OneOf(xs) => {
            for x in xs {
                collect_refs(x, out);
            }
        }
        Shape::Not(obj) => {
            if let Some(not) = &obj.not {
                collect_refs(not, out);
            }
        }
        Shape::Nullable(obj) => collect_shape_refs(classify_type(obj), out),
        Shape::Typed(obj, tag) => collect_tag_refs(obj, tag, out),
        Shape::TypeUnion(obj, tags) => {
            for tag in tags {
                collect_tag_refs(obj, tag, out);
            }
        }
        Shape::Boolean(_) | Shape::Const(_) | Shape::Enum(_) | Shape::Untyped => {}
    }
}

fn collect_tag_refs<'a>(obj: &'a SchemaObject, tag: &TypeTag, out: &mut Vec<&'a str>) {
    match tag {
        TypeTag::Object => {
            for prop in obj.properties.iter().flat_map(|p| p.values()) {
                collect_refs(prop, out);
            }
            if let Some(extra) = &obj.additional_properties {
                collect_refs(extra, out);
            }
        }
        TypeTag::Array => match &obj.items {
            Some(Items::Single(item)) => collect_refs(item, out),
            Some(Items::Tuple(items)) => {
                if let Some(first) = items.first() {
                    collect_refs(first, out);
                }
            }
            None => {}
        },
        _ => {}
    }
}

/// RFC 6901 token escaping.
fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
