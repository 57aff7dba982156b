//! Reference walker: pre-order AST traversal with an owner stack.
//!
//! Every identifier use (not binding site) is resolved against the file's
//! local declarations and its import table; each hit adds a forward edge
//! from the innermost enclosing owner. Constructor bodies attribute to the
//! class symbol; arrow functions only own their body when directly bound to
//! a named variable; anonymous callbacks fall through to the enclosing
//! owner. Running the walker on one file produces only edges whose source
//! lies in that file.

pub mod imports;

use tracing::debug;
use tree_sitter::Node;

use blastradius_core::types::collections::{FxHashMap, FxHashSet};
use blastradius_core::types::symbol::{SymbolId, SymbolIndex, SymbolKind};

use crate::graph::DependencyGraph;
use crate::parser::{is_in_error, ParsedFile};
use imports::{build_import_table, ImportBinding, ImportTable};

/// Walk `file` and record its outgoing references into `graph`.
/// Returns the number of new edges.
pub fn walk_references(
    file: &ParsedFile,
    index: &SymbolIndex,
    graph: &mut DependencyGraph,
) -> u32 {
    let known_files: FxHashSet<String> = index
        .file_paths()
        .into_iter()
        .chain(std::iter::once(file.path().to_string()))
        .collect();

    let locals: FxHashMap<String, SymbolId> = index
        .symbols_in_file(file.path())
        .map(|s| (s.qualified_name.clone(), s.id.clone()))
        .collect();

    let mut walker = Walker {
        file,
        index,
        graph,
        imports: build_import_table(file, &known_files),
        locals,
        owner_stack: Vec::new(),
        class_stack: Vec::new(),
        namespace_prefix: Vec::new(),
        edges_added: 0,
    };
    walker.visit(file.root());

    debug!(
        file = file.path(),
        edges = walker.edges_added,
        imports = walker.imports.len(),
        "reference walk complete"
    );
    walker.edges_added
}

struct Walker<'a> {
    file: &'a ParsedFile,
    index: &'a SymbolIndex,
    graph: &'a mut DependencyGraph,
    imports: ImportTable,
    locals: FxHashMap<String, SymbolId>,
    owner_stack: Vec<SymbolId>,
    class_stack: Vec<String>,
    namespace_prefix: Vec<String>,
    edges_added: u32,
}

impl<'a> Walker<'a> {
    fn visit(&mut self, node: Node<'a>) {
        match node.kind() {
            // Import bindings are handled by the import table; nothing in
            // an import statement is a use.
            "import_statement" => return,
            "identifier" | "type_identifier" => {
                self.reference(node);
                return;
            }
            _ => {}
        }

        let frame = self.enter(node);

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child);
        }

        if frame.owner {
            self.owner_stack.pop();
        }
        if frame.class {
            self.class_stack.pop();
        }
        if frame.namespace {
            self.namespace_prefix.pop();
        }
    }

    /// Push owner/class/namespace frames for declaration nodes.
    fn enter(&mut self, node: Node<'a>) -> Frame {
        let mut frame = Frame::default();
        match node.kind() {
            "function_declaration"
            | "generator_function_declaration"
            | "interface_declaration"
            | "type_alias_declaration"
            | "enum_declaration" => {
                if let Some(id) = self.declared_id(node) {
                    self.owner_stack.push(id);
                    frame.owner = true;
                }
            }
            "class_declaration" | "abstract_class_declaration" => {
                if let Some(id) = self.declared_id(node) {
                    self.class_stack.push(id.qualified_name().to_string());
                    self.owner_stack.push(id);
                    frame.owner = true;
                    frame.class = true;
                }
            }
            "method_definition" => {
                if let Some(id) = self.method_owner(node) {
                    self.owner_stack.push(id);
                    frame.owner = true;
                }
            }
            "public_field_definition" => {
                if let Some(id) = self.member_id(node) {
                    self.owner_stack.push(id);
                    frame.owner = true;
                }
            }
            "variable_declarator" => {
                if let Some(id) = self.declared_id(node) {
                    self.owner_stack.push(id);
                    frame.owner = true;
                }
            }
            "internal_module" | "module" => {
                if let Some(name_node) = node.child_by_field_name("name") {
                    self.namespace_prefix.push(self.file.slice(name_node).to_string());
                    frame.namespace = true;
                }
            }
            _ => {}
        }
        frame
    }

    /// Symbol id of a declaration node's name, qualified by the namespace
    /// prefix, when it is indexed.
    fn declared_id(&self, node: Node<'a>) -> Option<SymbolId> {
        let name_node = node.child_by_field_name("name")?;
        if !matches!(name_node.kind(), "identifier" | "type_identifier") {
            return None;
        }
        let name = self.file.slice(name_node);
        let qualified = self.qualify(name);
        self.locals.get(&qualified).cloned()
    }

    /// Owner of a method body: the method symbol, or the class symbol for
    /// constructors.
    fn method_owner(&self, node: Node<'a>) -> Option<SymbolId> {
        let class_qualified = self.class_stack.last()?;
        let name_node = node.child_by_field_name("name")?;
        let name = self.file.slice(name_node);
        if name == "constructor" {
            return self.locals.get(class_qualified).cloned();
        }
        self.locals.get(&format!("{class_qualified}.{name}")).cloned()
    }

    fn member_id(&self, node: Node<'a>) -> Option<SymbolId> {
        let class_qualified = self.class_stack.last()?;
        let name_node = node.child_by_field_name("name")?;
        let name = self.file.slice(name_node);
        self.locals.get(&format!("{class_qualified}.{name}")).cloned()
    }

    fn qualify(&self, name: &str) -> String {
        if self.namespace_prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.namespace_prefix.join("."), name)
        }
    }

    /// Handle one identifier use: resolve and record the edge.
    fn reference(&mut self, node: Node<'a>) {
        let Some(owner) = self.owner_stack.last().cloned() else {
            return;
        };
        if self.is_binding_site(node) || is_in_error(&node) {
            return;
        }

        let name = self.file.slice(node);
        if name.is_empty() {
            return;
        }

        if let Some(target) = self.resolve(name) {
            if self.graph.add_edge(&owner, &target) {
                self.edges_added += 1;
            }
            // `Foo.bar` where Foo resolved to an indexed container: try the
            // qualified member too.
            if let Some(member) = self.member_access_target(node, &target) {
                if self.graph.add_edge(&owner, &member) {
                    self.edges_added += 1;
                }
            }
        } else if let Some(member) = self.namespace_member_target(node, name) {
            if self.graph.add_edge(&owner, &member) {
                self.edges_added += 1;
            }
        }
    }

    /// An identifier occupying its parent's declaration-name slot is a
    /// binding site, not a use.
    fn is_binding_site(&self, node: Node<'a>) -> bool {
        let Some(parent) = node.parent() else {
            return false;
        };
        for field in ["name", "pattern", "alias"] {
            if parent
                .child_by_field_name(field)
                .is_some_and(|n| n.id() == node.id())
            {
                return true;
            }
        }
        false
    }

    /// Resolve a plain name: namespace-qualified locals innermost-first,
    /// then bare locals, then named imports.
    fn resolve(&self, name: &str) -> Option<SymbolId> {
        for depth in (0..=self.namespace_prefix.len()).rev() {
            let candidate = if depth == 0 {
                name.to_string()
            } else {
                format!("{}.{}", self.namespace_prefix[..depth].join("."), name)
            };
            if let Some(id) = self.locals.get(&candidate) {
                return Some(id.clone());
            }
        }

        match self.imports.get(name) {
            Some(ImportBinding::Named { file, exported }) => {
                let id = SymbolId::new(file, exported);
                self.index.contains(&id).then_some(id)
            }
            _ => None,
        }
    }

    /// For `obj.prop` where `obj` resolved to `container`, the indexed
    /// `container.prop` member, if any.
    fn member_access_target(&self, node: Node<'a>, container: &SymbolId) -> Option<SymbolId> {
        let prop = self.property_of_member_access(node)?;
        let container_symbol = self.index.get(container)?;
        if !matches!(container_symbol.kind, SymbolKind::Class | SymbolKind::Enum) {
            return None;
        }
        let member = SymbolId::new(
            &container_symbol.file_path,
            &format!("{}.{prop}", container_symbol.qualified_name),
        );
        self.index.contains(&member).then_some(member)
    }

    /// For `ns.prop` where `ns` is a namespace import, the target file's
    /// `prop` symbol, if indexed.
    fn namespace_member_target(&self, node: Node<'a>, name: &str) -> Option<SymbolId> {
        let ImportBinding::Namespace { file } = self.imports.get(name)? else {
            return None;
        };
        let prop = self.property_of_member_access(node)?;
        let id = SymbolId::new(file, &prop);
        self.index.contains(&id).then_some(id)
    }

    fn property_of_member_access(&self, node: Node<'a>) -> Option<String> {
        let parent = node.parent()?;
        if parent.kind() != "member_expression" {
            return None;
        }
        let object = parent.child_by_field_name("object")?;
        if object.id() != node.id() {
            return None;
        }
        let property = parent.child_by_field_name("property")?;
        Some(self.file.slice(property).to_string())
    }
}

#[derive(Debug, Default)]
struct Frame {
    owner: bool,
    class: bool,
    namespace: bool,
}
