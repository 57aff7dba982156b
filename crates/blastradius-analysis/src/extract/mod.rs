//! Symbol extraction: walk a parsed file and emit one record per named
//! declaration.
//!
//! Extraction rules: top-level functions (implementations only, overload
//! signatures skipped), classes plus their owned methods and properties
//! (qualified `Class.member`), interfaces, type aliases, enums, variable
//! declarators, and namespace contents under a dotted prefix. Anonymous
//! declarations are not indexed.

pub mod signature;

use tree_sitter::Node;

use blastradius_core::types::symbol::{Symbol, SymbolId, SymbolKind};

use crate::parser::ParsedFile;
use signature::{
    callable_surface, canonicalize_type, class_surface, enum_surface, hash_signature,
    interface_surface,
};

/// Extract the ordered symbol records of `file`.
pub fn extract_symbols(file: &ParsedFile) -> Vec<Symbol> {
    let mut extractor = Extractor {
        file,
        symbols: Vec::new(),
    };
    extractor.visit_container(file.root(), "", false);
    extractor.symbols
}

struct Extractor<'a> {
    file: &'a ParsedFile,
    symbols: Vec<Symbol>,
}

impl<'a> Extractor<'a> {
    fn visit_container(&mut self, container: Node<'a>, prefix: &str, exported: bool) {
        let mut cursor = container.walk();
        for statement in container.named_children(&mut cursor) {
            self.visit_statement(statement, prefix, exported);
        }
    }

    fn visit_statement(&mut self, node: Node<'a>, prefix: &str, exported: bool) {
        match node.kind() {
            "export_statement" => {
                if let Some(decl) = node.child_by_field_name("declaration") {
                    self.visit_statement(decl, prefix, true);
                }
            }
            "function_declaration" | "generator_function_declaration" => {
                self.function(node, prefix, exported);
            }
            // Overload signatures carry no body; only the implementation is
            // indexed.
            "function_signature" => {}
            "class_declaration" | "abstract_class_declaration" => {
                self.class(node, prefix, exported);
            }
            "interface_declaration" => self.interface(node, prefix, exported),
            "type_alias_declaration" => self.type_alias(node, prefix, exported),
            "enum_declaration" => self.enumeration(node, prefix, exported),
            "lexical_declaration" | "variable_declaration" => {
                self.variable_statement(node, prefix, exported);
            }
            "internal_module" | "module" => self.namespace(node, prefix, exported),
            "ambient_declaration" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.visit_statement(child, prefix, exported);
                }
            }
            _ => {}
        }
    }

    fn function(&mut self, node: Node<'a>, prefix: &str, exported: bool) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.file.slice(name_node).to_string();
        let surface = self.callable_surface_of(node);
        self.push(node, &name, prefix, SymbolKind::Function, exported, None, &surface);
    }

    fn class(&mut self, node: Node<'a>, prefix: &str, exported: bool) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.file.slice(name_node).to_string();

        // Heritage clauses live in a direct `class_heritage` child; searching
        // the whole subtree would pick up nested class expressions.
        let heritage = direct_child(node, "class_heritage");
        let base = heritage
            .and_then(|h| direct_child(h, "extends_clause"))
            .and_then(|c| c.named_child(0))
            .map(|n| self.file.slice(n).to_string());
        let implements: Vec<String> = heritage
            .and_then(|h| direct_child(h, "implements_clause"))
            .map(|clause| {
                let mut cursor = clause.walk();
                clause
                    .named_children(&mut cursor)
                    .map(|n| self.file.slice(n).to_string())
                    .collect()
            })
            .unwrap_or_default();

        let surface = class_surface(base.as_deref(), &implements);
        let class_id = self.push(node, &name, prefix, SymbolKind::Class, exported, None, &surface);

        let qualified = join_qualified(prefix, &name);
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                self.class_member(member, &qualified, exported, &class_id);
            }
        }
    }

    fn class_member(
        &mut self,
        member: Node<'a>,
        class_qualified: &str,
        exported: bool,
        class_id: &SymbolId,
    ) {
        match member.kind() {
            "method_definition" => {
                let Some(name_node) = member.child_by_field_name("name") else {
                    return;
                };
                if name_node.kind() == "computed_property_name" {
                    return;
                }
                let name = self.file.slice(name_node).to_string();
                // Constructor bodies belong to the class symbol itself.
                if name == "constructor" {
                    return;
                }
                let surface = self.callable_surface_of(member);
                self.push(
                    member,
                    &name,
                    class_qualified,
                    SymbolKind::Method,
                    exported,
                    Some(class_id.clone()),
                    &surface,
                );
            }
            "public_field_definition" => {
                let Some(name_node) = member.child_by_field_name("name") else {
                    return;
                };
                if name_node.kind() == "computed_property_name" {
                    return;
                }
                let name = self.file.slice(name_node).to_string();
                let surface = self.value_surface(member);
                self.push(
                    member,
                    &name,
                    class_qualified,
                    SymbolKind::Property,
                    exported,
                    Some(class_id.clone()),
                    &surface,
                );
            }
            // Method overload signatures and abstract signatures carry no
            // implementation.
            "method_signature" | "abstract_method_signature" => {}
            _ => {}
        }
    }

    fn interface(&mut self, node: Node<'a>, prefix: &str, exported: bool) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.file.slice(name_node).to_string();
        let members: Vec<String> = node
            .child_by_field_name("body")
            .map(|body| {
                let mut cursor = body.walk();
                body.named_children(&mut cursor)
                    .map(|m| self.file.slice(m).to_string())
                    .collect()
            })
            .unwrap_or_default();
        let surface = interface_surface(&members);
        self.push(node, &name, prefix, SymbolKind::Interface, exported, None, &surface);
    }

    fn type_alias(&mut self, node: Node<'a>, prefix: &str, exported: bool) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.file.slice(name_node).to_string();
        let surface = node
            .child_by_field_name("value")
            .map(|v| canonicalize_type(self.file.slice(v)))
            .unwrap_or_default();
        self.push(node, &name, prefix, SymbolKind::TypeAlias, exported, None, &surface);
    }

    fn enumeration(&mut self, node: Node<'a>, prefix: &str, exported: bool) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.file.slice(name_node).to_string();
        let mut members: Vec<(String, String)> = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for (ordinal, member) in body.named_children(&mut cursor).enumerate() {
                match member.kind() {
                    "enum_assignment" => {
                        let member_name = member
                            .child_by_field_name("name")
                            .map(|n| self.file.slice(n).to_string())
                            .unwrap_or_default();
                        let value = member
                            .child_by_field_name("value")
                            .map(|v| self.file.slice(v).to_string())
                            .unwrap_or_default();
                        members.push((member_name, value));
                    }
                    "property_identifier" => {
                        members.push((self.file.slice(member).to_string(), ordinal.to_string()));
                    }
                    _ => {}
                }
            }
        }
        let surface = enum_surface(&members);
        self.push(node, &name, prefix, SymbolKind::Enum, exported, None, &surface);
    }

    fn variable_statement(&mut self, node: Node<'a>, prefix: &str, exported: bool) {
        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            // Destructuring patterns carry no single stable name.
            if name_node.kind() != "identifier" {
                continue;
            }
            let name = self.file.slice(name_node).to_string();
            let surface = self.value_surface(declarator);
            self.push(
                declarator,
                &name,
                prefix,
                SymbolKind::Variable,
                exported,
                None,
                &surface,
            );
        }
    }

    fn namespace(&mut self, node: Node<'a>, prefix: &str, exported: bool) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        // `namespace A.B` yields a dotted name; use it verbatim as prefix.
        let name = self.file.slice(name_node).to_string();
        let qualified = join_qualified(prefix, &name);
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_container(body, &qualified, exported);
        }
    }

    /// Signature surface for a declarator or field: the declared type when
    /// annotated, a callable surface for function-valued initializers, the
    /// canonicalized initializer text otherwise.
    fn value_surface(&self, node: Node<'a>) -> String {
        if let Some(annotation) = node.child_by_field_name("type") {
            return canonicalize_type(&self.annotation_text(annotation));
        }
        match node.child_by_field_name("value") {
            Some(value) if matches!(value.kind(), "arrow_function" | "function_expression") => {
                self.callable_surface_of(value)
            }
            Some(value) => canonicalize_type(self.file.slice(value)),
            None => String::new(),
        }
    }

    /// Build `(name:type,...):ret` for any function-like node.
    fn callable_surface_of(&self, node: Node<'a>) -> String {
        let mut params: Vec<(String, String)> = Vec::new();

        if let Some(list) = node.child_by_field_name("parameters") {
            let mut cursor = list.walk();
            for param in list.named_children(&mut cursor) {
                if !matches!(
                    param.kind(),
                    "required_parameter" | "optional_parameter" | "rest_parameter"
                ) {
                    continue;
                }
                let name = param
                    .child_by_field_name("pattern")
                    .map(|p| self.file.slice(p).to_string())
                    .unwrap_or_default();
                let ty = param
                    .child_by_field_name("type")
                    .map(|a| self.annotation_text(a))
                    .unwrap_or_else(|| "any".to_string());
                params.push((name, ty));
            }
        } else if let Some(single) = node.child_by_field_name("parameter") {
            // Unparenthesized single arrow parameter.
            params.push((self.file.slice(single).to_string(), "any".to_string()));
        }

        let return_type = node
            .child_by_field_name("return_type")
            .map(|a| self.annotation_text(a))
            .unwrap_or_else(|| "any".to_string());

        callable_surface(&params, &return_type)
    }

    /// The type inside a `type_annotation` node (drops the leading colon).
    fn annotation_text(&self, annotation: Node<'a>) -> String {
        annotation
            .named_child(0)
            .map(|t| self.file.slice(t).to_string())
            .unwrap_or_else(|| self.file.slice(annotation).trim_start_matches(':').trim().to_string())
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        node: Node<'a>,
        name: &str,
        prefix: &str,
        kind: SymbolKind,
        exported: bool,
        parent_id: Option<SymbolId>,
        surface: &str,
    ) -> SymbolId {
        let qualified = join_qualified(prefix, name);
        let id = SymbolId::new(self.file.path(), &qualified);
        self.symbols.push(Symbol {
            id: id.clone(),
            name: name.to_string(),
            qualified_name: qualified,
            kind,
            file_path: self.file.path().to_string(),
            start_line: node.start_position().row as u32 + 1,
            end_line: node.end_position().row as u32 + 1,
            start_offset: node.start_byte() as u32,
            end_offset: (node.end_byte() as u32).saturating_sub(1),
            is_exported: exported,
            parent_id,
            signature_hash: hash_signature(surface),
        });
        id
    }
}

fn join_qualified(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// First direct child of `kind`, named or not.
fn direct_child<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let result = node.children(&mut cursor).find(|c| c.kind() == kind);
    result
}
