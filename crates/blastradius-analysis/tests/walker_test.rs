//! Reference walking over multi-file fixtures, without touching disk.

use blastradius_analysis::extract::extract_symbols;
use blastradius_analysis::graph::DependencyGraph;
use blastradius_analysis::parser::TsParser;
use blastradius_analysis::walker::walk_references;
use blastradius_core::types::symbol::{SymbolId, SymbolIndex};

/// Parse and index every fixture file, then walk them all.
fn build(files: &[(&str, &str)]) -> (SymbolIndex, DependencyGraph) {
    let mut parser = TsParser::new().unwrap();
    let mut index = SymbolIndex::new();
    let mut parsed = Vec::new();

    for (path, text) in files {
        let file = parser.parse(path, text.to_string()).unwrap();
        for symbol in extract_symbols(&file) {
            index.insert(symbol);
        }
        parsed.push(file);
    }

    let mut graph = DependencyGraph::new();
    for file in &parsed {
        walk_references(file, &index, &mut graph);
    }
    (index, graph)
}

fn id(path: &str, name: &str) -> SymbolId {
    SymbolId::new(path, name)
}

fn has_edge(graph: &DependencyGraph, src: &SymbolId, tgt: &SymbolId) -> bool {
    graph.dependencies(src).is_some_and(|deps| deps.contains(tgt))
}

#[test]
fn same_file_calls_produce_edges() {
    let (_, graph) = build(&[(
        "/p/a.ts",
        r#"
function helper(): number { return 1; }
export function entry(): number { return helper(); }
"#,
    )]);
    assert!(has_edge(&graph, &id("/p/a.ts", "entry"), &id("/p/a.ts", "helper")));
    assert!(graph.is_mirrored());
}

#[test]
fn named_imports_resolve_across_files() {
    let (_, graph) = build(&[
        ("/p/util.ts", "export function log(msg: string): void {}"),
        (
            "/p/app.ts",
            r#"
import { log } from "./util";
export function run(): void { log("go"); }
"#,
        ),
    ]);
    assert!(has_edge(&graph, &id("/p/app.ts", "run"), &id("/p/util.ts", "log")));
}

#[test]
fn namespace_imports_resolve_member_access() {
    let (_, graph) = build(&[
        ("/p/util.ts", "export function log(msg: string): void {}"),
        (
            "/p/app.ts",
            r#"
import * as util from "./util";
export function run(): void { util.log("go"); }
"#,
        ),
    ]);
    assert!(has_edge(&graph, &id("/p/app.ts", "run"), &id("/p/util.ts", "log")));
}

#[test]
fn bare_specifiers_are_excluded() {
    let (_, graph) = build(&[(
        "/p/app.ts",
        r#"
import { useState } from "react";
export function run(): void { useState(); }
"#,
    )]);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn constructor_bodies_attribute_to_the_class() {
    let (_, graph) = build(&[(
        "/p/svc.ts",
        r#"
function setup(): void {}
export class Service {
    constructor() { setup(); }
}
"#,
    )]);
    assert!(has_edge(
        &graph,
        &id("/p/svc.ts", "Service"),
        &id("/p/svc.ts", "setup")
    ));
}

#[test]
fn method_bodies_attribute_to_the_method() {
    let (_, graph) = build(&[(
        "/p/svc.ts",
        r#"
function setup(): void {}
export class Service {
    start(): void { setup(); }
}
"#,
    )]);
    assert!(has_edge(
        &graph,
        &id("/p/svc.ts", "Service.start"),
        &id("/p/svc.ts", "setup")
    ));
}

#[test]
fn heritage_clauses_produce_type_edges() {
    let (_, graph) = build(&[(
        "/p/types.ts",
        r#"
export interface Closeable { close(): void; }
export class File implements Closeable { close(): void {} }
"#,
    )]);
    assert!(has_edge(
        &graph,
        &id("/p/types.ts", "File"),
        &id("/p/types.ts", "Closeable")
    ));
}

#[test]
fn type_aliases_reference_their_constituents() {
    let (_, graph) = build(&[(
        "/p/types.ts",
        r#"
export interface Ok { value: string; }
export interface Err { message: string; }
export type Outcome = Ok | Err;
"#,
    )]);
    assert!(has_edge(&graph, &id("/p/types.ts", "Outcome"), &id("/p/types.ts", "Ok")));
    assert!(has_edge(&graph, &id("/p/types.ts", "Outcome"), &id("/p/types.ts", "Err")));
}

#[test]
fn arrow_bound_variables_own_their_bodies() {
    let (_, graph) = build(&[(
        "/p/fns.ts",
        r#"
export function base(): number { return 1; }
export const doubled = (): number => base() * 2;
"#,
    )]);
    assert!(has_edge(&graph, &id("/p/fns.ts", "doubled"), &id("/p/fns.ts", "base")));
}

#[test]
fn anonymous_callbacks_attribute_to_the_enclosing_owner() {
    let (_, graph) = build(&[(
        "/p/cb.ts",
        r#"
export function target(): void {}
export function outer(items: number[]): void {
    items.forEach(() => { target(); });
}
"#,
    )]);
    assert!(has_edge(&graph, &id("/p/cb.ts", "outer"), &id("/p/cb.ts", "target")));
}

#[test]
fn self_references_are_suppressed() {
    let (_, graph) = build(&[(
        "/p/rec.ts",
        "export function fact(n: number): number { return n <= 1 ? 1 : n * fact(n - 1); }",
    )]);
    assert!(graph.dependencies(&id("/p/rec.ts", "fact")).is_none());
}

#[test]
fn static_member_access_links_the_member() {
    let (_, graph) = build(&[(
        "/p/reg.ts",
        r#"
export class Registry {
    static lookup(key: string): string { return key; }
}
export function find(key: string): string { return Registry.lookup(key); }
"#,
    )]);
    let find_id = id("/p/reg.ts", "find");
    assert!(has_edge(&graph, &find_id, &id("/p/reg.ts", "Registry")));
    assert!(has_edge(&graph, &find_id, &id("/p/reg.ts", "Registry.lookup")));
}

#[test]
fn rewalk_of_unchanged_content_is_idempotent() {
    let files = [
        ("/p/util.ts", "export function log(msg: string): void {}"),
        (
            "/p/app.ts",
            "import { log } from \"./util\";\nexport function run(): void { log(\"go\"); }\n",
        ),
    ];
    let (mut index, mut graph) = build(&files);
    let before = graph.to_data();

    // Evict app.ts, then re-extract and re-walk the same content.
    graph.evict_file("/p/app.ts", &mut index);
    let mut parser = TsParser::new().unwrap();
    let file = parser.parse("/p/app.ts", files[1].1.to_string()).unwrap();
    for symbol in extract_symbols(&file) {
        index.insert(symbol);
    }
    walk_references(&file, &index, &mut graph);

    assert_eq!(graph.to_data(), before);
}
