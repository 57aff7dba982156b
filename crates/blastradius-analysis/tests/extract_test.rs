//! Extraction rules over real TypeScript sources.

use blastradius_analysis::extract::extract_symbols;
use blastradius_analysis::parser::TsParser;
use blastradius_core::types::symbol::{Symbol, SymbolKind};

fn extract(source: &str) -> Vec<Symbol> {
    let mut parser = TsParser::new().unwrap();
    let parsed = parser.parse("/proj/src/mod.ts", source.to_string()).unwrap();
    extract_symbols(&parsed)
}

fn find<'a>(symbols: &'a [Symbol], qualified: &str) -> &'a Symbol {
    symbols
        .iter()
        .find(|s| s.qualified_name == qualified)
        .unwrap_or_else(|| panic!("missing symbol {qualified}"))
}

#[test]
fn top_level_declarations_are_indexed() {
    let symbols = extract(
        r#"
export function handle(req: Request): Response { return new Response(); }
interface Options { retries: number; }
type Mode = "fast" | "slow";
enum Level { Low = 0, High = 1 }
const limit: number = 10;
"#,
    );

    assert_eq!(find(&symbols, "handle").kind, SymbolKind::Function);
    assert!(find(&symbols, "handle").is_exported);
    assert_eq!(find(&symbols, "Options").kind, SymbolKind::Interface);
    assert!(!find(&symbols, "Options").is_exported);
    assert_eq!(find(&symbols, "Mode").kind, SymbolKind::TypeAlias);
    assert_eq!(find(&symbols, "Level").kind, SymbolKind::Enum);
    assert_eq!(find(&symbols, "limit").kind, SymbolKind::Variable);
}

#[test]
fn class_members_are_qualified_and_parented() {
    let symbols = extract(
        r#"
export class Router {
    routes: string[] = [];
    register(path: string): void {}
    constructor(base: string) {}
}
"#,
    );

    let class = find(&symbols, "Router");
    assert_eq!(class.kind, SymbolKind::Class);

    let method = find(&symbols, "Router.register");
    assert_eq!(method.kind, SymbolKind::Method);
    assert_eq!(method.parent_id.as_ref(), Some(&class.id));
    // Members inherit the class's exported flag.
    assert!(method.is_exported);

    let property = find(&symbols, "Router.routes");
    assert_eq!(property.kind, SymbolKind::Property);

    // Constructor bodies belong to the class; no own record.
    assert!(!symbols.iter().any(|s| s.qualified_name == "Router.constructor"));
}

#[test]
fn overload_signatures_are_skipped() {
    let symbols = extract(
        r#"
export function pick(value: string): string;
export function pick(value: number): number;
export function pick(value: unknown): unknown { return value; }
"#,
    );
    let picks: Vec<_> = symbols.iter().filter(|s| s.name == "pick").collect();
    assert_eq!(picks.len(), 1);
}

#[test]
fn namespace_contents_use_dotted_prefix() {
    let symbols = extract(
        r#"
namespace Net {
    export function connect(): void {}
    export namespace Inner {
        export const retries = 3;
    }
}
"#,
    );
    assert_eq!(find(&symbols, "Net.connect").kind, SymbolKind::Function);
    assert_eq!(find(&symbols, "Net.Inner.retries").kind, SymbolKind::Variable);
    // The namespace itself is not a symbol.
    assert!(!symbols.iter().any(|s| s.qualified_name == "Net"));
}

#[test]
fn all_declarators_share_the_statement_export_flag() {
    let symbols = extract("export const first = 1, second = 2;\nlet hidden = 3;");
    assert!(find(&symbols, "first").is_exported);
    assert!(find(&symbols, "second").is_exported);
    assert!(!find(&symbols, "hidden").is_exported);
}

#[test]
fn signature_hash_ignores_formatting_but_not_types() {
    let a = extract("export function f(x: string | number): void {}");
    let b = extract("export function f(x:   number | string ): void {}");
    let c = extract("export function f(x: number): void {}");
    assert_eq!(
        find(&a, "f").signature_hash,
        find(&b, "f").signature_hash,
        "whitespace and union order must not move the hash"
    );
    assert_ne!(find(&a, "f").signature_hash, find(&c, "f").signature_hash);
}

#[test]
fn body_changes_do_not_move_a_callable_hash() {
    let a = extract("export function f(x: number): number { return x; }");
    let b = extract("export function f(x: number): number { return x * 2 + 1; }");
    assert_eq!(find(&a, "f").signature_hash, find(&b, "f").signature_hash);
}

#[test]
fn class_heritage_feeds_the_hash() {
    let plain = extract("export class Svc {}");
    let derived = extract("export class Svc extends Base implements A, B {}");
    assert_ne!(
        find(&plain, "Svc").signature_hash,
        find(&derived, "Svc").signature_hash
    );

    let reordered = extract("export class Svc extends Base implements B, A {}");
    assert_eq!(
        find(&derived, "Svc").signature_hash,
        find(&reordered, "Svc").signature_hash,
        "implements order is commutative"
    );
}

#[test]
fn ranges_are_one_based_lines_and_inclusive_offsets() {
    let source = "export function f(): void {}\n";
    let symbols = extract(source);
    let f = find(&symbols, "f");
    assert_eq!(f.start_line, 1);
    assert_eq!(f.end_line, 1);
    // The declaration starts after the `export ` keyword.
    assert_eq!(f.start_offset, 7);
    // Inclusive end: the closing brace, before the trailing newline.
    assert_eq!(f.end_offset as usize, source.trim_end().len() - 1);
}

#[test]
fn anonymous_declarations_are_not_indexed() {
    let symbols = extract("export default function () { return 1; }");
    assert!(symbols.is_empty());
}
