//! Intent oracle contract and grounding-context construction.
//!
//! The oracle is an opaque collaborator: raw prompt plus bounded grounding
//! in, structured descriptor or parse error out. Hints are expected to be
//! verbatim names from the grounding; anything that is not a string is
//! filtered before a descriptor reaches the resolver.

use serde_json::Value;

use blastradius_core::config::RadiusConfig;
use blastradius_core::errors::IntentParseError;
use blastradius_core::traits::CancellationToken;
use blastradius_core::types::intent::{
    ChangeType, GroundingContext, IntentDescriptor, SymbolDescriptor,
};
use blastradius_core::types::symbol::SymbolIndex;

/// The external natural-language oracle.
pub trait IntentOracle {
    fn interpret(
        &self,
        prompt: &str,
        grounding: &GroundingContext,
        cancel: &CancellationToken,
    ) -> Result<IntentDescriptor, IntentParseError>;
}

/// Build the bounded grounding context: file paths and symbol descriptors,
/// exported symbols first.
pub fn build_grounding(index: &SymbolIndex, config: &RadiusConfig) -> GroundingContext {
    let mut files = index.file_paths();
    files.truncate(config.max_context_files);

    let mut symbols: Vec<SymbolDescriptor> = index
        .iter()
        .map(|(_, s)| SymbolDescriptor {
            name: s.name.clone(),
            file_path: s.file_path.clone(),
            kind: s.kind,
            is_exported: s.is_exported,
        })
        .collect();
    symbols.sort_by(|a, b| {
        b.is_exported
            .cmp(&a.is_exported)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.file_path.cmp(&b.file_path))
    });
    symbols.truncate(config.max_context_symbols);

    GroundingContext { files, symbols }
}

/// Parse a raw oracle payload into a descriptor.
///
/// Non-string hint entries are dropped rather than failing the call; a
/// payload without a usable shape is a parse error.
pub fn descriptor_from_value(prompt: &str, value: &Value) -> Result<IntentDescriptor, IntentParseError> {
    let object = value.as_object().ok_or_else(|| IntentParseError {
        prompt: prompt.to_string(),
        reason: "oracle payload is not an object".to_string(),
    })?;

    let change_type = match object.get("changeType").and_then(Value::as_str) {
        Some("add") => ChangeType::Add,
        Some("modify") => ChangeType::Modify,
        Some("delete") => ChangeType::Delete,
        Some("refactor") => ChangeType::Refactor,
        _ => ChangeType::Unknown,
    };

    Ok(IntentDescriptor {
        prompt: prompt.to_string(),
        change_type,
        symbol_hints: string_list(object.get("symbolHints")),
        file_hints: string_list(object.get("fileHints")),
        affects_public_api: object
            .get("affectsPublicApi")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        summary: object
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_string_hints_are_filtered() {
        let payload = json!({
            "changeType": "modify",
            "symbolHints": ["realName", 42, null, "other"],
            "fileHints": [{"oops": true}],
            "affectsPublicApi": true,
        });
        let descriptor = descriptor_from_value("tweak realName", &payload).unwrap();
        assert_eq!(descriptor.symbol_hints, vec!["realName", "other"]);
        assert!(descriptor.file_hints.is_empty());
        assert!(descriptor.affects_public_api);
        assert_eq!(descriptor.change_type, ChangeType::Modify);
    }

    #[test]
    fn non_object_payload_is_a_parse_error() {
        let err = descriptor_from_value("p", &json!("just text")).unwrap_err();
        assert_eq!(err.prompt, "p");
    }
}
