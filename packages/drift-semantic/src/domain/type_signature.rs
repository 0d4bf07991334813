//! Stage T: type signature normalization.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::code_unit::CodeUnit;
use crate::infrastructure::hashing::canonical_sha256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSignature {
    pub strict_hash: String,
    pub loose_hash: String,
    pub canonical: String,
    pub arity: usize,
}

fn is_void(t: &str) -> bool {
    matches!(t.trim().to_lowercase().as_str(), "void" | "undefined" | "never")
}

fn is_function(t: &str) -> bool {
    t.contains("=>") || t.to_lowercase().contains("function") || t.to_lowercase().contains("callback")
}

fn is_object(t: &str) -> bool {
    let trimmed = t.trim().to_lowercase();
    trimmed == "object" || t.trim_start().starts_with('{') || trimmed.contains("record")
}

fn is_array(t: &str) -> bool {
    t.contains("[]") || t.to_lowercase().starts_with("array") || t.to_lowercase().contains("list")
}

pub fn compute_type_signature(unit: &CodeUnit) -> TypeSignature {
    let param_types: Vec<String> = unit.parameters.iter().map(|p| p.type_.clone()).collect();
    let return_type = unit.return_type.clone();

    let strict_hash = canonical_sha256(&json!({
        "params": param_types,
        "return": return_type,
    }));

    let has_void_return = is_void(&return_type);
    let has_function_param = param_types.iter().any(|t| is_function(t));
    let has_object_param = param_types.iter().any(|t| is_object(t));
    let has_array_param = param_types.iter().any(|t| is_array(t));

    let loose_hash = canonical_sha256(&json!({
        "arity": param_types.len(),
        "has_void_return": has_void_return,
        "has_function_param": has_function_param,
        "has_object_param": has_object_param,
        "has_array_param": has_array_param,
    }));

    let canonical = format!("({}) => {}", param_types.join(", "), return_type);

    TypeSignature {
        strict_hash,
        loose_hash,
        canonical,
        arity: param_types.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::code_unit::Parameter;

    fn unit_with(params: Vec<(&str, &str)>, return_type: &str) -> CodeUnit {
        let mut u: CodeUnit = serde_json::from_value(serde_json::json!({ "id": "u" })).unwrap();
        u.parameters = params
            .into_iter()
            .map(|(name, t)| Parameter {
                name: name.to_string(),
                type_: t.to_string(),
            })
            .collect();
        u.return_type = return_type.to_string();
        u
    }

    #[test]
    fn strict_hash_ignores_parameter_names() {
        let a = unit_with(vec![("x", "string")], "number");
        let b = unit_with(vec![("y", "string")], "number");
        assert_eq!(
            compute_type_signature(&a).strict_hash,
            compute_type_signature(&b).strict_hash
        );
    }

    #[test]
    fn strict_hash_differs_on_type_change() {
        let a = unit_with(vec![("x", "string")], "number");
        let b = unit_with(vec![("x", "number")], "number");
        assert_ne!(
            compute_type_signature(&a).strict_hash,
            compute_type_signature(&b).strict_hash
        );
    }

    #[test]
    fn loose_hash_matches_structurally_similar_but_differently_named_types() {
        let a = unit_with(vec![("x", "string"), ("cb", "(x: number) => void")], "void");
        let b = unit_with(vec![("y", "MyString"), ("fn", "Callback")], "undefined");
        assert_eq!(
            compute_type_signature(&a).loose_hash,
            compute_type_signature(&b).loose_hash
        );
    }

    #[test]
    fn canonical_string_format() {
        let a = unit_with(vec![("x", "string"), ("y", "number")], "boolean");
        assert_eq!(compute_type_signature(&a).canonical, "(string, number) => boolean");
    }

    #[test]
    fn classifies_object_and_array_types() {
        assert!(is_object("{ id: string }"));
        assert!(is_object("Record<string, number>"));
        assert!(is_array("string[]"));
        assert!(is_array("Array<string>"));
        assert!(is_array("MyList"));
    }
}
