//! Code unit inventory record
//!
//! Mirrors the pre-extracted inventory produced outside the core pipeline
//! (AST extraction is a separate, upstream concern). Several fields are
//! intentionally union-typed in the source artifact (e.g. `hookCalls` may
//! be a list of `{name, count}` objects or a bare list of strings), so we
//! keep those as `serde_json::Value` and normalize through accessor
//! methods rather than forcing a single shape that would reject valid
//! input.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Ordered `{name, type}` parameter record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_any_type")]
    #[serde(rename = "type")]
    pub type_: String,
}

fn default_any_type() -> String {
    "any".to_string()
}

/// `{tag, children}` rose-tree JSX node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxNode {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub children: Vec<JsxNode>,
}

/// A single extracted code unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeUnit {
    pub id: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_line: Option<u32>,
    #[serde(default)]
    pub end_line: Option<u32>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default = "default_any_type")]
    pub return_type: String,

    #[serde(default)]
    pub jsx_tree: Option<JsxNode>,

    /// Either `[{name, count}]` or `[name, name, ...]`.
    #[serde(default)]
    pub hook_calls: Vec<Value>,

    /// Either `[{source}]` or `[source, ...]`.
    #[serde(default)]
    pub imports: Vec<Value>,

    /// Either `[{name}]` or `[name, ...]`.
    #[serde(default)]
    pub store_access: Vec<Value>,
    #[serde(default)]
    pub data_source_access: Vec<Value>,

    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub has_error_handling: bool,
    #[serde(default)]
    pub has_loading_state: bool,
    #[serde(default)]
    pub has_empty_state: bool,
    #[serde(default)]
    pub has_retry_logic: bool,
    #[serde(default)]
    pub renders_iteration: bool,
    #[serde(default)]
    pub renders_conditional: bool,
    #[serde(default)]
    pub side_effects: bool,

    #[serde(default)]
    pub callees: Vec<Value>,
    /// context -> ordered callee name list
    #[serde(default)]
    pub callee_sequence: HashMap<String, Vec<String>>,
    /// Opaque pattern tag records, hashed whole.
    #[serde(default)]
    pub chain_patterns: Vec<Value>,
    /// depth (string or number, mixed) -> count
    #[serde(default)]
    pub call_depth: HashMap<String, f64>,

    #[serde(default)]
    pub consumers: Vec<Value>,
    /// other-unit-id -> ratio/count, or a list of `{unitId, ratio|count}`.
    #[serde(default)]
    pub co_occurrences: Value,

    #[serde(default)]
    pub consumer_kinds: Value,
    #[serde(default)]
    pub consumer_directories: Value,
    #[serde(default)]
    pub consumer_count: Option<u64>,
}

/// Behavior flag order, fixed so behavior vectors compare positionally.
pub const BEHAVIOR_KEYS: [&str; 8] = [
    "isAsync",
    "hasErrorHandling",
    "hasLoadingState",
    "hasEmptyState",
    "hasRetryLogic",
    "rendersIteration",
    "rendersConditional",
    "sideEffects",
];

/// Fixed hook order for `hookProfile`.
pub const HOOK_ORDER: [&str; 10] = [
    "useState",
    "useEffect",
    "useCallback",
    "useMemo",
    "useRef",
    "useContext",
    "useReducer",
    "useLayoutEffect",
    "useDeferredValue",
    "useTransition",
];

/// Kinds excluded from candidate pairing entirely.
pub const SKIP_KINDS: [&str; 5] = ["type", "enum", "constant", "interface", "typeAlias"];

impl CodeUnit {
    pub fn behavior_flags(&self) -> [u8; 8] {
        [
            self.is_async as u8,
            self.has_error_handling as u8,
            self.has_loading_state as u8,
            self.has_empty_state as u8,
            self.has_retry_logic as u8,
            self.renders_iteration as u8,
            self.renders_conditional as u8,
            self.side_effects as u8,
        ]
    }

    /// Normalize `hookCalls` (list of `{name,count}` or bare strings) to name->count.
    pub fn hook_counts(&self) -> HashMap<String, i64> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for entry in &self.hook_calls {
            match entry {
                Value::Object(map) => {
                    let name = map.get("name").and_then(Value::as_str).unwrap_or("");
                    if name.is_empty() {
                        continue;
                    }
                    let count = map.get("count").and_then(Value::as_i64).unwrap_or(1);
                    *counts.entry(name.to_string()).or_insert(0) += count;
                }
                Value::String(s) => {
                    *counts.entry(s.clone()).or_insert(0) += 1;
                }
                _ => {}
            }
        }
        counts
    }

    /// Normalize `imports` to the set of distinct import source strings.
    pub fn import_sources(&self) -> Vec<String> {
        self.imports
            .iter()
            .filter_map(|v| match v {
                Value::Object(map) => map.get("source").and_then(Value::as_str).map(str::to_string),
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn names_from(list: &[Value]) -> Vec<String> {
        list.iter()
            .filter_map(|v| match v {
                Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn store_access_names(&self) -> Vec<String> {
        Self::names_from(&self.store_access)
    }

    pub fn data_source_access_names(&self) -> Vec<String> {
        Self::names_from(&self.data_source_access)
    }

    /// Normalize `callees` to distinct target strings, first-seen order.
    pub fn callee_targets(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for v in &self.callees {
            let target = match v {
                Value::Object(map) => map.get("target").and_then(Value::as_str).map(str::to_string),
                Value::String(s) => Some(s.clone()),
                _ => None,
            };
            if let Some(t) = target {
                if !t.is_empty() && seen.insert(t.clone()) {
                    out.push(t);
                }
            }
        }
        out
    }

    /// Normalize `consumers` to the set of consumer unit ids.
    pub fn consumer_ids(&self) -> std::collections::HashSet<String> {
        self.consumers
            .iter()
            .filter_map(|v| match v {
                Value::Object(map) => map
                    .get("id")
                    .or_else(|| map.get("unitId"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Normalize `coOccurrences` (map or list of `{unitId, ratio|count}`) to a weight map.
    pub fn co_occurrence_weights(&self) -> HashMap<String, f64> {
        let mut out = HashMap::new();
        match &self.co_occurrences {
            Value::Object(map) => {
                for (uid, val) in map {
                    let weight = match val {
                        Value::Number(n) => n.as_f64().unwrap_or(0.0),
                        Value::Object(m) => m
                            .get("ratio")
                            .or_else(|| m.get("count"))
                            .and_then(Value::as_f64)
                            .unwrap_or(1.0),
                        _ => continue,
                    };
                    out.insert(uid.clone(), weight);
                }
            }
            Value::Array(list) => {
                for entry in list {
                    if let Value::Object(map) = entry {
                        let uid = map
                            .get("unitId")
                            .or_else(|| map.get("id"))
                            .and_then(Value::as_str);
                        let weight = map
                            .get("ratio")
                            .or_else(|| map.get("count"))
                            .and_then(Value::as_f64)
                            .unwrap_or(1.0);
                        if let Some(uid) = uid {
                            if !uid.is_empty() {
                                out.insert(uid.to_string(), weight);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
        out
    }

    /// `consumerKinds` normalized to a kind -> count histogram.
    pub fn consumer_kind_counts(&self) -> HashMap<String, i64> {
        let mut out = HashMap::new();
        match &self.consumer_kinds {
            Value::Array(list) => {
                for v in list {
                    if let Some(k) = v.as_str() {
                        *out.entry(k.to_string()).or_insert(0) += 1;
                    }
                }
            }
            Value::Object(map) => {
                for (k, v) in map {
                    if let Some(c) = v.as_i64() {
                        out.insert(k.clone(), c);
                    }
                }
            }
            _ => {}
        }
        out
    }

    /// Distinct consumer directories, from `consumerDirectories` if present,
    /// else derived from `consumers[].filePath`.
    pub fn distinct_consumer_directories(&self) -> usize {
        match &self.consumer_directories {
            Value::Array(list) => list
                .iter()
                .filter_map(Value::as_str)
                .collect::<std::collections::HashSet<_>>()
                .len(),
            Value::Object(map) => map.len(),
            _ => {
                let mut dirs = std::collections::HashSet::new();
                for v in &self.consumers {
                    let fp = match v {
                        Value::Object(map) => map
                            .get("filePath")
                            .or_else(|| map.get("file"))
                            .and_then(Value::as_str)
                            .unwrap_or(""),
                        Value::String(s) => s.as_str(),
                        _ => "",
                    };
                    if let Some(idx) = fp.rfind('/') {
                        dirs.insert(fp[..idx].to_string());
                    }
                }
                dirs.len()
            }
        }
    }

    pub fn effective_consumer_count(&self) -> u64 {
        self.consumer_count.unwrap_or(self.consumers.len() as u64)
    }
}

/// Parent directory of a file path (everything before the last `/`).
pub fn parent_dir(file_path: &str) -> Option<String> {
    file_path.rfind('/').map(|idx| file_path[..idx].to_string())
}

/// App-level directory: the segment following `apps` if present,
/// otherwise the first path segment.
pub fn app_level_dir(file_path: &str) -> String {
    let segments: Vec<&str> = file_path.split('/').filter(|s| !s.is_empty()).collect();
    if let Some(pos) = segments.iter().position(|s| *s == "apps") {
        if let Some(next) = segments.get(pos + 1) {
            return next.to_string();
        }
    }
    segments.first().copied().unwrap_or("").to_string()
}

/// Parse `callDepth` into the bucketed `[direct, depth2, depth3plus]`
/// integer vector, normalizing numeric-or-string keys before comparison.
pub fn call_depth_buckets(call_depth: &HashMap<String, f64>) -> Option<[u64; 3]> {
    if call_depth.is_empty() {
        return None;
    }
    let mut direct = 0u64;
    let mut depth2 = 0u64;
    let mut depth3plus = 0u64;
    for (key, value) in call_depth {
        let Ok(depth) = key.trim().parse::<i64>() else {
            continue;
        };
        let v = value.round().max(0.0) as u64;
        match depth {
            1 => direct += v,
            2 => depth2 += v,
            d if d >= 3 => depth3plus += v,
            _ => {}
        }
    }
    Some([direct, depth2, depth3plus])
}
