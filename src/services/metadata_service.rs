use serde_json::Value;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Derived-prompt key: walks the embedded node graph instead of returning a
/// raw field.
pub const PROMPT_TEXT_KEY: &str = "prompt_text";

/// Metadata is best-effort: unreadable or absent data is a soft miss, never a
/// request error.
#[derive(Debug, PartialEq, Eq)]
pub enum MetadataOutcome {
    Found(String),
    NotFound(String),
}

pub fn lookup(path: &Path, key: Option<&str>) -> MetadataOutcome {
    let Some(fields) = read_text_fields(path) else {
        return MetadataOutcome::NotFound("no embedded metadata".to_string());
    };

    match key {
        None => fields
            .get("workflow")
            .or_else(|| fields.get("prompt"))
            .cloned()
            .map(MetadataOutcome::Found)
            .unwrap_or_else(|| {
                MetadataOutcome::NotFound("no workflow or prompt field".to_string())
            }),
        Some(PROMPT_TEXT_KEY) => extract_prompt_text(fields.get("prompt").map(String::as_str)),
        Some(name) => fields
            .get(name)
            .cloned()
            .map(MetadataOutcome::Found)
            .unwrap_or_else(|| MetadataOutcome::NotFound(format!("field not present: {name}"))),
    }
}

/// Reads every tEXt/zTXt/iTXt keyword from a PNG header. Returns None for
/// files that are not decodable PNGs.
fn read_text_fields(path: &Path) -> Option<HashMap<String, String>> {
    let file = File::open(path).ok()?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let mut reader = decoder.read_info().ok()?;
    // pick up text chunks written after the image data as well
    let _ = reader.finish();

    let info = reader.info();
    let mut fields = HashMap::new();
    for chunk in &info.uncompressed_latin1_text {
        fields.insert(chunk.keyword.clone(), chunk.text.clone());
    }
    for chunk in &info.compressed_latin1_text {
        let mut chunk = chunk.clone();
        if chunk.decompress_text().is_ok() {
            if let Ok(text) = chunk.get_text() {
                fields.insert(chunk.keyword.clone(), text);
            }
        }
    }
    for chunk in &info.utf8_text {
        let mut chunk = chunk.clone();
        if chunk.decompress_text().is_ok() {
            if let Ok(text) = chunk.get_text() {
                fields.insert(chunk.keyword.clone(), text);
            }
        }
    }
    Some(fields)
}

/// Recovers the originating positive prompt from a generation node graph:
/// follow each sampler's `positive` link to the node that produced it and take
/// that node's `text` input. When no sampler link yields text, fall back to
/// scanning text-encode nodes that are not titled as negative prompts.
fn extract_prompt_text(raw_prompt: Option<&str>) -> MetadataOutcome {
    let Some(raw) = raw_prompt else {
        return MetadataOutcome::NotFound("no prompt field".to_string());
    };
    let Ok(Value::Object(nodes)) = serde_json::from_str::<Value>(raw) else {
        return MetadataOutcome::NotFound("prompt field is not a node graph".to_string());
    };

    let mut collected: Vec<String> = Vec::new();

    for node in nodes.values() {
        let Some(class_type) = node.get("class_type").and_then(Value::as_str) else {
            continue;
        };
        if !class_type.contains("Sampler") {
            continue;
        }
        let Some(source_id) = node
            .get("inputs")
            .and_then(|inputs| inputs.get("positive"))
            .and_then(|link| link.get(0))
            .and_then(link_node_id)
        else {
            continue;
        };
        let Some(text) = nodes
            .get(&source_id)
            .and_then(|source| source.get("inputs"))
            .and_then(|inputs| inputs.get("text"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        if !text.trim().is_empty() {
            collected.push(text.to_string());
        }
    }

    if collected.is_empty() {
        for node in nodes.values() {
            let Some(class_type) = node.get("class_type").and_then(Value::as_str) else {
                continue;
            };
            if !class_type.starts_with("CLIPTextEncode") {
                continue;
            }
            let title = node
                .get("_meta")
                .and_then(|meta| meta.get("title"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            if title.to_lowercase().contains("negative") {
                continue;
            }
            if let Some(text) = node
                .get("inputs")
                .and_then(|inputs| inputs.get("text"))
                .and_then(Value::as_str)
            {
                if !text.trim().is_empty() {
                    collected.push(text.to_string());
                }
            }
        }
    }

    let mut seen = HashSet::new();
    collected.retain(|text| seen.insert(text.clone()));

    if collected.is_empty() {
        MetadataOutcome::NotFound("no prompt text found".to_string())
    } else {
        MetadataOutcome::Found(collected.join("\n\n"))
    }
}

// graph links serialize the source node id as either a string or a number
fn link_node_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
