//! The built-in tool catalog.
//!
//! Built-ins are defined in code, never persisted and never mutated. Their
//! identifiers are human-assigned and cannot be reused by custom tools.

use crate::tool::Tool;

const JOIN_TEXT: &str = r#"return input.split('\n').map(line => line.trim()).filter(line => line.length > 0).join(',');"#;

const SPLIT_TEXT: &str = r#"return input.split(',').map(part => part.trim()).join('\n');"#;

const LENGTH_TEXT: &str = r#"const chars = input.length;
const lines = input.split('\n').length;
return `Characters: ${chars}\nLines: ${lines}`;"#;

const PROPS_TO_JSON: &str = r#"const result = {};
input.split('\n').forEach(raw => {
  const line = raw.trim();
  if (line.length === 0 || line.startsWith('#') || line.startsWith('!')) return;
  const match = line.match(/^([^=:]+?)\s*[=:]\s*(.*)$/);
  if (!match) return;
  const path = match[1].trim().split('.');
  let node = result;
  for (let i = 0; i < path.length - 1; i++) {
    const key = path[i];
    if (typeof node[key] !== 'object' || node[key] === null) node[key] = {};
    node = node[key];
  }
  node[path[path.length - 1]] = match[2];
});
return JSON.stringify(result, null, 2);"#;

const MINIFY_JSON: &str = r#"return JSON.stringify(JSON.parse(input));"#;

const JSON_TO_CSV: &str = r#"let data;
try {
  data = JSON.parse(input);
} catch (e) {
  return 'Error: Invalid JSON - ' + e.message;
}
if (!Array.isArray(data)) {
  return 'Error: Input must be a JSON array of objects';
}
const headers = [];
data.forEach(row => {
  if (row !== null && typeof row === 'object') {
    Object.keys(row).forEach(key => {
      if (!headers.includes(key)) headers.push(key);
    });
  }
});
const escape = value => {
  if (value === undefined || value === null) return '';
  const text = typeof value === 'object' ? JSON.stringify(value) : String(value);
  return /[",\n\r]/.test(text) ? '"' + text.replace(/"/g, '""') + '"' : text;
};
const lines = [headers.map(escape).join(',')];
data.forEach(row => {
  const record = row !== null && typeof row === 'object' ? row : {};
  lines.push(headers.map(key => escape(record[key])).join(','));
});
return lines.join('\n');"#;

const CSV_TO_JSON: &str = r#"const rows = [];
let row = [];
let field = '';
let quoted = false;
for (let i = 0; i < input.length; i++) {
  const ch = input[i];
  if (quoted) {
    if (ch === '"') {
      if (input[i + 1] === '"') {
        field += '"';
        i++;
      } else {
        quoted = false;
      }
    } else {
      field += ch;
    }
  } else if (ch === '"') {
    quoted = true;
  } else if (ch === ',') {
    row.push(field);
    field = '';
  } else if (ch === '\n' || ch === '\r') {
    if (ch === '\r' && input[i + 1] === '\n') i++;
    row.push(field);
    rows.push(row);
    row = [];
    field = '';
  } else {
    field += ch;
  }
}
if (field.length > 0 || row.length > 0) {
  row.push(field);
  rows.push(row);
}
const records = rows.filter(r => !(r.length === 1 && r[0].trim() === ''));
if (records.length === 0) return '[]';
const headers = records[0].map(h => h.trim());
const result = records.slice(1).map(r => {
  const obj = {};
  headers.forEach((h, idx) => {
    obj[h] = idx < r.length ? r[idx] : '';
  });
  return obj;
});
return JSON.stringify(result, null, 2);"#;

/// The shipped tools, in display order.
pub fn builtin_tools() -> Vec<Tool> {
    vec![
        Tool::builtin(
            "join-text",
            "Join Text",
            "Join all lines into a single line separated by commas.",
            JOIN_TEXT,
        ),
        Tool::builtin(
            "split-text",
            "Split Text",
            "Split text by commas into new lines.",
            SPLIT_TEXT,
        ),
        Tool::builtin(
            "length-text",
            "Length Text",
            "Count characters and lines.",
            LENGTH_TEXT,
        ),
        Tool::builtin(
            "props-to-json",
            "Properties to Json",
            "Convert \"key=value\" or \"key: value\" lines to JSON. Dotted keys nest.",
            PROPS_TO_JSON,
        ),
        Tool::builtin(
            "minify-json",
            "Minify Json",
            "Remove all insignificant whitespace from JSON.",
            MINIFY_JSON,
        ),
        Tool::builtin(
            "json-to-csv",
            "Json to CSV",
            "Convert a JSON array of objects to CSV.",
            JSON_TO_CSV,
        ),
        Tool::builtin(
            "csv-to-json",
            "CSV to Json",
            "Convert CSV with a header row to a JSON array of objects.",
            CSV_TO_JSON,
        ),
    ]
}

/// Whether `id` names a built-in tool.
pub fn is_builtin_id(id: &str) -> bool {
    builtin_tools().iter().any(|tool| tool.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtins_are_unique_and_fixed() {
        let tools = builtin_tools();
        let ids: HashSet<_> = tools.iter().map(|t| t.id.as_str()).collect();

        assert_eq!(ids.len(), tools.len());
        assert!(tools.iter().all(|t| !t.is_custom));
        assert_eq!(tools, builtin_tools());
    }

    #[test]
    fn test_is_builtin_id() {
        assert!(is_builtin_id("length-text"));
        assert!(!is_builtin_id("length-text-2"));
    }
}
