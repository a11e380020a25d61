//! CSV export of contacts.
//!
//! The header is the union of field names in first-seen order; a contact
//! lacking a field gets an empty cell. Values containing a comma, a double
//! quote or a line break are quoted, with inner quotes doubled.

use serde_json::Value;

use crate::{Result, record::Contact};

pub fn contacts_to_csv(contacts: &[Contact]) -> Result<String> {
  let mut header: Vec<String> = Vec::new();
  let mut rows: Vec<serde_json::Map<String, Value>> = Vec::with_capacity(contacts.len());

  for contact in contacts {
    // Field order follows the struct, which `serde_json` does not preserve
    // in a `Map`, so walk the struct's own field list.
    let value = serde_json::to_value(contact)?;
    let Value::Object(map) = value else {
      continue;
    };
    for field in contact_field_order() {
      if map.contains_key(*field) && !header.iter().any(|h| h == field) {
        header.push((*field).to_owned());
      }
    }
    rows.push(map);
  }

  if header.is_empty() {
    return Ok(String::new());
  }

  let mut out = String::new();
  push_line(&mut out, header.iter().map(String::as_str));
  for row in &rows {
    let cells: Vec<String> = header
      .iter()
      .map(|field| row.get(field).map(cell).unwrap_or_default())
      .collect();
    push_line(&mut out, cells.iter().map(String::as_str));
  }
  Ok(out)
}

/// Serialised field names of [`Contact`], in declaration order.
fn contact_field_order() -> &'static [&'static str] {
  &[
    "id",
    "name",
    "surname",
    "email",
    "phone",
    "company",
    "position",
    "sector",
    "company_size",
    "needs",
    "message",
    "callback_preference",
    "status",
    "created_at",
    "updated_at",
  ]
}

fn cell(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
  for (i, value) in cells.enumerate() {
    if i > 0 {
      out.push(',');
    }
    if value.contains([',', '"', '\n', '\r']) {
      out.push('"');
      out.push_str(&value.replace('"', "\"\""));
      out.push('"');
    } else {
      out.push_str(value);
    }
  }
  out.push('\n');
}
