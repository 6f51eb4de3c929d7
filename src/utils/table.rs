// src/utils/table.rs

//! Plain terminal tables.

use comfy_table::{ContentArrangement, Table, presets};

/// Create a borderless table with the given header row.
pub fn create_table<S: ToString>(headers: &[S]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| h.to_string()).collect::<Vec<_>>());
    table
}

/// Two-column key/value table.
pub fn key_value_table(items: &[(&str, String)]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    for (key, value) in items {
        table.add_row(vec![key.to_string(), value.clone()]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_renders_rows() {
        let mut table = create_table(&["id", "status"]);
        table.add_row(vec!["1", "DONE"]);
        let rendered = table.to_string();
        assert!(rendered.contains("status"));
        assert!(rendered.contains("DONE"));
    }

    #[test]
    fn test_key_value_table() {
        let rendered = key_value_table(&[("user", "kees".to_string())]).to_string();
        assert!(rendered.contains("user"));
        assert!(rendered.contains("kees"));
    }
}
