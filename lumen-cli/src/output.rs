//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Shorten a 56-character strkey to `GABC...WXYZ` for table cells
pub fn short_key(key: &str) -> String {
    if key.len() > 12 && key.is_ascii() {
        format!("{}...{}", &key[..4], &key[key.len() - 4..])
    } else {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_key() {
        assert_eq!(
            short_key("GABGMPEKKDWR2WFH5AJOZV5PDKLJEHGCR3Q24ALETWR5H3A7GI3YTS7V"),
            "GABG...TS7V"
        );
        assert_eq!(short_key("GA"), "GA");
    }
}
