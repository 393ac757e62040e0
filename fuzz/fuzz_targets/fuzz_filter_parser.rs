#![no_main]

use contentquery_core::filter::{parse_sort_order, Parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to string (ignore invalid UTF-8)
    if let Ok(text) = std::str::from_utf8(data) {
        // Limit length to prevent timeout
        if text.len() > 10_000 {
            return;
        }

        // Neither parser may panic
        if let Ok(mut parser) = Parser::new(text) {
            let _ = parser.parse_condition();
        }
        let _ = parse_sort_order(text);
    }
});
