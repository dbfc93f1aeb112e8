//! Run a rudi script against a JSON document: parse → run → print.
//!
//! Usage: cargo run -p rudi --example embed -- script.rudi [document.json]

use rudi::{builtin, parse, Value, Variables};
use std::env;
use std::fs;
use std::process;

fn main() {
    let script_path = match env::args().nth(1) {
        Some(p) => p,
        None => {
            eprintln!("Usage: embed <script.rudi> [document.json]");
            process::exit(1);
        }
    };
    let source = fs::read_to_string(&script_path).unwrap_or_else(|e| {
        eprintln!("read {}: {}", script_path, e);
        process::exit(1);
    });

    let document: serde_json::Value = match env::args().nth(2) {
        Some(path) => {
            let text = fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("read {}: {}", path, e);
                process::exit(1);
            });
            serde_json::from_str(&text).unwrap_or_else(|e| {
                eprintln!("decode {}: {}", path, e);
                process::exit(1);
            })
        }
        None => serde_json::Value::Null,
    };

    let program = parse(&script_path, &source).unwrap_or_else(|e| {
        eprintln!("parse: {e}");
        process::exit(1);
    });
    let output = program
        .run(Value::from(document), Variables::new(), builtin::all(), None)
        .unwrap_or_else(|e| {
            eprintln!("run: {e}");
            process::exit(1);
        });

    println!("value: {}", serde_json::to_string_pretty(&output.value).unwrap());
    println!("document: {}", serde_json::to_string_pretty(&output.document).unwrap());
}
