// udar-disambiguate: Constraint-grammar disambiguation of Russian text.
//
// Analyzes and disambiguates each line of input and prints the
// disambiguation stream: active readings, removed readings marked
// `;removed`, the selected reading marked `@most-likely`, and the rule
// that touched each reading.
//
// Usage:
//   udar-disambiguate [-r RESOURCE_PATH] [TEXT...]
//
// Options:
//   -r, --resource-path PATH   Resource directory with disambiguator.cg3
//   -h, --help                 Print help

use std::io::{self, Write};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (resource_path, args) = udar_cli::parse_resource_path(&args);

    if udar_cli::wants_help(&args) {
        println!("udar-disambiguate: Disambiguate Russian text with a constraint grammar.");
        println!();
        println!("Usage: udar-disambiguate [-r RESOURCE_PATH] [TEXT...]");
        println!();
        println!("If TEXT arguments are given, disambiguates each of them.");
        println!("Otherwise reads texts from stdin (one per line).");
        println!();
        println!("Options:");
        println!("  -r, --resource-path PATH   Resource directory with disambiguator.cg3");
        println!("  -h, --help                 Print this help");
        return;
    }
    udar_cli::init_logging();

    let mut handle = udar_cli::load_handle(resource_path.as_deref())
        .unwrap_or_else(|e| udar_cli::fatal(&e));
    if !handle.has_disambiguator() {
        udar_cli::fatal("no disambiguator.cg3 in the resource directory");
    }
    handle.set_disambiguate(false);

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for text in udar_cli::inputs(&args) {
        let result = handle.analyze_text(&text).and_then(|mut doc| {
            handle.disambiguate(&mut doc)?;
            Ok(doc)
        });
        match result {
            Ok(doc) => {
                let _ = write!(out, "{}", doc.to_cg_stream());
            }
            Err(e) => udar_cli::fatal(&e.to_string()),
        }
    }
}
