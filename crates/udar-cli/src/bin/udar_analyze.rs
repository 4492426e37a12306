// udar-analyze: Morphological analysis of Russian text.
//
// Analyzes each line of input as a text and prints the readings of every
// token in the hfst-lookup stream format, or the whole document as JSON.
//
// Usage:
//   udar-analyze [-r RESOURCE_PATH] [OPTIONS] [TEXT...]
//
// Options:
//   -r, --resource-path PATH   Resource directory with transducers or lexicon.tsv
//   --json                     Print documents as JSON
//   --no-disambiguate          Keep all readings
//   -h, --help                 Print help

use std::io::{self, Write};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (resource_path, args) = udar_cli::parse_resource_path(&args);

    if udar_cli::wants_help(&args) {
        println!("udar-analyze: Morphological analysis of Russian text.");
        println!();
        println!("Usage: udar-analyze [-r RESOURCE_PATH] [OPTIONS] [TEXT...]");
        println!();
        println!("If TEXT arguments are given, analyzes each of them.");
        println!("Otherwise reads texts from stdin (one per line).");
        println!();
        println!("Options:");
        println!("  -r, --resource-path PATH   Resource directory with transducers or lexicon.tsv");
        println!("  --json                     Print documents as JSON");
        println!("  --no-disambiguate          Keep all readings");
        println!("  -h, --help                 Print this help");
        return;
    }
    udar_cli::init_logging();

    let json = args.iter().any(|a| a == "--json");
    let mut handle = udar_cli::load_handle(resource_path.as_deref())
        .unwrap_or_else(|e| udar_cli::fatal(&e));
    if args.iter().any(|a| a == "--no-disambiguate") {
        handle.set_disambiguate(false);
    }

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for text in udar_cli::inputs(&args) {
        let doc = handle
            .analyze_text(&text)
            .unwrap_or_else(|e| udar_cli::fatal(&e.to_string()));
        if json {
            match serde_json::to_string(&doc) {
                Ok(s) => {
                    let _ = writeln!(out, "{s}");
                }
                Err(e) => udar_cli::fatal(&e.to_string()),
            }
        } else {
            let _ = write!(out, "{}", doc.to_hfst_stream());
        }
    }
}
