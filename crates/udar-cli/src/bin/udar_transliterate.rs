// udar-transliterate: Romanize Russian text.
//
// Needs no resources: transliteration works on the characters alone.
//
// Usage:
//   udar-transliterate [--scheme NAME] [TEXT...]
//
// Options:
//   --scheme NAME   scholarly (default), iso9, loc or passport2013
//   -h, --help      Print help

use std::io::{self, Write};

use udar_ru::Scheme;
use udar_ru::derivation::{self, transliterate};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if udar_cli::wants_help(&args) {
        println!("udar-transliterate: Romanize Russian text.");
        println!();
        println!("Usage: udar-transliterate [--scheme NAME] [TEXT...]");
        println!();
        println!("If TEXT arguments are given, transliterates each of them.");
        println!("Otherwise reads texts from stdin (one per line).");
        println!();
        println!("Options:");
        let names: Vec<&str> = Scheme::ALL.iter().map(|s| s.name()).collect();
        println!("  --scheme NAME   One of: {}", names.join(", "));
        println!("  -h, --help      Print this help");
        return;
    }
    udar_cli::init_logging();

    let mut scheme = Scheme::default();
    let mut texts: Vec<String> = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(name) = arg.strip_prefix("--scheme=") {
            scheme = derivation::scheme(name).unwrap_or_else(|e| udar_cli::fatal(&e.to_string()));
        } else if arg == "--scheme" {
            let name = args.get(i + 1).unwrap_or_else(|| udar_cli::fatal("--scheme requires a value"));
            scheme = derivation::scheme(name).unwrap_or_else(|e| udar_cli::fatal(&e.to_string()));
            skip_next = true;
        } else {
            texts.push(arg.clone());
        }
    }

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for text in udar_cli::inputs(&texts) {
        let _ = writeln!(out, "{}", transliterate::transliterate(&text, scheme));
    }
}
