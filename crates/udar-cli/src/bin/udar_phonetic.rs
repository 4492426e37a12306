// udar-phonetic: Phonetic transcription of Russian text.
//
// Usage:
//   udar-phonetic [-r RESOURCE_PATH] [OPTIONS] [TEXT...]
//
// Options:
//   -r, --resource-path PATH   Resource directory with transducers or lexicon.tsv
//   --selection NAME           most-likely (default), safe, all or freq
//   -h, --help                 Print help

use std::io::{self, Write};

use udar_ru::StressSelection;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (resource_path, args) = udar_cli::parse_resource_path(&args);

    if udar_cli::wants_help(&args) {
        println!("udar-phonetic: Phonetic transcription of Russian text.");
        println!();
        println!("Usage: udar-phonetic [-r RESOURCE_PATH] [OPTIONS] [TEXT...]");
        println!();
        println!("If TEXT arguments are given, transcribes each of them.");
        println!("Otherwise reads texts from stdin (one per line).");
        println!();
        println!("Options:");
        println!("  -r, --resource-path PATH   Resource directory with transducers or lexicon.tsv");
        println!("  --selection NAME           most-likely (default), safe, all or freq");
        println!("  -h, --help                 Print this help");
        return;
    }
    udar_cli::init_logging();

    let mut selection = StressSelection::default();
    let mut texts: Vec<String> = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--selection" {
            let name = args.get(i + 1).unwrap_or_else(|| udar_cli::fatal("--selection requires a value"));
            selection = StressSelection::from_name(name)
                .unwrap_or_else(|| udar_cli::fatal(&format!("unknown stress selection: {name}")));
            skip_next = true;
        } else {
            texts.push(arg.clone());
        }
    }

    let mut handle = udar_cli::load_handle(resource_path.as_deref())
        .unwrap_or_else(|e| udar_cli::fatal(&e));
    handle.set_stress_selection(selection);

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for text in udar_cli::inputs(&texts) {
        match handle.phonetic(&text) {
            Ok(ipa) => {
                let _ = writeln!(out, "{ipa}");
            }
            Err(e) => udar_cli::fatal(&e.to_string()),
        }
    }
}
