// udar-distractors: Case-paradigm distractors for Russian nouns.
//
// For each noun prints the forms of all six cases in the number of the
// given form, as used for multiple-choice exercises.
//
// Usage:
//   udar-distractors [-r RESOURCE_PATH] [--unstressed] [WORD...]
//
// Options:
//   -r, --resource-path PATH   Resource directory with transducers or lexicon.tsv
//   --unstressed               Print forms without stress marks
//   -h, --help                 Print help

use std::io::{self, Write};

use udar_ru::UdarError;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (resource_path, args) = udar_cli::parse_resource_path(&args);

    if udar_cli::wants_help(&args) {
        println!("udar-distractors: Case-paradigm distractors for Russian nouns.");
        println!();
        println!("Usage: udar-distractors [-r RESOURCE_PATH] [--unstressed] [WORD...]");
        println!();
        println!("If WORD arguments are given, prints distractors for each of them.");
        println!("Otherwise reads words from stdin (one per line).");
        println!();
        println!("Options:");
        println!("  -r, --resource-path PATH   Resource directory with transducers or lexicon.tsv");
        println!("  --unstressed               Print forms without stress marks");
        println!("  -h, --help                 Print this help");
        return;
    }
    udar_cli::init_logging();

    let stressed = !args.iter().any(|a| a == "--unstressed");
    let handle = udar_cli::load_handle(resource_path.as_deref())
        .unwrap_or_else(|e| udar_cli::fatal(&e));

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for word in udar_cli::inputs(&args) {
        match handle.noun_distractors(&word, stressed) {
            Ok(forms) => {
                let forms: Vec<String> = forms.into_iter().collect();
                let _ = writeln!(out, "{word}: {}", forms.join(", "));
            }
            Err(UdarError::NotANoun(_)) => {
                let _ = writeln!(out, "{word}: (not a noun)");
            }
            Err(e) => udar_cli::fatal(&e.to_string()),
        }
    }
}
