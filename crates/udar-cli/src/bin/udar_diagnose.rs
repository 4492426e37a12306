// udar-diagnose: Find typical learner errors in Russian text.
//
// Prints each learner-error tag found in the input with the wordforms that
// exhibit it. Needs the L2 analyzer (analyser-gt-desc-L2.hfstol) or a
// lexicon.tsv with learner-error entries.
//
// Usage:
//   udar-diagnose [-r RESOURCE_PATH] [TEXT...]
//
// Options:
//   -r, --resource-path PATH   Resource directory
//   -h, --help                 Print help

use std::io::{self, Write};

use udar_ru::UdarHandle;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (resource_path, args) = udar_cli::parse_resource_path(&args);

    if udar_cli::wants_help(&args) {
        println!("udar-diagnose: Find typical learner errors in Russian text.");
        println!();
        println!("Usage: udar-diagnose [-r RESOURCE_PATH] [TEXT...]");
        println!();
        println!("If TEXT arguments are given, checks each of them.");
        println!("Otherwise reads texts from stdin (one per line).");
        println!();
        println!("Options:");
        println!("  -r, --resource-path PATH   Resource directory");
        println!("  -h, --help                 Print this help");
        return;
    }
    udar_cli::init_logging();

    let handle = udar_cli::load_handle(resource_path.as_deref())
        .unwrap_or_else(|e| udar_cli::fatal(&e));

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for text in udar_cli::inputs(&args) {
        let found = handle
            .diagnose_l2(&text)
            .unwrap_or_else(|e| udar_cli::fatal(&e.to_string()));
        if found.is_empty() {
            let _ = writeln!(out, "{text}: (no learner errors)");
            continue;
        }
        let _ = writeln!(out, "{text}:");
        for (tag, forms) in found {
            let description = UdarHandle::tag_info(&tag).unwrap_or("");
            let forms: Vec<String> = forms.into_iter().collect();
            let _ = writeln!(out, "  {tag} ({description}): {}", forms.join(", "));
        }
    }
}
