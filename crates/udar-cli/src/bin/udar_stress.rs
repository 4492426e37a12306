// udar-stress: Add stress marks to Russian text.
//
// Usage:
//   udar-stress [-r RESOURCE_PATH] [OPTIONS] [TEXT...]
//
// Options:
//   -r, --resource-path PATH   Resource directory with transducers or lexicon.tsv
//   --selection NAME           most-likely (default), safe, all or freq
//   --guess                    Guess stress of unknown words
//   --eval                     Treat input as hand-stressed and print metrics
//   --no-disambiguate          Do not run the grammar first
//   -h, --help                 Print help

use std::io::{self, Write};

use udar_ru::StressSelection;
use udar_ru::derivation::evaluation::StressCounts;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (resource_path, args) = udar_cli::parse_resource_path(&args);

    if udar_cli::wants_help(&args) {
        println!("udar-stress: Add stress marks to Russian text.");
        println!();
        println!("Usage: udar-stress [-r RESOURCE_PATH] [OPTIONS] [TEXT...]");
        println!();
        println!("If TEXT arguments are given, stresses each of them.");
        println!("Otherwise reads texts from stdin (one per line).");
        println!();
        println!("Options:");
        println!("  -r, --resource-path PATH   Resource directory with transducers or lexicon.tsv");
        println!("  --selection NAME           most-likely (default), safe, all or freq");
        println!("  --guess                    Guess stress of unknown words");
        println!("  --eval                     Treat input as hand-stressed and print metrics");
        println!("  --no-disambiguate          Do not run the grammar first");
        println!("  -h, --help                 Print this help");
        return;
    }
    udar_cli::init_logging();

    let mut selection = StressSelection::default();
    let mut no_disambiguate = false;
    let mut guess = false;
    let mut eval = false;
    let mut texts: Vec<String> = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        match arg.as_str() {
            "--selection" => {
                let name = args.get(i + 1).unwrap_or_else(|| udar_cli::fatal("--selection requires a value"));
                selection = StressSelection::from_name(name)
                    .unwrap_or_else(|| udar_cli::fatal(&format!("unknown stress selection: {name}")));
                skip_next = true;
            }
            "--no-disambiguate" => no_disambiguate = true,
            "--guess" => guess = true,
            "--eval" => eval = true,
            _ => texts.push(arg.clone()),
        }
    }

    let mut handle = udar_cli::load_handle(resource_path.as_deref())
        .unwrap_or_else(|e| udar_cli::fatal(&e));
    handle.set_stress_selection(selection);
    handle.set_guess_stress(guess);
    if no_disambiguate {
        handle.set_disambiguate(false);
    }

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    if eval {
        let mut counts = StressCounts::default();
        for text in udar_cli::inputs(&texts) {
            match handle.stress_eval(&text) {
                Ok(c) => counts.merge(&c),
                Err(e) => udar_cli::fatal(&e.to_string()),
            }
        }
        let Some(metrics) = counts.compute_metrics() else {
            udar_cli::fatal("nothing to evaluate: no stressed words or no stress placed");
        };
        match serde_json::to_string_pretty(&serde_json::json!({
            "params": handle.stress_params().readable_name(),
            "metrics": metrics,
        })) {
            Ok(json) => {
                let _ = writeln!(out, "{json}");
            }
            Err(e) => udar_cli::fatal(&e.to_string()),
        }
        return;
    }

    for text in udar_cli::inputs(&texts) {
        match handle.stressed(&text) {
            Ok(stressed) => {
                let _ = writeln!(out, "{stressed}");
            }
            Err(e) => udar_cli::fatal(&e.to_string()),
        }
    }
}
