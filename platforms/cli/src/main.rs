use clap::Parser;
use refa::loader::SpecLoader;
use refa::samples::SampleManager;
use refa::simulator::Run;
use refa::types::{Automaton, AutomatonError, StateId};
use refa::{convert, encoder, regex, simulator, thompson};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// A regular expression to compile into an epsilon-NFA
    #[clap(short, long)]
    regex: Option<String>,

    /// An automaton specification file to load
    #[clap(short, long)]
    spec: Option<String>,

    /// The name of an embedded sample automaton to use
    #[clap(long)]
    sample: Option<String>,

    /// List the embedded sample automata and exit
    #[clap(long)]
    list_samples: bool,

    /// A word to test against the automaton; may be repeated
    #[clap(short, long)]
    word: Vec<String>,

    /// Determinize the automaton before testing or printing
    #[clap(short = 'd', long)]
    to_dfa: bool,

    /// Print the automaton as specification text
    #[clap(short, long)]
    print: bool,

    /// Print the automaton as JSON
    #[clap(short, long)]
    json: bool,

    /// Print the visited state sets for each tested word
    #[clap(short, long)]
    trace: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AutomatonError> {
    if cli.list_samples {
        for (index, name) in SampleManager::list_sample_names().iter().enumerate() {
            let info = SampleManager::get_sample_info(index)?;
            println!(
                "{}: {} ({}, {} states)",
                index, name, info.kind, info.state_count
            );
        }
        return Ok(());
    }

    let automaton = load_automaton(cli)?;
    let automaton = if cli.to_dfa {
        convert::determinize(&automaton)?
    } else {
        automaton
    };

    let alphabet = automaton
        .alphabet()
        .iter()
        .map(|symbol| symbol.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{} with {} states over alphabet {{{}}}",
        automaton.kind(),
        automaton.state_count(),
        alphabet
    );

    if cli.print {
        print!("{}", encoder::encode(&automaton));
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&automaton).map_err(|e| {
            AutomatonError::FileError(format!("Failed to serialize automaton: {}", e))
        })?;
        println!("{}", json);
    }

    for word in &cli.word {
        if cli.trace {
            trace_word(&automaton, word)?;
        } else {
            let verdict = if simulator::accepts(&automaton, word)? {
                "accepted"
            } else {
                "rejected"
            };
            println!("'{}': {}", word, verdict);
        }
    }

    Ok(())
}

fn load_automaton(cli: &Cli) -> Result<Automaton, AutomatonError> {
    match (&cli.regex, &cli.spec, &cli.sample) {
        (Some(pattern), None, None) => Ok(thompson::compile(&regex::parse(pattern)?)),
        (None, Some(path), None) => SpecLoader::load_spec(Path::new(path)),
        (None, None, Some(name)) => Ok(SampleManager::get_sample_by_name(name)?.automaton),
        _ => Err(AutomatonError::SemanticError(
            "Provide exactly one of --regex, --spec, or --sample".to_string(),
        )),
    }
}

fn trace_word(automaton: &Automaton, word: &str) -> Result<(), AutomatonError> {
    let mut run = Run::new(automaton);

    println!("'{}':", word);
    println!("  start {}", format_states(automaton, run.current_states()));

    for symbol in word.chars() {
        let states = run.step(symbol)?;
        println!("  {} -> {}", symbol, format_states(automaton, states));
    }

    let verdict = if run.is_accepting() {
        "accepted"
    } else {
        "rejected"
    };
    println!("  {}", verdict);
    Ok(())
}

fn format_states(automaton: &Automaton, states: &BTreeSet<StateId>) -> String {
    let labels: Vec<&str> = states
        .iter()
        .map(|&state| automaton.state_label(state))
        .collect();
    format!("{{{}}}", labels.join(", "))
}
