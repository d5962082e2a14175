//! Evaluate a [`PerceptronPredictor`] and some baseline predictors against
//! one or more traces.

use clap::error::ErrorKind;
use clap::{ CommandFactory, Parser };
use perceptron_bp::*;
use perceptron_bp::eval::*;
use perceptron_bp::stats::*;
use std::process;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "evaluate-perceptron",
    about = "Compare a perceptron predictor against baseline predictors"
)]
struct Args {
    /// JSON evaluation config (defaults are used when omitted)
    #[arg(long)]
    config: Option<String>,

    /// Also evaluate a synthetic microbenchmark with this many records
    #[arg(long, value_name = "RECORDS")]
    synthetic: Option<usize>,

    /// Binary trace files
    files: Vec<String>,
}

impl Args {
    /// Fail when there is nothing to evaluate.
    fn check(self) -> std::result::Result<Self, clap::Error> {
        if self.files.is_empty() && self.synthetic.is_none() {
            return Err(Self::command().error(ErrorKind::MissingRequiredArgument,
                "expected trace files or --synthetic <RECORDS>"
            ));
        }
        Ok(self)
    }
}

fn print_stats(name: &str, stat: &BranchStats) {
    println!("  {:20} Global hit rate: {}/{} ({:.2}% correct) ({} misses, {:.2} MPKB)",
        name,
        stat.global_hits(),
        stat.global_brns(),
        stat.hit_rate() * 100.0,
        stat.global_miss(),
        stat.mpkb(),
    );
}

fn run_trace(cfg: &EvalConfig, trace: &BinaryTrace) -> Result<()> {
    println!("[*] {}, {} records", trace.name(), trace.num_entries());
    let records = trace.as_slice();

    for mut p in cfg.build_all()? {
        let stat = evaluate(p.as_mut(), records, cfg.record_unconditional);
        print_stats(p.name(), &stat);
    }

    // Run the perceptron again on its own to report training statistics
    let mut perceptron = cfg.perceptron.clone().build()?;
    let start = Instant::now();
    let stat = evaluate(&mut perceptron, records, cfg.record_unconditional);
    let done = start.elapsed();

    let pstat = perceptron.stats();
    println!("  Perceptron training:");
    println!("    {} updates, {} trained ({:.2}%), {} skipped",
        pstat.updates, pstat.trained, pstat.training_rate() * 100.0,
        pstat.skipped,
    );
    println!("    ... simulated in {:.3?}", done);

    println!("  Unique branches: {}", stat.num_unique_branches());
    println!("  Low hit-rate branches:");
    for (pc, data) in stat.get_low_rate_branches(4, 100, 0.55) {
        println!("    {:016x} {:8}/{:8} {:.4}",
            pc, data.hits, data.occ, data.hit_rate()
        );
    }
    println!();
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let cfg = match &args.config {
        Some(path) => EvalConfig::from_json_file(path)?,
        None => EvalConfig::default(),
    };
    // Surface configuration errors before any trace is read
    cfg.perceptron.validate()?;

    let p = &cfg.perceptron;
    println!("[*] Perceptron configuration:");
    println!("      {} perceptrons, {} history bits, threshold {}",
        p.n_perceptron, p.history_length, p.effective_threshold()
    );
    println!("      Storage bits: {}b, {:.2}KiB",
        p.storage_bits(), p.storage_bits() as f64 / 1024.0 / 8.0
    );
    println!();

    if let Some(n) = args.synthetic {
        let records = microbenchmark(0).generate(n);
        run_trace(&cfg, &BinaryTrace::from_records("synthetic", records))?;
    }

    let traces = BinaryTraceSet::new_from_slice(&args.files);
    for trace in traces {
        run_trace(&cfg, &trace?)?;
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse().check().unwrap_or_else(|e| e.exit());
    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_flags_and_trace_files() {
        let args = Args::try_parse_from([
            "evaluate-perceptron", "--config", "cfg.json", "a.bin", "b.bin",
        ]).unwrap().check().unwrap();
        assert_eq!(args.config.as_deref(), Some("cfg.json"));
        assert_eq!(args.synthetic, None);
        assert_eq!(args.files, vec!["a.bin", "b.bin"]);

        let args = Args::try_parse_from(["evaluate-perceptron", "--synthetic", "1000"])
            .unwrap().check().unwrap();
        assert_eq!(args.synthetic, Some(1000));
        assert!(args.files.is_empty());
    }

    #[test]
    fn requires_traces_or_synthetic() {
        let err = Args::try_parse_from(["evaluate-perceptron"]).unwrap()
            .check().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Args::try_parse_from(["evaluate-perceptron", "--synthetic", "x"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}
