use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use minidex::index::SeedIndex;
use minidex::io::hits::{HitFormat, HitWriter};
use minidex::io::SequenceSet;
use minidex::overlap::{self, OverlapOpt};
use minidex::seed::{sketch_batch, SketchParams};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "minidex", author, version, about = "Minimizer seed index for long-read overlap detection", arg_required_else_help = true)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Worker threads (0 = all cores)
    #[arg(short = 't', long = "threads", default_value_t = 0, global = true)]
    threads: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct SketchArgs {
    /// k-mer size
    #[arg(short = 'k', long, default_value_t = 30)]
    kmer: usize,
    /// Minimizer window size (in k-mers)
    #[arg(short = 'w', long, default_value_t = 80)]
    window: usize,
    /// Bases skipped between sampled k-mer positions (spaced seeds)
    #[arg(long, default_value_t = 0)]
    spacing: usize,
    /// Sketch the forward strand only
    #[arg(long = "no-rc")]
    no_rc: bool,
    /// Homopolymer-compress bases before hashing
    #[arg(long)]
    hpc: bool,
    /// Longest homopolymer run folded into one symbol (0 = unlimited)
    #[arg(long = "hpc-len", default_value_t = 10)]
    hpc_len: usize,
}

impl SketchArgs {
    fn params(&self) -> SketchParams {
        SketchParams {
            k: self.kmer,
            w: self.window,
            spacing: self.spacing,
            use_rc: !self.no_rc,
            use_hpc: self.hpc,
            max_hpc_len: self.hpc_len,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sketch sequences and report seed counts and seed frequency statistics
    Sketch {
        /// FASTA / FASTQ / FOFN inputs
        #[arg(required = true)]
        inputs: Vec<String>,
        #[command(flatten)]
        sketch: SketchArgs,
        /// Top fraction of seed frequencies used to derive the cutoff
        #[arg(long = "freq-percentile", default_value_t = 0.0002)]
        freq_percentile: f64,
    },
    /// Collect seed hits between queries and targets (all-vs-all if no queries are given)
    Overlap {
        /// Target FASTA / FASTQ / FOFN inputs
        #[arg(required = true)]
        targets: Vec<String>,
        /// Query inputs; targets are used when omitted
        #[arg(long = "query")]
        queries: Vec<String>,
        #[command(flatten)]
        sketch: SketchArgs,
        #[arg(long = "freq-percentile", default_value_t = 0.0002)]
        freq_percentile: f64,
        /// Fixed seed frequency cutoff (0 = unlimited); overrides --freq-percentile
        #[arg(long = "freq-cutoff")]
        freq_cutoff: Option<usize>,
        /// Keep hits of a sequence against itself in all-vs-all mode
        #[arg(long = "keep-self")]
        keep_self: bool,
        /// Queries processed per block (bounds memory held by pending hits)
        #[arg(long = "batch-size", default_value_t = 1_000)]
        batch_size: usize,
        /// Output format: tsv or bincode
        #[arg(short = 'f', long = "format", default_value = "tsv")]
        format: HitFormat,
        /// Output path (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("failed to configure the thread pool")?;
    }

    match cli.command {
        Commands::Sketch { inputs, sketch, freq_percentile } => {
            run_sketch(&inputs, sketch.params(), freq_percentile)
        }
        Commands::Overlap {
            targets,
            queries,
            sketch,
            freq_percentile,
            freq_cutoff,
            keep_self,
            batch_size,
            format,
            out,
        } => {
            let opt = OverlapOpt {
                sketch: sketch.params(),
                freq_percentile,
                freq_cutoff,
                skip_self: !keep_self,
                format,
                batch_size,
            };
            run_overlap(&targets, &queries, out.as_deref(), opt)
        }
    }
}

fn run_sketch(inputs: &[String], params: SketchParams, freq_percentile: f64) -> Result<()> {
    params.validate()?;
    let seqs = SequenceSet::load(inputs)?;
    if seqs.is_empty() {
        anyhow::bail!("inputs contain no sequences");
    }

    let per_seq = sketch_batch(&seqs.id_seq_pairs(), &params)?;
    for (id, seeds) in per_seq.iter().enumerate() {
        let id = id as u32;
        println!(
            "{}\t{}\t{}",
            seqs.name(id).unwrap_or("*"),
            seqs.seq(id).map_or(0, <[u8]>::len),
            seeds.len()
        );
    }

    let index = SeedIndex::new(&seqs, per_seq.concat());
    let stats = index.compute_frequency_stats(freq_percentile)?;
    println!("sequences: {}", seqs.len());
    println!("total_len: {}", seqs.total_bases());
    println!("seeds: {}", index.len());
    println!("distinct_keys: {}", index.num_keys());
    println!("freq_max: {}", stats.max);
    println!("freq_avg: {:.2}", stats.avg);
    println!("freq_median: {:.1}", stats.median);
    println!("freq_cutoff: {}", stats.cutoff);
    Ok(())
}

fn run_overlap(targets: &[String], queries: &[String], out_path: Option<&str>, opt: OverlapOpt) -> Result<()> {
    let target_set = SequenceSet::load(targets)?;
    if target_set.is_empty() {
        anyhow::bail!("target inputs contain no sequences");
    }
    let query_set = if queries.is_empty() { None } else { Some(SequenceSet::load(queries)?) };

    let out: Box<dyn std::io::Write> = match out_path {
        Some(p) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(p).with_context(|| format!("cannot create output '{}'", p))?,
        )),
        None => Box::new(std::io::BufWriter::new(std::io::stdout())),
    };
    let mut writer = HitWriter::new(out, opt.format);
    let summary = overlap::find_overlaps(&target_set, query_set.as_ref(), &opt, &mut writer)?;
    writer.finish()?;

    log::info!(
        "done: {} targets, {} queries, {} hits (cutoff {})",
        summary.targets,
        summary.queries,
        summary.hits,
        summary.freq_cutoff
    );
    Ok(())
}
