use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use lsh_cluster::shingling::{ShingleConfig, Shingler};
use lsh_cluster::{Cluster, DEFAULT_THRESHOLD, DEFAULT_WIDTH};
use rand::{RngCore, SeedableRng};

#[derive(Parser, Debug)]
#[clap(
    name = "lsh-cluster",
    about = "A program to cluster near-duplicate documents in the Jaccard space."
)]
struct Args {
    /// File path to a document file to be clustered, one document per line.
    #[clap(short = 'i', long)]
    document_path: PathBuf,

    /// Jaccard similarity threshold in the range of (0,1).
    #[clap(short = 't', long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Number of hash functions in a MinHash signature. The larger this value,
    /// the more accurate the approximation, but the more time it takes.
    #[clap(short = 'n', long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Delimiter for recognizing words as tokens in feature extraction.
    /// If None, characters are used for tokens.
    #[clap(short = 'd', long)]
    delimiter: Option<char>,

    /// Window size for w-shingling in feature extraction (must be more than 0).
    #[clap(short = 'w', long, default_value = "3")]
    window_size: usize,

    /// Seed value for random values.
    #[clap(short = 's', long)]
    seed: Option<u64>,

    /// Disables parallel construction.
    #[clap(short = 'p', long)]
    disable_parallel: bool,

    /// Prints only clusters with two or more documents.
    #[clap(short = 'm', long)]
    multiple_only: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let document_path = args.document_path;
    let threshold = args.threshold;
    let width = args.width;
    let delimiter = args.delimiter;
    let window_size = args.window_size;
    let disable_parallel = args.disable_parallel;
    let multiple_only = args.multiple_only;

    let mut seeder =
        rand_xoshiro::SplitMix64::seed_from_u64(args.seed.unwrap_or_else(rand::random::<u64>));

    let config = ShingleConfig::new(window_size, delimiter, seeder.next_u64())?;
    let mut shingler = Shingler::new(config);

    let items = {
        eprintln!("Loading documents and extracting features...");
        let start = Instant::now();
        let mut items = vec![];
        for (i, document) in BufReader::new(File::open(&document_path)?)
            .lines()
            .enumerate()
        {
            let mut feature = vec![];
            shingler.extract(document?, &mut feature);
            items.push((feature, i));
        }
        eprintln!(
            "Extracted {} features in {} sec",
            items.len(),
            start.elapsed().as_secs_f64()
        );
        items
    };

    let mut cluster =
        Cluster::new(width, threshold, Some(seeder.next_u64()))?.shows_progress(true);
    eprintln!(
        "Banding with {} bands of {} rows, for the threshold {}",
        cluster.num_bands(),
        cluster.bandwidth(),
        cluster.threshold()
    );

    eprintln!("Clustering documents...");
    let start = Instant::now();
    if disable_parallel {
        cluster.add_sets(items)?;
    } else {
        cluster.add_sets_in_parallel(items)?;
    }
    let mut sets = cluster.sets();
    eprintln!(
        "Produced {} clusters from {} buckets in {} sec",
        sets.len(),
        cluster.num_buckets(),
        start.elapsed().as_secs_f64()
    );

    sets.iter_mut().for_each(|s| s.sort_unstable());
    sets.sort_unstable();

    println!("cluster,line");
    for (c, set) in sets
        .iter()
        .filter(|s| !multiple_only || s.len() > 1)
        .enumerate()
    {
        for line in set {
            println!("{c},{line}");
        }
    }

    Ok(())
}
