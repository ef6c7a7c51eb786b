use std::error::Error;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use clap::Parser;
use hashbrown::HashSet;
use lsh::MinHasher;
use lsh_cluster::shingling::{ShingleConfig, Shingler};
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[clap(
    name = "lsh-cluster-minhash_acc",
    about = "A program to test accuracy in MinHash similarity estimation."
)]
struct Args {
    /// File path to a document file, one document per line.
    #[clap(short = 'i', long)]
    document_path: PathBuf,

    /// Delimiter for recognizing words as tokens in feature extraction.
    /// If None, characters are used for tokens.
    #[clap(short = 'd', long)]
    delimiter: Option<char>,

    /// Window size for w-shingling in feature extraction (must be more than 0).
    #[clap(short = 'w', long, default_value = "1")]
    window_size: usize,

    /// Maximum number of hash functions to be tested.
    #[clap(short = 'n', long, default_value = "100")]
    max_width: usize,

    /// Seed value for random values.
    #[clap(short = 's', long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let document_path = args.document_path;
    let delimiter = args.delimiter;
    let window_size = args.window_size;
    let max_width = args.max_width;

    if max_width == 0 {
        return Err("max_width must not be 0.".into());
    }

    let mut seeder =
        rand_xoshiro::SplitMix64::seed_from_u64(args.seed.unwrap_or_else(rand::random::<u64>));

    let config = ShingleConfig::new(window_size, delimiter, seeder.next_u64())?;
    let mut shingler = Shingler::new(config);

    let features = {
        eprintln!("Loading documents and extracting features...");
        let start = Instant::now();
        let mut features = vec![];
        for document in BufReader::new(File::open(document_path)?).lines() {
            let mut feature = vec![];
            shingler.extract(document?, &mut feature);
            features.push(feature);
        }
        eprintln!(
            "Extracted {} features in {} sec",
            features.len(),
            start.elapsed().as_secs_f64()
        );
        features
    };
    if features.len() < 2 {
        return Err("At least two documents are needed.".into());
    }

    let signatures = {
        eprintln!("Producing signatures...");
        let start = Instant::now();
        let hasher = MinHasher::new(max_width, seeder.next_u64());
        let signatures: Vec<_> = features
            .par_iter()
            .map(|feature| hasher.sign_features(feature))
            .collect();
        eprintln!("Produced in {} sec", start.elapsed().as_secs_f64());
        signatures
    };

    let jac_sims = {
        let possible_pairs = features.len() * (features.len() - 1) / 2;
        eprintln!("Computing exact Jaccard similarities for {possible_pairs} pairs...");
        let start = Instant::now();
        let processed = AtomicUsize::new(0);
        let jac_sims: Vec<Vec<f64>> = (0..features.len())
            .into_par_iter()
            .map(|i| {
                let cnt = processed.fetch_add(1, Ordering::Relaxed) + 1;
                if cnt % 100 == 0 {
                    eprintln!("Processed {cnt} features...");
                }
                let x = &features[i];
                features
                    .iter()
                    .skip(i + 1)
                    .map(|y| lsh::jaccard_similarity(x.iter(), y.iter()))
                    .collect()
            })
            .collect();
        eprintln!("Computed in {} sec", start.elapsed().as_secs_f64());
        jac_sims
    };

    let thresholds = vec![0.5, 0.8, 0.9];
    let mut header = "width,mean_absolute_error".to_string();
    for &t in &thresholds {
        write!(header, ",precision_{t}")?;
        write!(header, ",recall_{t}")?;
        write!(header, ",f1_{t}")?;
    }
    println!("{header}");

    eprintln!("Computing accuracy...");
    let start = Instant::now();

    for width in 1..=max_width {
        let mut sum_error = 0.;
        let mut num_pairs = 0;
        let mut true_results: Vec<_> = (0..thresholds.len()).map(|_| HashSet::new()).collect();
        let mut appx_results: Vec<_> = (0..thresholds.len()).map(|_| HashSet::new()).collect();

        for (i, sims) in jac_sims.iter().enumerate() {
            let x = &signatures[i].values()[..width];
            for (k, &jac_sim) in sims.iter().enumerate() {
                let j = i + 1 + k;
                let y = &signatures[j].values()[..width];
                let est_sim = estimate(x, y);
                sum_error += (jac_sim - est_sim).abs();
                num_pairs += 1;

                for (l, &t) in thresholds.iter().enumerate() {
                    if jac_sim >= t {
                        true_results[l].insert((i, j));
                    }
                    if est_sim >= t {
                        appx_results[l].insert((i, j));
                    }
                }
            }
        }

        let mae = sum_error / num_pairs as f64;
        let mut body = format!("{width},{mae}");
        for (tr, ar) in true_results.iter().zip(appx_results.iter()) {
            let (p, r, f) = prf(tr, ar);
            write!(body, ",{p},{r},{f}")?;
        }
        println!("{body}");
    }
    eprintln!("Computed in {} sec", start.elapsed().as_secs_f64());

    Ok(())
}

fn estimate(xs: &[u64], ys: &[u64]) -> f64 {
    let agree = xs.iter().zip(ys.iter()).filter(|(x, y)| x == y).count();
    agree as f64 / xs.len() as f64
}

fn prf(tr: &HashSet<(usize, usize)>, ar: &HashSet<(usize, usize)>) -> (f64, f64, f64) {
    let true_positive = tr.intersection(ar).count() as f64;
    let false_positive = ar.len() as f64 - true_positive;
    let false_negative = tr.len() as f64 - true_positive;
    let precision = true_positive / (true_positive + false_positive);
    let recall = true_positive / (true_positive + false_negative);
    let f1 = (2. * precision * recall) / (precision + recall);
    (precision, recall, f1)
}
