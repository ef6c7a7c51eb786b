use std::error::Error;
use std::time::Instant;

use clap::Parser;
use lsh_cluster::Cluster;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[clap(
    name = "lsh-cluster-threshold_acc",
    about = "A program to test how closely the clustering threshold follows the Jaccard similarity."
)]
struct Args {
    /// Number of random set pairs.
    #[clap(short = 'n', long, default_value = "1000")]
    num_pairs: usize,

    /// Members of random sets are drawn from 0..universe.
    #[clap(short = 'u', long, default_value = "10")]
    universe: u32,

    /// Maximum number of hash functions to be tested.
    #[clap(short = 'm', long, default_value = "30")]
    max_width: usize,

    /// Step of the tested thresholds in the range of (0,1).
    #[clap(short = 't', long, default_value = "0.05")]
    step: f64,

    /// Seed value for random values.
    #[clap(short = 's', long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let num_pairs = args.num_pairs;
    let universe = args.universe;
    let max_width = args.max_width;
    let step = args.step;

    if universe == 0 {
        return Err("universe must not be 0.".into());
    }
    if !(step > 0. && step < 1.) {
        return Err("step must be in the range of (0,1).".into());
    }

    let seed = args.seed.unwrap_or_else(rand::random::<u64>);
    let mut rng = rand_xoshiro::SplitMix64::seed_from_u64(seed);

    let pairs: Vec<_> = (0..num_pairs)
        .map(|_| {
            let x = random_set(&mut rng, universe);
            let y = random_set(&mut rng, universe);
            let jac_sim = lsh::jaccard_similarity(x.iter(), y.iter());
            (x, y, jac_sim)
        })
        .collect();

    let mut thresholds = vec![];
    let mut t = step;
    while t < 1. {
        thresholds.push(t);
        t += step;
    }

    println!("width,mean_absolute_error,never_split");

    eprintln!("Computing accuracy...");
    let start = Instant::now();

    for width in 1..=max_width {
        // Gap between the Jaccard similarity and the lowest separating threshold.
        let results: Vec<Option<f64>> = pairs
            .par_iter()
            .map(|(x, y, jac_sim)| {
                for &t in &thresholds {
                    let mut cluster = Cluster::new(width, t, Some(seed)).ok()?;
                    cluster.add_set_with_label(x, 0);
                    cluster.add_set_with_label(y, 1);
                    if cluster.sets().len() == 2 {
                        return Some((jac_sim - t).abs());
                    }
                }
                None
            })
            .collect();

        let errors: Vec<f64> = results.iter().flatten().copied().collect();
        let never_split = results.len() - errors.len();
        let mae = errors.iter().sum::<f64>() / errors.len().max(1) as f64;
        println!("{width},{mae},{never_split}");
    }
    eprintln!("Computed in {} sec", start.elapsed().as_secs_f64());

    Ok(())
}

fn random_set<R: Rng>(rng: &mut R, universe: u32) -> Vec<u32> {
    let n = rng.gen_range(5..20);
    let mut set: Vec<_> = (0..n).map(|_| rng.gen_range(0..universe)).collect();
    set.sort_unstable();
    set.dedup();
    set
}
