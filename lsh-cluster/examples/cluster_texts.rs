use lsh_cluster::shingling::{ShingleConfig, Shingler};
use lsh_cluster::Cluster;

fn main() {
    let documents = vec![
        "Welcome to Jimbocho, the town of books and curry!",
        "Welcome to Jimbocho, the city of books and curry!",
        "We welcome you to Jimbocho, the town of books and curry.",
        "Welcome to the town of books and curry, Jimbocho!",
        "Curry rice is a popular dish in Japan.",
    ];

    // Extracts character trigrams (with seed value 42 for hashing shingles).
    let mut shingler = Shingler::new(ShingleConfig::new(3, None, 42).unwrap());
    let items: Vec<_> = documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let mut feature = vec![];
            shingler.extract(doc, &mut feature);
            (feature, i)
        })
        .collect();

    // Clusters documents whose Jaccard similarity is roughly above 0.6,
    // with 20 hash functions and seed value 42.
    let mut cluster = Cluster::new(20, 0.6, Some(42)).unwrap();
    println!(
        "bandwidth={}, num_bands={}, threshold={:.3}",
        cluster.bandwidth(),
        cluster.num_bands(),
        cluster.threshold()
    );
    cluster.add_sets_in_parallel(items).unwrap();

    for set in cluster.sets() {
        let docs: Vec<_> = set.iter().map(|&i| documents[i]).collect();
        println!("{docs:?}");
    }
}
