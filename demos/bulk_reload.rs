//! Snapshot a warm cache and reload it into a fresh one.
//!
//! ```sh
//! RUST_LOG=trace cargo run --example bulk_reload
//! ```

use gencache::{GenerationKind, SegmentedCache};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Stand-in for a backing store: the value of a key at a transaction id.
fn fetch(key: u64, tx: u64) -> Vec<u8> {
    let len = 16 + (key * 37 + tx) % 240;
    vec![(key % 251) as u8; len as usize]
}

fn print_generations(label: &str, cache: &SegmentedCache<u64, Vec<u8>, u64>) {
    println!("{label}: {} entries, {} / {}", cache.len(), cache.size(), cache.limit());
    for kind in [
        GenerationKind::Eden,
        GenerationKind::Protected,
        GenerationKind::Probation,
    ] {
        let generation = cache.generation(kind);
        println!(
            "  {:<9} {:>4} entries {:>6} / {:<6}",
            kind.name(),
            generation.len(),
            generation.size(),
            generation.limit()
        );
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let mut cache: SegmentedCache<u64, Vec<u8>, u64> = SegmentedCache::new(64 * 1024);

    // A skewed workload: low keys are read far more often than high ones.
    let mut tx = 1;
    for round in 0..20u64 {
        for key in 0..(50 + round * 20) {
            if cache.get(&key).is_none() {
                let _ = cache.insert(key, fetch(key, tx), tx);
            }
            if key % 7 == 0 {
                tx += 1;
            }
        }
        if round % 5 == 4 {
            cache.age_frequencies();
        }
    }
    print_generations("warm", &cache);

    let snapshot = cache.snapshot();
    println!("snapshot holds {} keys", snapshot.len());

    let mut reloaded: SegmentedCache<u64, Vec<u8>, u64> = SegmentedCache::new(64 * 1024);
    let admitted = reloaded
        .add_mrus(snapshot.iter().map(|&(key, tx)| (key, (fetch(key, tx), tx))))
        .len();
    println!("reloaded {admitted} of {} keys", snapshot.len());
    print_generations("reloaded", &reloaded);

    for (name, value) in cache.stats() {
        println!("{name:>24} {value:.3}");
    }
}
