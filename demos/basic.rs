//! Basic example demonstrating kmeans-space usage
//!
//! Run with: RUST_LOG=debug cargo run --example basic --release

use kmeans_space::{KMeansConfig, SeedStrategy, Space};
use ndarray::{array, Array1};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== kmeans-space example ===\n");

    // 3 clusters in 2D for easy visualization
    let n_samples = 300;
    let centers = [array![-5.0, -5.0], array![0.0, 5.0], array![5.0, -5.0]];

    let mut space: Space<usize> = Space::new(2)?.with_config(KMeansConfig::new(42));
    for i in 0..n_samples {
        let cluster_idx = i % centers.len();
        let noise = Array1::random(2, Uniform::new(-1.0f64, 1.0));
        space.add_point_with(&centers[cluster_idx] + &noise, cluster_idx)?;
    }

    println!("True cluster centers:");
    for (i, center) in centers.iter().enumerate() {
        println!("  Cluster {}: ({:.2}, {:.2})", i, center[0], center[1]);
    }
    println!();

    let result = space.solve_detailed(3, SeedStrategy::KMeansPlusPlus, |_, clusters| {
        let sizes: Vec<usize> = clusters.iter().map(|c| c.len()).collect();
        println!("  sizes before round: {:?}", sizes);
    })?;

    println!(
        "\nConverged after {} moving rounds (SSE {:.3})\n",
        result.n_iterations,
        space.total_sse(&result.clusters)?
    );

    for (i, cluster) in result.clusters.iter().enumerate() {
        let c = cluster.centroid();
        println!(
            "  Centroid {}: ({:.4}, {:.4}) with {} points",
            i,
            c.coordinate(0)?,
            c.coordinate(1)?,
            cluster.len()
        );
    }

    // Geographic clustering
    println!("\nGeographic clustering:");
    let mut cities: Space<&str> = Space::geographic(1.0)?
        .with_config(KMeansConfig::new(7).with_max_iters(Some(100)));
    for (name, lat, lon) in [
        ("Paris", 48.8566, 2.3522),
        ("Berlin", 52.5200, 13.4050),
        ("Madrid", 40.4168, -3.7038),
        ("Tokyo", 35.6762, 139.6503),
        ("Seoul", 37.5665, 126.9780),
        ("Osaka", 34.6937, 135.5023),
    ] {
        cities.add_point_with(vec![lat, lon], name)?;
    }

    let clusters = cities.solve(2, SeedStrategy::KMeansPlusPlus)?;
    for (i, cluster) in clusters.iter().enumerate() {
        let names: Vec<&str> = cluster
            .members()
            .filter_map(|id| cities.payload(id).copied())
            .collect();
        println!("  Region {}: {:?}", i, names);
    }

    println!("\n=== Done! ===");
    Ok(())
}
