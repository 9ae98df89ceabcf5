//! End-to-end tests: load or generate data, train, test, report.

use std::io::Write;

use prefetch_cluster::config::load_json;
use prefetch_cluster::{
    generate_request_dataset, Clusterer, Dataset, KMeans, KMeansParams, Metric,
    SelfOrganizingMap, SomParams, SomTestMode, TrainingState,
};

fn write_vectors(rows: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    for row in rows {
        writeln!(file, "{row}").expect("write");
    }
    file.flush().expect("flush");
    file
}

#[test]
fn kmeans_on_patterned_requests_beats_chance() {
    let data = generate_request_dataset(300, 100, 32, 4, 0.02, 17).unwrap();
    let mut km = KMeans::new(KMeansParams::with_k(8), &data)
        .unwrap()
        .with_seed(3);
    km.train().unwrap();
    assert_eq!(km.state(), TrainingState::Converged);

    let result = km.test().unwrap();
    let hitrate = result.hitrate_value().unwrap();
    let accuracy = result.accuracy_value().unwrap();
    // Requests follow one of four patterns; a trained prefetcher should catch most of them.
    assert!(hitrate > 0.5, "hitrate {hitrate}");
    assert!(accuracy > 0.5, "accuracy {accuracy}");
}

#[test]
fn som_on_patterned_requests_beats_chance() {
    let data = generate_request_dataset(200, 80, 32, 3, 0.02, 23).unwrap();
    let mut som = SelfOrganizingMap::new(SomParams::new(3, 30), &data)
        .unwrap()
        .with_seed(4);
    som.train().unwrap();

    let result = som.test().unwrap();
    let hitrate = result.hitrate_value().unwrap();
    assert!(hitrate > 0.5, "hitrate {hitrate}");
}

#[test]
fn som_training_parity_runs_on_aligned_sets() {
    let data = generate_request_dataset(60, 60, 16, 3, 0.05, 5).unwrap();
    let params = SomParams {
        test_mode: SomTestMode::TrainingParity,
        ..SomParams::new(2, 10)
    };
    let mut som = SelfOrganizingMap::new(params, &data).unwrap().with_seed(8);
    som.train().unwrap();
    let result = som.test().unwrap();
    assert!(result.counts.requests > 0);
}

#[test]
fn both_clusterers_share_the_interface() {
    let data = generate_request_dataset(50, 20, 8, 2, 0.05, 1).unwrap();
    let mut km = KMeans::new(KMeansParams::with_k(2), &data).unwrap().with_seed(1);
    let mut som = SelfOrganizingMap::new(SomParams::new(2, 5), &data)
        .unwrap()
        .with_seed(1);

    let clusterers: [&mut dyn Clusterer; 2] = [&mut km, &mut som];
    for clusterer in clusterers {
        clusterer.train().unwrap();
        let result = clusterer.test().unwrap();
        assert_eq!(clusterer.dimension(), 8);
        assert!(!clusterer.centroids().is_empty());
        assert!(clusterer.report().contains("Hitrate+Accuracy="));
        assert_ne!(result.hitrate, Metric::Undefined);
    }
}

#[test]
fn retraining_with_seed_reproduces_results() {
    let data = generate_request_dataset(80, 20, 16, 3, 0.05, 9).unwrap();
    let mut km = KMeans::new(KMeansParams::with_k(3), &data).unwrap().with_seed(77);

    km.train().unwrap();
    let first = (km.centroids().to_vec(), km.test().unwrap());
    km.train().unwrap();
    let second = (km.centroids().to_vec(), km.test().unwrap());
    assert_eq!(first, second);
}

#[test]
fn loads_vectors_from_files() {
    let train = write_vectors(&["# train", "1 0 1 0", "1 0 1 0", "0 1 0 1", "0,1,0,1"]);
    let test = write_vectors(&["1 0 1 0", "0 1 0 1"]);

    let data = Dataset::from_paths(train.path(), test.path()).unwrap();
    assert_eq!(data.dimension(), 4);
    assert_eq!(data.n_train(), 4);

    let mut km = KMeans::new(KMeansParams::with_k(2), &data)
        .unwrap()
        .with_initial_centroids(vec![vec![1.0, 0.0, 1.0, 0.0], vec![0.0, 1.0, 0.0, 1.0]])
        .unwrap();
    km.train().unwrap();
    let result = km.test().unwrap();
    assert_eq!(result.hitrate, Metric::Defined(1.0));
    assert_eq!(result.accuracy, Metric::Defined(1.0));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Dataset::from_paths("/nonexistent/train.txt", "/nonexistent/test.txt").unwrap_err();
    assert!(matches!(err, prefetch_cluster::ClusterError::Io(_)));
}

#[test]
fn params_load_from_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"k": 3, "prefetch_threshold": 0.4}}"#).unwrap();
    file.flush().unwrap();

    let params: KMeansParams = load_json(file.path()).unwrap();
    assert_eq!(params.k, 3);
    assert_eq!(params.prefetch_threshold, 0.4);
    assert_eq!(params.max_iterations, KMeansParams::default().max_iterations);
}
