use std::path::Path;
use std::time::{Duration, Instant};

use connect4::{Engine, ACTION_SPACE_SIZE, INPUT_SIZE};
use coordinator::{Coordinator, CoordinatorOptions};
use model::{Network, WeightBundle};
use self_play::SelfPlayOptions;
use tokio::net::TcpListener;
use trainer::WeightSink;
use worker::{Worker, WorkerOptions};

fn self_play_options() -> SelfPlayOptions {
    SelfPlayOptions {
        simulations: 4,
        max_plies: 6,
        ..SelfPlayOptions::default()
    }
}

fn worker_options(coordinator_url: String) -> WorkerOptions {
    WorkerOptions {
        coordinator_url,
        hidden_size: 8,
        fetch_timeout_secs: 2,
        report_timeout_secs: 2,
        ..WorkerOptions::default()
    }
}

async fn start_coordinator(dir: &Path) -> (Coordinator, String) {
    let coordinator = Coordinator::open(&CoordinatorOptions {
        weights_path: dir.join("latest.json"),
        triplets_path: dir.join("triplets.json"),
        ..CoordinatorOptions::default()
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let app = coordinator.router();
    tokio::spawn(async move { axum::serve(listener, app).await });

    (coordinator, url)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unreachable_coordinator_uses_default_weights() {
    let worker = Worker::new(
        Engine::new(),
        worker_options("http://127.0.0.1:9".to_string()),
        self_play_options(),
    );

    let iteration = worker.run_iteration().await.unwrap();

    assert!(iteration.default_weights);
    assert_eq!(iteration.version, 0);
    assert_eq!(iteration.reported, None);
    assert!(iteration.plies > 0 && iteration.plies <= 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_iteration_reports_to_coordinator() {
    let dir = tempfile::tempdir().unwrap();
    let (coordinator, url) = start_coordinator(dir.path()).await;
    let worker = Worker::new(Engine::new(), worker_options(url), self_play_options());

    let iteration = worker.run_iteration().await.unwrap();

    assert!(iteration.default_weights);
    assert_eq!(iteration.reported, Some(iteration.plies));
    assert_eq!(coordinator.state().triplets.len(), iteration.plies);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_iteration_uses_published_weights() {
    let dir = tempfile::tempdir().unwrap();
    let (coordinator, url) = start_coordinator(dir.path()).await;
    let worker = Worker::new(Engine::new(), worker_options(url), self_play_options());

    let mut bundle = Network::with_seed(INPUT_SIZE, 8, ACTION_SPACE_SIZE, 11).to_bundle();
    bundle.version = 3;
    coordinator.state().weights.publish(bundle).unwrap();

    let iteration = worker.run_iteration().await.unwrap();

    assert!(!iteration.default_weights);
    assert_eq!(iteration.version, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_mismatched_weights_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (coordinator, url) = start_coordinator(dir.path()).await;
    let worker = Worker::new(Engine::new(), worker_options(url), self_play_options());

    let bundle = WeightBundle::new(Network::with_seed(5, 8, 3, 11).to_bundle().parameters, 2);
    coordinator.state().weights.publish(bundle).unwrap();

    let iteration = worker.run_iteration().await.unwrap();

    assert!(iteration.default_weights);
    assert_eq!(iteration.version, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_stops_after_the_iteration_passing_the_deadline() {
    let worker = Worker::new(
        Engine::new(),
        worker_options("http://127.0.0.1:9".to_string()),
        self_play_options(),
    );
    let deadline = Duration::from_millis(300);
    let start = Instant::now();

    let iterations = worker.run_for(Some(deadline)).await.unwrap();

    assert!(iterations >= 1);
    assert!(start.elapsed() >= deadline);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_with_elapsed_duration_plays_nothing() {
    let options = WorkerOptions {
        duration_mins: Some(0),
        ..worker_options("http://127.0.0.1:9".to_string())
    };
    let worker = Worker::new(Engine::new(), options, self_play_options());

    assert_eq!(worker.run_for(Some(Duration::ZERO)).await.unwrap(), 0);
    worker.run().await.unwrap();
}
