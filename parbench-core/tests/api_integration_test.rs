// Интеграционные тесты для HTTP сервера бенчмарка
//
// Сервер поднимается на 127.0.0.1:0 с уменьшенной нагрузкой и опрашивается
// настоящим HTTP клиентом.

use parbench_core::{api::ApiServer, config::Config, run_daemon};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::watch;

fn small_config(workers: usize) -> Config {
    Config {
        parallelism: Some(2),
        workers,
        sequence_len: 10_000,
        runs: 20,
        addr: "127.0.0.1:0".parse().unwrap(),
    }
}

async fn start_server(config: Config) -> parbench_core::api::ApiServerHandle {
    let config = Arc::new(config);
    let pool = Arc::new(config.build_pool().expect("pool"));
    ApiServer::new(config, pool)
        .start()
        .await
        .expect("server should start")
}

#[tokio::test]
async fn test_benchmark_report_over_http() {
    let handle = start_server(small_config(4)).await;
    let url = format!("http://{}/", handle.local_addr());

    let response = Client::new().get(&url).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body = response.text().await.unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 7, "unexpected report: {body}");
    assert_eq!(lines[0], "Test Results (across 20 runs):");
    assert!(lines[1].starts_with("Logical CPUs="));
    assert!(lines[1].ends_with("Parallelism ceiling: 2"));
    assert_eq!(lines[2], "Number of workers: 4");
    assert!(lines[3].starts_with("Average: "));
    assert!(lines[4].starts_with("Median:  "));
    assert!(lines[5].starts_with("Min:     "));
    assert!(lines[6].starts_with("Max:     "));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_requests_each_get_full_report() {
    let handle = start_server(small_config(2)).await;
    let url = format!("http://{}/", handle.local_addr());
    let client = Client::new();

    let requests = (0..4).map(|_| {
        let client = client.clone();
        let url = url.clone();
        tokio::spawn(async move { client.get(&url).send().await?.text().await })
    });

    for request in requests.collect::<Vec<_>>() {
        let body = request.await.unwrap().unwrap();
        assert!(body.starts_with("Test Results (across 20 runs):"));
        assert!(body.contains("Number of workers: 2"));
    }

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_run_daemon_stops_on_shutdown_signal() {
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let daemon = tokio::spawn(run_daemon(small_config(1), shutdown_rx));

    shutdown_tx.send(()).unwrap();
    let result = daemon.await.unwrap();
    assert!(result.is_ok(), "daemon failed: {result:?}");
}

#[tokio::test]
async fn test_run_daemon_fails_when_address_taken() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let config = Config {
        addr: occupied.local_addr().unwrap(),
        ..small_config(1)
    };

    let (_shutdown_tx, shutdown_rx) = watch::channel(());
    let result = run_daemon(config, shutdown_rx).await;

    let err = result.expect_err("bind on an occupied port must fail");
    assert!(err.to_string().contains("Failed to bind"));
}
