//! Client tests: HTTP probes against an in-process stub server, slice reads
//! against NetCDF files written on the fly.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use dap_client::{DapClient, DapClientConfig, DapError, RetryPolicy};
use test_utils::dap::{grads_dds, grads_not_available, write_analysis_file, FILL_VALUE};
use test_utils::{StubResponse, StubServer};

const DATASET: &str = "/dods/akrtma/akrtma20240615/akrtma_anl_12z";

fn fast_client(max_retries: u32) -> DapClient {
    DapClient::new(DapClientConfig {
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        retry: RetryPolicy {
            max_retries,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
        },
    })
    .unwrap()
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn analysis_file(dir: &tempfile::TempDir, times: &[DateTime<Utc>]) -> PathBuf {
    let path = dir.path().join("akrtma_anl_12z.nc");
    let mut values = Vec::new();
    for (i, _) in times.iter().enumerate() {
        let base = 280.0 + 10.0 * i as f32;
        values.extend([base, base + 1.0, base + 2.0, base + 3.0, base + 4.0, FILL_VALUE as f32]);
    }
    write_analysis_file(&path, times, &[58.0, 58.5], &[205.0, 205.5, 206.0], &[("tmp2m", values)])
        .unwrap();
    path
}

// ============================================================================
// Slice reads
// ============================================================================

#[tokio::test]
async fn test_read_slice_from_netcdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = analysis_file(&dir, &[noon()]);

    let slice = fast_client(0)
        .read_slice(path.to_str().unwrap(), "tmp2m", noon())
        .await
        .unwrap();

    assert_eq!(slice.valid_time, noon());
    assert_eq!(slice.lats, vec![58.0, 58.5]);
    assert_eq!(slice.lons, vec![205.0, 205.5, 206.0]);
    assert_eq!(&slice.values[..5], &[280.0, 281.0, 282.0, 283.0, 284.0]);
    assert_eq!(slice.values[5], FILL_VALUE as f32);
    let fill = slice.fill_value.unwrap();
    assert!((fill - FILL_VALUE).abs() <= FILL_VALUE * 1e-6);
}

#[tokio::test]
async fn test_read_slice_picks_the_matching_time() {
    let dir = tempfile::tempdir().unwrap();
    let earlier = noon() - ChronoDuration::hours(1);
    let path = analysis_file(&dir, &[earlier, noon()]);
    let location = path.to_str().unwrap().to_string();
    let client = fast_client(0);

    let slice = client.read_slice(&location, "tmp2m", noon()).await.unwrap();
    assert_eq!(slice.valid_time, noon());
    assert_eq!(slice.values[0], 290.0);

    // no slice at 13Z: the first one comes back, stamped with its own time
    let later = noon() + ChronoDuration::hours(1);
    let slice = client.read_slice(&location, "tmp2m", later).await.unwrap();
    assert_eq!(slice.valid_time, earlier);
}

#[tokio::test]
async fn test_read_missing_variable_is_permanent() {
    let dir = tempfile::tempdir().unwrap();
    let path = analysis_file(&dir, &[noon()]);

    let err = fast_client(3)
        .read_slice(path.to_str().unwrap(), "dpt2m", noon())
        .await
        .unwrap_err();
    assert!(matches!(err, DapError::Missing(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_read_unopenable_location_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.nc");
    let err = fast_client(0)
        .read_slice(path.to_str().unwrap(), "tmp2m", noon())
        .await
        .unwrap_err();
    assert!(matches!(err, DapError::NetCdf { .. }));
}

#[tokio::test]
async fn test_local_file_availability() {
    let dir = tempfile::tempdir().unwrap();
    let path = analysis_file(&dir, &[noon()]);
    let client = fast_client(0);

    assert!(client.probe(path.to_str().unwrap()).await.unwrap());
    let absent = dir.path().join("akrtma_anl_11z.nc");
    assert!(!client.probe(absent.to_str().unwrap()).await.unwrap());
}

// ============================================================================
// HTTP probes and retries
// ============================================================================

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let server = StubServer::start(move |_| {
        if seen.fetch_add(1, Ordering::SeqCst) < 2 {
            StubResponse::status(503)
        } else {
            StubResponse::ok(grads_dds("akrtma_anl_12z"))
        }
    })
    .await
    .unwrap();

    let client = fast_client(3);
    assert!(client.probe(&server.url(DATASET)).await.unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(server.count_matching("akrtma_anl_12z.dds"), 3);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let server = StubServer::start(|_| StubResponse::status(502)).await.unwrap();

    let client = fast_client(2);
    let err = client.probe(&server.url(DATASET)).await.unwrap_err();
    match err {
        DapError::RetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, DapError::Status { status: 502, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn test_permanent_failures_are_not_retried() {
    let server = StubServer::start(|_| StubResponse::status(403)).await.unwrap();

    let client = fast_client(5);
    let err = client.probe(&server.url(DATASET)).await.unwrap_err();
    assert!(matches!(err, DapError::Status { status: 403, .. }));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_missing_dataset_is_unpublished() {
    let server = StubServer::start(|target| {
        if target.contains("anl_12z") {
            StubResponse::ok(grads_not_available("akrtma/akrtma20240615/akrtma_anl_12z"))
        } else {
            StubResponse::status(404)
        }
    })
    .await
    .unwrap();

    let client = fast_client(3);
    assert!(!client.probe(&server.url(DATASET)).await.unwrap());
    assert!(!client
        .probe(&server.url("/dods/akrtma/akrtma20240615/akrtma_anl_11z"))
        .await
        .unwrap());
    // not-found answers are never retried
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    let url = {
        let server = StubServer::start(|_| StubResponse::status(200)).await.unwrap();
        server.url(DATASET)
    };
    // give the aborted listener a moment to close
    tokio::time::sleep(Duration::from_millis(20)).await;

    let client = fast_client(1);
    let err = client.probe(&url).await.unwrap_err();
    assert!(err.is_transient());
}
