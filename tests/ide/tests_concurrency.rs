//! Snapshots under concurrent edits and requests.

use std::sync::Arc;
use std::thread;

use crate::helpers::model_helpers::*;
use crate::helpers::source_fixtures::*;
use modelgen::ide::{AnalysisHost, ExtractionRequest, ModelCache};

#[test]
fn test_parallel_requests_share_a_snapshot() {
    let host = AnalysisHost::new(shop_config());
    host.set_file_content(FILE, CALLS_AND_TYPES, Some(1));
    let analysis = host.analysis();
    let expected = extract_whole(CALLS_AND_TYPES);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let analysis = analysis.clone();
            thread::spawn(move || {
                analysis
                    .extract(&ExtractionRequest::new(FILE, whole(CALLS_AND_TYPES)))
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_edits_do_not_disturb_running_snapshots() {
    let host = Arc::new(AnalysisHost::new(shop_config()));
    host.set_file_content(FILE, SERVICE_TWO_RESOURCES, Some(1));
    let snapshot = host.analysis();

    let writer = {
        let host = host.clone();
        thread::spawn(move || {
            for version in 2..20 {
                let source = if version % 2 == 0 {
                    MAIN_TWO_PARAMS
                } else {
                    SERVICE_UNINVOKED_CLIENT
                };
                host.set_file_content(FILE, source, Some(version));
            }
        })
    };

    let request = ExtractionRequest::new(FILE, whole(SERVICE_TWO_RESOURCES)).with_version(1);
    for _ in 0..20 {
        let model = snapshot.extract(&request).unwrap();
        assert_eq!(model.entities[0].id, "acme:shop:orders");
    }
    writer.join().unwrap();

    assert_eq!(host.analysis().document(FILE).unwrap().version(), Some(19));
}

#[test]
fn test_cache_is_shared_between_threads() {
    let host = AnalysisHost::new(shop_config());
    host.set_file_content(FILE, SERVICE_UNINVOKED_CLIENT, None);
    let analysis = host.analysis();
    let cache = Arc::new(ModelCache::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let analysis = analysis.clone();
            let cache = cache.clone();
            thread::spawn(move || {
                cache
                    .get_or_extract(
                        &analysis,
                        &ExtractionRequest::new(FILE, whole(SERVICE_UNINVOKED_CLIENT)),
                    )
                    .unwrap()
            })
        })
        .collect();
    let models: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(cache.len(), 1);
    assert!(models.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_batch_responses_keep_request_order() {
    let host = AnalysisHost::new(shop_config());
    host.set_file_content(FILE, CALLS_AND_TYPES, Some(1));
    let requests = vec![
        ExtractionRequest::new(FILE, modelgen::Span::from_coords(16, 10, 16, 10)),
        ExtractionRequest::new("missing.bal", modelgen::Span::from_coords(0, 0, 0, 0)),
        ExtractionRequest::new(FILE, modelgen::Span::from_coords(7, 10, 7, 10)),
    ];

    let responses = host.analysis().respond_all(&requests);
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0].model.as_ref().unwrap().entities[0].label, "load");
    assert!(responses[1].error.is_some());
    assert_eq!(responses[2].model.as_ref().unwrap().entities[0].label, "main");
}
