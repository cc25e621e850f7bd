// Copyright 2025 Stratum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Integration tests for `MemoryVectorIndex` and `VectorIndex`.

use std::collections::BTreeMap;

use stratum_vector::{MemoryVectorIndex, VectorError, VectorIndex, VectorRecord};

fn test_vector(dim: usize, value: f32) -> Vec<f32> {
    vec![value; dim]
}

fn record(id: &str, vector: Vec<f32>) -> VectorRecord {
    VectorRecord {
        id: id.to_string(),
        vector,
        text: format!("text for {id}"),
        metadata: BTreeMap::new(),
        parent_id: None,
        children_ids: Vec::new(),
    }
}

#[tokio::test]
async fn test_memory_vector_index_new() {
    let index = MemoryVectorIndex::new(384);

    assert_eq!(index.dimension(), 384);
    assert!(index.is_ready());
    assert_eq!(index.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_memory_vector_index_empty_search() {
    let index = MemoryVectorIndex::new(128);

    let query = test_vector(128, 0.5);
    let results = index.search(&query, 10).await.unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_insert_single_record() {
    let index = MemoryVectorIndex::new(64);

    index.insert(record("a", test_vector(64, 1.0))).await.unwrap();

    assert_eq!(index.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_insert_multiple_records() {
    let index = MemoryVectorIndex::new(32);

    for i in 0..10 {
        index.insert(record(&format!("r{i}"), test_vector(32, i as f32 / 10.0))).await.unwrap();
    }

    assert_eq!(index.count().await.unwrap(), 10);
}

#[tokio::test]
async fn test_insert_wrong_dimension() {
    let index = MemoryVectorIndex::new(64);

    let result = index.insert(record("a", test_vector(32, 1.0))).await;

    assert!(matches!(result, Err(VectorError::InvalidDimension { expected: 64, found: 32 })));
}

#[tokio::test]
async fn test_insert_duplicate_id_overwrites() {
    let index = MemoryVectorIndex::new(64);

    index.insert(record("a", test_vector(64, 1.0))).await.unwrap();
    index.insert(record("a", test_vector(64, 0.5))).await.unwrap();

    assert_eq!(index.count().await.unwrap(), 1);

    let query = test_vector(64, 0.5);
    let results = index.search(&query, 1).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "a");
}

#[tokio::test]
async fn test_insert_batch() {
    let index = MemoryVectorIndex::new(64);

    let records: Vec<_> = (0..10).map(|i| record(&format!("r{i}"), test_vector(64, i as f32 / 10.0))).collect();

    index.insert_batch(records).await.unwrap();

    assert_eq!(index.count().await.unwrap(), 10);
}

#[tokio::test]
async fn test_insert_batch_empty() {
    let index = MemoryVectorIndex::new(64);

    index.insert_batch(vec![]).await.unwrap();

    assert_eq!(index.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_insert_batch_wrong_dimension() {
    let index = MemoryVectorIndex::new(64);

    let records = vec![record("a", test_vector(64, 1.0)), record("b", test_vector(32, 1.0))];

    assert!(index.insert_batch(records).await.is_err());
}

#[tokio::test]
async fn test_search_k_nearest() {
    let index = MemoryVectorIndex::new(64);

    for i in 0..10 {
        index.insert(record(&format!("r{i}"), test_vector(64, i as f32 / 10.0))).await.unwrap();
    }

    let query = test_vector(64, 0.9);
    let results = index.search(&query, 3).await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[0].score >= results[1].score);
    assert!(results[1].score >= results[2].score);
}

#[tokio::test]
async fn test_search_query_wrong_dimension() {
    let index = MemoryVectorIndex::new(64);

    let query = test_vector(32, 0.5);
    assert!(index.search(&query, 10).await.is_err());
}

#[tokio::test]
async fn test_search_k_larger_than_count() {
    let index = MemoryVectorIndex::new(64);

    index.insert(record("a", test_vector(64, 1.0))).await.unwrap();

    let query = test_vector(64, 0.9);
    let results = index.search(&query, 100).await.unwrap();

    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_cosine_similarity_identical() {
    let index = MemoryVectorIndex::new(3);
    let vector = vec![0.4, 0.5, 0.6];
    index.insert(record("a", vector.clone())).await.unwrap();

    let results = index.search(&vector, 1).await.unwrap();

    assert_eq!(results.len(), 1);
    assert!((results[0].score - 1.0).abs() < 0.001);
}

#[tokio::test]
async fn test_cosine_similarity_orthogonal() {
    let index = MemoryVectorIndex::new(2);

    let v1 = vec![1.0, 0.0];
    let v2 = vec![0.0, 1.0];

    index.insert(record("a", v2)).await.unwrap();

    let results = index.search(&v1, 1).await.unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].score < 0.01);
}

#[tokio::test]
async fn test_remove_existing_record() {
    let index = MemoryVectorIndex::new(64);

    index.insert(record("a", test_vector(64, 1.0))).await.unwrap();
    assert_eq!(index.count().await.unwrap(), 1);

    index.remove("a").await.unwrap();
    assert_eq!(index.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_remove_nonexistent_record_is_not_an_error() {
    let index = MemoryVectorIndex::new(64);

    index.remove("missing").await.unwrap();
    assert_eq!(index.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_remove_then_search() {
    let index = MemoryVectorIndex::new(64);

    index.insert(record("a", test_vector(64, 1.0))).await.unwrap();
    index.insert(record("b", test_vector(64, 0.5))).await.unwrap();

    index.remove("a").await.unwrap();

    let query = test_vector(64, 1.0);
    let results = index.search(&query, 10).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "b");
}

#[tokio::test]
async fn test_crud_cycle() {
    let index = MemoryVectorIndex::new(3);

    let vector = vec![0.1, 0.2, 0.3];
    index.insert(record("a", vector.clone())).await.unwrap();

    let results = index.search(&vector, 1).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "a");

    let new_vector = vec![0.3, 0.2, 0.1];
    index.insert(record("a", new_vector.clone())).await.unwrap();
    let results = index.search(&new_vector, 1).await.unwrap();
    assert_eq!(results[0].id, "a");

    index.remove("a").await.unwrap();
    assert_eq!(index.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_large_scale_operations() {
    let index = MemoryVectorIndex::new(16);

    let num_records = 500;
    for i in 0..num_records {
        let vector: Vec<f32> = (0..16).map(|j| ((i * 7 + j) % 13) as f32 / 13.0).collect();
        index.insert(record(&format!("r{i}"), vector)).await.unwrap();
    }

    assert_eq!(index.count().await.unwrap(), num_records);

    let query = vec![0.5; 16];
    let results = index.search(&query, 10).await.unwrap();

    assert_eq!(results.len(), 10);
    for result in &results {
        assert!(result.score >= 0.0 && result.score <= 1.0);
    }
}

#[tokio::test]
async fn test_concurrent_operations() {
    use std::sync::Arc;
    let index = Arc::new(MemoryVectorIndex::new(64));

    let mut insert_handles = Vec::new();
    let mut search_handles = Vec::new();

    for i in 0..50 {
        let index_clone = index.clone();
        insert_handles.push(tokio::spawn(async move {
            index_clone.insert(record(&format!("r{i}"), test_vector(64, i as f32))).await
        }));
    }

    for _ in 0..20 {
        let index_clone = index.clone();
        search_handles.push(tokio::spawn(async move {
            let query = test_vector(64, 0.5);
            index_clone.search(&query, 5).await
        }));
    }

    for handle in insert_handles {
        handle.await.expect("task failed").expect("insert failed");
    }
    for handle in search_handles {
        let _ = handle.await.expect("task failed");
    }

    assert_eq!(index.count().await.unwrap(), 50);
}

#[test]
fn test_dimension_zero() {
    let index = MemoryVectorIndex::new(0);
    assert_eq!(index.dimension(), 0);
}

#[tokio::test]
async fn test_empty_vector_insert() {
    let index = MemoryVectorIndex::new(0);

    let result = index.insert(record("a", vec![])).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_search_with_k_zero() {
    let index = MemoryVectorIndex::new(64);

    index.insert(record("a", test_vector(64, 1.0))).await.unwrap();

    let query = test_vector(64, 0.5);
    let results = index.search(&query, 0).await.unwrap();

    assert_eq!(results.len(), 0);
}

#[tokio::test]
async fn test_search_result_carries_parent_and_children() {
    let index = MemoryVectorIndex::new(2);

    let mut rec = record("child", vec![1.0, 0.0]);
    rec.parent_id = Some("parent-1".to_string());
    rec.children_ids = vec!["grandchild-1".to_string(), "grandchild-2".to_string()];
    index.insert(rec).await.unwrap();

    let results = index.search(&[1.0, 0.0], 1).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].parent_id.as_deref(), Some("parent-1"));
    assert_eq!(results[0].children_ids, vec!["grandchild-1", "grandchild-2"]);
}

#[tokio::test]
async fn test_clear_removes_everything() {
    let index = MemoryVectorIndex::new(64);

    index.insert(record("a", test_vector(64, 1.0))).await.unwrap();
    index.insert(record("b", test_vector(64, 0.5))).await.unwrap();

    index.clear().await.unwrap();
    assert_eq!(index.count().await.unwrap(), 0);
}
