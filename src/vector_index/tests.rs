use super::*;

/// Unit vectors at the given angles (degrees) in the plane
fn at_angles(angles: &[f32]) -> Vec<Vec<f32>> {
    angles
        .iter()
        .map(|a| {
            let radians = a.to_radians();
            vec![radians.cos(), radians.sin()]
        })
        .collect()
}

fn ranked_positions(index: &dyn NearestNeighborIndex, query: &[f32], k: usize) -> Vec<usize> {
    index.search(query, k).iter().map(|n| n.position).collect()
}

#[test]
fn create_index_honours_strategy() {
    assert_eq!(
        create_index(IndexStrategy::FlatL2).strategy(),
        IndexStrategy::FlatL2
    );
    assert_eq!(
        create_index(IndexStrategy::BruteForce).strategy(),
        IndexStrategy::BruteForce
    );
    assert_eq!(IndexStrategy::default(), IndexStrategy::FlatL2);
}

#[test]
fn strategies_agree_on_normalized_vectors() {
    let vectors = at_angles(&[70.0, 5.0, 160.0, 45.0, 20.0, 110.0]);
    let query = at_angles(&[0.0]).remove(0);

    let mut flat = create_index(IndexStrategy::FlatL2);
    let mut brute = create_index(IndexStrategy::BruteForce);
    flat.add(vectors.clone()).expect("flat index loads");
    brute.add(vectors).expect("brute-force index loads");

    let expected = vec![1, 4, 3, 0, 5, 2];
    assert_eq!(ranked_positions(flat.as_ref(), &query, 6), expected);
    assert_eq!(ranked_positions(brute.as_ref(), &query, 6), expected);
    assert_eq!(ranked_positions(flat.as_ref(), &query, 3), vec![1, 4, 3]);
    assert_eq!(ranked_positions(brute.as_ref(), &query, 3), vec![1, 4, 3]);
}

#[test]
fn strategies_keep_insertion_order_for_duplicates() {
    let vectors = vec![
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 0.0],
        vec![0.0, 1.0],
    ];

    for strategy in [IndexStrategy::FlatL2, IndexStrategy::BruteForce] {
        let mut index = create_index(strategy);
        index.add(vectors.clone()).expect("index loads");
        assert_eq!(
            ranked_positions(index.as_ref(), &[1.0, 0.0], 4),
            vec![1, 2, 0, 3],
            "strategy {strategy}"
        );
    }
}

#[test]
fn empty_load_is_allowed() {
    for strategy in [IndexStrategy::FlatL2, IndexStrategy::BruteForce] {
        let mut index = create_index(strategy);
        index.add(Vec::new()).expect("empty load succeeds");
        assert!(index.is_empty());
        assert!(index.search(&[], 5).is_empty());
    }
}

#[test]
fn common_dimension_reports_first_offender() {
    assert_eq!(common_dimension(&[]), Ok(None));
    assert_eq!(common_dimension(&[vec![1.0, 2.0], vec![3.0, 4.0]]), Ok(Some(2)));
    assert_eq!(
        common_dimension(&[vec![1.0], vec![1.0], vec![]]),
        Err(IndexError::DimensionMismatch {
            expected: 1,
            actual: 0,
            position: 2,
        })
    );
}

#[test]
fn strategy_serializes_as_snake_case() {
    let json = serde_json::to_string(&IndexStrategy::BruteForce).expect("can serialize");
    assert_eq!(json, "\"brute_force\"");
    assert_eq!(IndexStrategy::FlatL2.to_string(), "flat_l2");
}
