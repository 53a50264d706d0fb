use super::*;

fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|v| v * v).sum::<f32>().sqrt()
}

fn sample_corpus() -> Vec<&'static str> {
    vec![
        "INSERT INTO orders SELECT * FROM stg_orders",
        "CREATE TABLE customers (id INT)",
        "SELECT amount FROM orders",
        "DELETE FROM audit_log",
    ]
}

#[test]
fn tokenize_lowercases_and_splits_on_whitespace() {
    assert_eq!(
        tokenize("INSERT  INTO\tOrders\n(id)"),
        vec!["insert", "into", "orders", "(id)"]
    );
    assert!(tokenize("   ").is_empty());
}

#[test]
fn vocabulary_uses_first_seen_order() {
    let embedder = TfIdfEmbedder::fitted(&["b a", "a c B"]);

    assert_eq!(embedder.dimension(), 3);
    assert_eq!(embedder.token_index("b"), Some(0));
    assert_eq!(embedder.token_index("a"), Some(1));
    assert_eq!(embedder.token_index("c"), Some(2));
    assert_eq!(embedder.token_index("B"), None);
}

#[test]
fn idf_uses_binary_document_frequency() {
    let embedder = TfIdfEmbedder::fitted(&["orders orders orders", "orders customers", "items", "sales"]);

    let orders = embedder.idf("orders").expect("orders is in the vocabulary");
    let customers = embedder.idf("customers").expect("customers is in the vocabulary");

    assert!((orders - (4.0_f64 / 3.0).ln()).abs() < 1e-12);
    assert!((customers - 2.0_f64.ln()).abs() < 1e-12);
    assert_eq!(embedder.document_count(), 4);
}

#[test]
fn embed_dimension_matches_vocabulary() {
    let embedder = TfIdfEmbedder::fitted(&sample_corpus());

    for text in sample_corpus() {
        assert_eq!(embedder.embed(text).len(), embedder.dimension());
    }
    assert_eq!(embedder.embed("unrelated words").len(), embedder.dimension());
    assert_eq!(embedder.embed("").len(), embedder.dimension());
}

#[test]
fn embed_is_l2_normalized() {
    let embedder = TfIdfEmbedder::fitted(&sample_corpus());
    let vector = embedder.embed("customers orders");

    assert!((l2_norm(&vector) - 1.0).abs() < 1e-6);
}

#[test]
fn embed_weights_follow_term_frequency() {
    let embedder = TfIdfEmbedder::fitted(&["orders customers", "orders", "items", "sales"]);
    let vector = embedder.embed("orders orders customers");

    let orders = vector[embedder.token_index("orders").expect("known token")] as f64;
    let customers = vector[embedder.token_index("customers").expect("known token")] as f64;
    let expected_ratio = (2.0 / 3.0 * (4.0_f64 / 3.0).ln()) / (1.0 / 3.0 * 2.0_f64.ln());

    assert!((orders / customers - expected_ratio).abs() < 1e-5);
}

#[test]
fn out_of_vocabulary_text_is_zero_vector() {
    let embedder = TfIdfEmbedder::fitted(&sample_corpus());
    let vector = embedder.embed("completely unknown tokens");

    assert!(vector.iter().all(|v| *v == 0.0));
}

#[test]
fn out_of_vocabulary_tokens_dilute_but_do_not_add_dimensions() {
    let embedder = TfIdfEmbedder::fitted(&sample_corpus());
    let plain = embedder.embed("customers");
    let noisy = embedder.embed("customers zzz yyy");

    assert_eq!(plain.len(), noisy.len());
    assert_eq!(plain, noisy);
}

#[test]
fn embedding_is_deterministic() {
    let embedder = TfIdfEmbedder::fitted(&sample_corpus());
    let first = embedder.embed("SELECT amount FROM orders");
    let second = embedder.embed("SELECT amount FROM orders");

    let first_bits: Vec<u32> = first.iter().map(|v| v.to_bits()).collect();
    let second_bits: Vec<u32> = second.iter().map(|v| v.to_bits()).collect();
    assert_eq!(first_bits, second_bits);
}

#[test]
fn empty_corpus_yields_zero_length_vectors() {
    let embedder = TfIdfEmbedder::fitted::<&str>(&[]);

    assert_eq!(embedder.dimension(), 0);
    assert!(embedder.embed("anything at all").is_empty());
}

#[test]
fn unfitted_embedder_yields_zero_length_vectors() {
    let embedder = TfIdfEmbedder::new();
    assert!(embedder.embed("orders").is_empty());
}

#[test]
fn refit_replaces_vocabulary() {
    let mut embedder = TfIdfEmbedder::fitted(&sample_corpus());
    let before = embedder.dimension();

    embedder.fit(&["tiny corpus"]);

    assert!(embedder.dimension() < before);
    assert_eq!(embedder.dimension(), 2);
    assert_eq!(embedder.token_index("orders"), None);
    assert_eq!(embedder.embed("orders tiny").len(), 2);
}

#[test]
fn embed_all_preserves_order() {
    let embedder = TfIdfEmbedder::fitted(&sample_corpus());
    let vectors = embedder.embed_all(&sample_corpus());

    assert_eq!(vectors.len(), 4);
    assert_eq!(vectors[2], embedder.embed(sample_corpus()[2]));
}
