use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use td_lineage::config::Config;
use td_lineage::indexer::{Corpus, Indexer};
use td_lineage::parser::{FileType, ParsedFile, parse_content};
use td_lineage::retriever::Retriever;
use td_lineage::vector_index::IndexStrategy;

fn synthetic_repository(files: usize) -> Vec<ParsedFile> {
    (0..files)
        .map(|i| {
            let content = format!(
                "CREATE TABLE stage.source_{i} (id INTEGER, amount_{i} DECIMAL(12,2));\n\
                 INSERT INTO mart.target_{i}\n\
                 SELECT s.id, SUM(s.amount_{i}) AS total_{i}\n\
                 FROM stage.source_{i} s JOIN ref.calendar c ON s.id = c.id\n\
                 GROUP BY s.id;\n\
                 UPDATE mart.target_{i} SET total_{i} = 0 WHERE id IS NULL;\n"
            );
            parse_content(&format!("etl/job_{i}.sql"), FileType::Sql, &content)
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let files = synthetic_repository(200);

    c.bench_function("corpus_build", |b| {
        b.iter(|| Corpus::build(black_box(&files), &Config::default()))
    });

    for strategy in [IndexStrategy::FlatL2, IndexStrategy::BruteForce] {
        let mut config = Config::default();
        config.retrieval.index_strategy = strategy;
        let indexer = Indexer::new(config);
        indexer.index(&files).expect("can index synthetic repository");
        let retriever = Retriever::new(&indexer);

        c.bench_function(&format!("fan_out_{strategy}"), |b| {
            b.iter(|| retriever.find_relevant_chunks(black_box("MART.TARGET_42"), black_box("TOTAL_42")))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
