use criterion::{criterion_group, criterion_main, BenchmarkGroup, Criterion};
use zidx::api::{build_indexes, IndexParams, IndexStore, MasterKey};

const DOC_COUNT: usize = 1_000;
const KEYWORDS_PER_DOC: usize = 10;
const KEYWORD_UNIVERSE: usize = 200;
const PRF_BITS: usize = 16;
const FP_RATE: f64 = 0.001;

fn criterion_benchmark(c: &mut Criterion) {
  let mut group = c.benchmark_group("zidx");

  println!("Setting up document batch for benchmarking...");
  let params = IndexParams::from_rates(FP_RATE, KEYWORDS_PER_DOC, PRF_BITS)
    .unwrap();
  let key = MasterKey::generate(PRF_BITS, params.hash_count()).unwrap();
  let documents = bench_documents(DOC_COUNT, KEYWORDS_PER_DOC);
  println!("Setup complete, starting benchmarks");

  group.sample_size(10);
  _bench_index_build(&mut group, &key, &params, &documents);
  _bench_search(&mut group, &key, &params, &documents);
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn _bench_index_build(
  c: &mut BenchmarkGroup<criterion::measurement::WallTime>,
  key: &MasterKey,
  params: &IndexParams,
  documents: &[(String, Vec<String>)],
) {
  c.bench_function(
    format!(
      "build indexes, docs: {}, keywords/doc: {}, m: {}, r: {}",
      documents.len(),
      KEYWORDS_PER_DOC,
      params.filter_len(),
      params.hash_count(),
    ),
    |b| {
      b.iter(|| build_indexes(key, params, documents).unwrap());
    },
  );
}

fn _bench_search(
  c: &mut BenchmarkGroup<criterion::measurement::WallTime>,
  key: &MasterKey,
  params: &IndexParams,
  documents: &[(String, Vec<String>)],
) {
  let mut store = IndexStore::new();
  for (document_id, filter) in build_indexes(key, params, documents).unwrap()
  {
    store.insert(document_id, filter);
  }
  let trapdoor = key.trapdoor("keyword-0").unwrap();

  c.bench_function(
    format!(
      "search, docs: {}, m: {}, r: {}",
      store.len(),
      params.filter_len(),
      params.hash_count(),
    ),
    |b| {
      b.iter(|| store.search(&trapdoor).unwrap());
    },
  );
}

fn bench_documents(
  doc_count: usize,
  keywords_per_doc: usize,
) -> Vec<(String, Vec<String>)> {
  (0..doc_count)
    .map(|i| {
      let keywords = (0..keywords_per_doc)
        .map(|j| format!("keyword-{}", (i * 7 + j) % KEYWORD_UNIVERSE))
        .collect();
      (format!("doc{}", i), keywords)
    })
    .collect()
}
