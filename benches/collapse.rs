use criterion::{Criterion, black_box, criterion_group, criterion_main};

use treedeps::{English, GrammaticalStructure, SynTree};

const SIMPLE: &str = "(ROOT (S (NP (NNP Clinton)) (VP (VBD defeated) (NP (NNP Dole))) (. .)))";

const COMPLEX: &str = "(ROOT (S (NP (NP (DT The) (NN book)) (SBAR (WHNP (WDT that)) (S (NP (PRP you)) \
  (VP (VBD bought))))) (VP (VBD was) (VP (VBN sent) (PP (PP (TO to) (NP (NNP Greece))) (CC and) \
  (PP (IN from) (NP (NNP Serbia)))) (PP (IN because) (IN of) (NP (DT the) (NN rain))))) (. .)))";

fn collapse(tree: &SynTree<String, String>) -> usize {
  let gs = GrammaticalStructure::new(tree, English::global()).unwrap();
  gs.typed_dependencies_cc_processed(true).len()
}

fn criterion_benchmark(c: &mut Criterion) {
  let simple = SIMPLE.parse::<SynTree<String, String>>().unwrap();
  let complex = COMPLEX.parse::<SynTree<String, String>>().unwrap();
  // build the shared catalog outside the timed loop
  English::global();

  c.bench_function("collapse simple", |b| b.iter(|| collapse(black_box(&simple))));

  c.bench_function("collapse relative clause and conjoined pps", |b| {
    b.iter(|| collapse(black_box(&complex)))
  });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
