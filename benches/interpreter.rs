//! Benchmarks for parsing, knowledge-base queries and execution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ontc::config::Config;
use ontc::exec::run_source;
use ontc::ontology::{Database, Resource};

/// A `main` preceded by a chain of `depth` functions.
fn chain_program(depth: usize) -> String {
    let mut source = String::from("fn main() { println(\"main\"); }\n");
    let mut previous = "main".to_string();
    for i in 0..depth {
        let name = format!("step{i}");
        source.push_str(&format!("fn {name}() {{ print(\".\"); }}\n"));
        source.push_str(&format!("{previous} isPreceededBy {name};\n"));
        previous = name;
    }
    source
}

fn bench_parse(c: &mut Criterion) {
    let source = chain_program(100);
    c.bench_function("parse_chain_100", |bench| {
        bench.iter(|| black_box(ontc::syntax::parse_program(&source).unwrap()))
    });
}

fn bench_run(c: &mut Criterion) {
    let source = chain_program(100);
    let config = Config::default();
    c.bench_function("run_chain_100", |bench| {
        bench.iter(|| black_box(run_source(&source, &config, std::io::sink()).unwrap()))
    });
}

fn bench_query(c: &mut Criterion) {
    let mut db = Database::new();
    let rel = db.add_resource(Resource::new("subclassOf"));
    let top = db.add_resource(Resource::new("thing"));
    for i in 0..1_000 {
        let r = db.add_resource(Resource::new(format!("r{i}")));
        let fact = db.build_fact(rel, &[r, top]).unwrap();
        db.add_fact(fact).unwrap();
    }
    c.bench_function("query_triple_1k", |bench| {
        bench.iter(|| black_box(db.query_triple(rel, None, Some(top)).unwrap().count()))
    });
}

criterion_group!(benches, bench_parse, bench_run, bench_query);
criterion_main!(benches);
