//! End-to-end tests for the ontc toolchain.
//!
//! These tests drive source text through the parser, the knowledge base
//! and the executor, checking program output and the notices a run leaves
//! behind.

use ontc::ast::error::ValidationError;
use ontc::config::Config;
use ontc::error::{ExecError, OntcError};
use ontc::exec::{run_source, NoticeKind, RunReport};
use ontc::ontology::{Database, Resource};
use ontc::syntax::SyntaxError;

fn run(source: &str) -> RunReport<Vec<u8>> {
    run_source(source, &Config::default(), Vec::new()).unwrap()
}

fn output(report: &RunReport<Vec<u8>>) -> &str {
    std::str::from_utf8(&report.output).unwrap()
}

#[test]
fn subclass_fact_is_checked_exactly() {
    let mut db = Database::new();
    let car = db.add_resource(Resource::new("car"));
    let vehicle = db.add_resource(Resource::new("vehicle"));
    let subclass_of = db.add_resource(Resource::new("subclassOf"));

    let fact = db.build_fact(subclass_of, &[car, vehicle]).unwrap();
    db.add_fact(fact).unwrap();

    let present = db.build_fact(subclass_of, &[car, vehicle]).unwrap();
    let reversed = db.build_fact(subclass_of, &[vehicle, car]).unwrap();
    assert!(db.check_fact(&present));
    assert!(!db.check_fact(&reversed));
}

#[test]
fn predecessor_runs_before_main() {
    let report = run(
        "fn main() { println(\"main\"); }
         fn setup() { println(\"setup\"); }
         main isPreceededBy setup;",
    );
    assert_eq!(output(&report), "setup\nmain\n");
    assert!(report.notices.is_empty());
}

#[test]
fn undefined_predecessor_is_skipped_with_notice() {
    let report = run(
        "fn main() { println(\"main\"); }
         main isPreceededBy setup;",
    );
    assert_eq!(output(&report), "main\n");
    assert_eq!(report.notices.len(), 1);
    assert_eq!(report.notices[0].kind, NoticeKind::UnresolvedObject);
}

#[test]
fn builtins_then_unknown_call() {
    let report = run(
        "fn main() {
             print(\"hi\");
             println(\"there\");
             unknown_fn();
             print(\"after\");
         }",
    );
    assert_eq!(output(&report), "hithere\nafter");
    assert_eq!(report.notices.len(), 1);
    assert_eq!(report.notices[0].kind, NoticeKind::UnknownFunction);
    assert_eq!(report.notices[0].to_string(), "[E] unknown function `unknown_fn`");
}

#[test]
fn missing_main_fails_validation() {
    let mut out = Vec::new();
    let err = run_source("fn helper() { println(\"x\"); }", &Config::default(), &mut out).unwrap_err();
    assert!(matches!(
        err,
        OntcError::Validation(ValidationError::EntryPointMissing { ref name }) if name == "main"
    ));
    assert_eq!(err.to_string(), "missing main function");
    assert!(out.is_empty());
}

#[test]
fn empty_program_fails_validation() {
    let err = run_source("  // nothing here\n", &Config::default(), Vec::new()).unwrap_err();
    assert!(matches!(err, OntcError::Validation(ValidationError::EmptyProgram)));
}

#[test]
fn test_message_precedes_predecessors() {
    let report = run(
        "fn main() { println(\"body\"); }
         fn setup() { println(\"setup\"); }
         main isPreceededBy setup;
         main printsATestMessageWhenCalled;",
    );
    assert_eq!(output(&report), "OXPL rocks!\nsetup\nbody\n");
}

#[test]
fn shared_predecessor_runs_once_per_reference() {
    let report = run(
        "fn main() {}
         fn a() { print(\"a\"); }
         fn b() { print(\"b\"); }
         fn log() { print(\"-\"); }
         main isPreceededBy a;
         main isPreceededBy b;
         a isPreceededBy log;
         b isPreceededBy log;",
    );
    assert_eq!(output(&report), "-a-b");
}

#[test]
fn predecessor_cycle_aborts() {
    let err = run_source(
        "fn main() {} main isPreceededBy main;",
        &Config::default(),
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, OntcError::Exec(ExecError::CyclicDependency { .. })));
}

#[test]
fn populated_database_holds_program_facts() {
    let report = run(
        "fn main() {}
         fn setup() {}
         main isPreceededBy setup;
         setup printsATestMessageWhenCalled;
         likes(main, setup);",
    );
    let db = &report.database;
    let main = db.find_resource("main").unwrap();
    let setup = db.find_resource("setup").unwrap();
    let preceded = db.find_resource("isPreceededBy").unwrap();

    // FOL-style facts are parsed but not loaded.
    assert_eq!(db.fact_count(), 2);
    assert!(db.find_resource("likes").is_none());

    let before: Vec<_> = db.query_triple(preceded, Some(main), None).unwrap().collect();
    assert_eq!(before, vec![setup]);
    let after: Vec<_> = db.query_triple(preceded, None, Some(setup)).unwrap().collect();
    assert_eq!(after, vec![main]);
}

#[test]
fn syntax_errors_carry_positions() {
    let err = run_source("fn main() {\n  print(\"open);\n}", &Config::default(), Vec::new()).unwrap_err();
    let OntcError::Syntax(syntax) = err else {
        panic!("expected a syntax error, got {err:?}");
    };
    assert!(matches!(syntax, SyntaxError::UnterminatedString { .. }));
    assert_eq!(syntax.position().0, 2);
}
