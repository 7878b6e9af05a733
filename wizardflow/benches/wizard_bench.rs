//! Benchmarks for wizard sessions.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wizardflow::core::{can_transition, WizardState};
use wizardflow::events::CollectingObserver;
use wizardflow::machine::WorkflowStateMachine;
use wizardflow::testing::drive_to;
use std::sync::Arc;

fn transition_table_benchmark(c: &mut Criterion) {
    c.bench_function("can_transition_all_pairs", |b| {
        b.iter(|| {
            let mut allowed = 0;
            for from in WizardState::ALL {
                for to in WizardState::ALL {
                    if can_transition(black_box(from), black_box(to)) {
                        allowed += 1;
                    }
                }
            }
            allowed
        });
    });
}

fn session_benchmark(c: &mut Criterion) {
    c.bench_function("happy_path_then_reset", |b| {
        let mut machine = WorkflowStateMachine::new();
        b.iter(|| {
            let _ = drive_to(&mut machine, WizardState::WorkflowReady);
            machine.reset();
        });
    });

    c.bench_function("happy_path_collecting", |b| {
        b.iter(|| {
            let observer = Arc::new(CollectingObserver::new());
            let mut machine = WorkflowStateMachine::new().with_observer(observer.clone());
            let _ = drive_to(&mut machine, WizardState::WorkflowReady);
            black_box(observer.len())
        });
    });
}

criterion_group!(benches, transition_table_benchmark, session_benchmark);
criterion_main!(benches);
