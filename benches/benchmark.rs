use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use small_lp::{default_solver, variables, Expression, LinearProgram, Session, SessionConfig};

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("sum((2 x_i + 1) for i in [1..100_000])", |b| {
        b.iter(|| {
            let mut vars = variables!();
            let v: Expression = (0..100_000)
                .map(|_i| {
                    let x_i = vars.add_variable();
                    black_box(2) * black_box(x_i) + black_box(1)
                })
                .sum();
            v
        })
    });

    let program = LinearProgram::reference();
    let mut session = Session::open(SessionConfig::default().label("bench"));
    c.bench_function("solving the two variable program", |b| {
        b.iter(|| {
            program
                .solve_with(&mut session, default_solver)
                .map(|solved| solved.objective)
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
