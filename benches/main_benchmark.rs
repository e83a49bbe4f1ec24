use arfloat::{Arf, BigInt, Exp, Lfsr, Mag, RoundingMode};

use RoundingMode::NearestTiesToEven as rme;

fn big_operand(words: usize, seed: u32) -> Arf {
    let m = BigInt::pseudorandom(words, seed);
    Arf::from_bigint_2exp(false, &m, &Exp::from(-64 * words as i64))
}

fn test_mul() {
    let a = big_operand(150, 12345);
    let b = big_operand(150, 67890);
    black_box(a.mul(&b, 10000, rme));
}

fn test_div() {
    let a = big_operand(100, 12345);
    let b = big_operand(50, 67890);
    black_box(a.div(&b, 5000, rme));
}

fn test_sqrt() {
    let two = Arf::from_u64(2);
    black_box(two.sqrt(10000, rme));
}

fn test_add_far_apart() {
    let a = big_operand(100, 12345);
    let b = big_operand(100, 67890).mul_2exp_i64(-1_000_000);
    black_box(a.add(&b, 2000, rme));
}

fn test_addmul() {
    let mut acc = Arf::zero();
    let x = Arf::from_f64(0.1);
    for i in 0..1000 {
        let y = Arf::from_u64(i);
        black_box(acc.addmul_assign(&x, &y, 200, rme));
    }
}

fn test_mag_ops() {
    let mut lfsr = Lfsr::new();
    let mut acc = Mag::zero();
    for _ in 0..1000 {
        let x = Mag::randtest(&mut lfsr, 20);
        let y = Mag::randtest(&mut lfsr, 20);
        acc.addmul(&x, &y);
        acc = acc.add(&x.div(&y.add(&Mag::one())));
    }
    black_box(acc);
}

fn test_mag_fast_ops() {
    let mut lfsr = Lfsr::new();
    let mut acc = Mag::zero();
    for _ in 0..1000 {
        let x = Mag::randtest(&mut lfsr, 20);
        let y = Mag::randtest(&mut lfsr, 20);
        acc.fast_addmul(&x, &y);
    }
    black_box(acc);
}

fn test_bigint_div() {
    let a = BigInt::pseudorandom(1000, 12345);
    let b = BigInt::pseudorandom(500, 67890);
    black_box(a / b);
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("test_mul", |b| b.iter(test_mul));
    c.bench_function("test_div", |b| b.iter(test_div));
    c.bench_function("test_sqrt", |b| b.iter(test_sqrt));
    c.bench_function("test_add_far_apart", |b| b.iter(test_add_far_apart));
    c.bench_function("test_addmul", |b| b.iter(test_addmul));
    c.bench_function("test_mag_ops", |b| b.iter(test_mag_ops));
    c.bench_function("test_mag_fast_ops", |b| b.iter(test_mag_fast_ops));
    c.bench_function("test_bigint_div", |b| b.iter(test_bigint_div));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
