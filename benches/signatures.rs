//! Benchmarks for generic signature resolution.
//!
//! Tests resolution performance for various signature shapes:
//! - Generic-free trees (borrowed passthrough)
//! - Single parameter substitution
//! - Nested generic instantiations
//! - Deep pointer chains close to the recursion limit
//! - Method signatures with type and method parameters

extern crate dotshield;

use criterion::{criterion_group, criterion_main, Criterion};
use dotshield::{
    analysis::generics::{resolve_method_with_method_args, resolve_type},
    metadata::{
        signatures::{SignatureMethod, SignatureParameter, TypeSignature},
        token::Token,
    },
};
use std::hint::black_box;

const LIST: Token = Token(0x0100_0010);
const DICTIONARY: Token = Token(0x0100_0011);

/// Benchmark a tree without generic parameters.
/// Signature: Dictionary<string, List<int32>>[]
fn bench_resolve_passthrough(c: &mut Criterion) {
    let sig = TypeSignature::sz_array(TypeSignature::generic_inst(
        TypeSignature::Class(DICTIONARY),
        vec![
            TypeSignature::String,
            TypeSignature::generic_inst(TypeSignature::Class(LIST), vec![TypeSignature::I4]),
        ],
    ));
    let args = [TypeSignature::Object];

    c.bench_function("resolve_passthrough", |b| {
        b.iter(|| {
            let resolved = resolve_type(black_box(&sig), black_box(&args)).unwrap();
            black_box(resolved)
        });
    });
}

/// Benchmark a single parameter substitution.
/// Signature: !0
fn bench_resolve_single_var(c: &mut Criterion) {
    let sig = TypeSignature::GenericParamType(0);
    let args = [TypeSignature::String];

    c.bench_function("resolve_single_var", |b| {
        b.iter(|| {
            let resolved = resolve_type(black_box(&sig), black_box(&args)).unwrap();
            black_box(resolved)
        });
    });
}

/// Benchmark nested instantiations with parameters at every level.
/// Signature: Dictionary<!0, List<List<!1>>>
fn bench_resolve_nested_inst(c: &mut Criterion) {
    let list_of = |inner| TypeSignature::generic_inst(TypeSignature::Class(LIST), vec![inner]);
    let sig = TypeSignature::generic_inst(
        TypeSignature::Class(DICTIONARY),
        vec![
            TypeSignature::GenericParamType(0),
            list_of(list_of(TypeSignature::GenericParamType(1))),
        ],
    );
    let args = [TypeSignature::I8, TypeSignature::R8];

    c.bench_function("resolve_nested_inst", |b| {
        b.iter(|| {
            let resolved = resolve_type(black_box(&sig), black_box(&args)).unwrap();
            black_box(resolved)
        });
    });
}

/// Benchmark a pointer chain at the default depth limit.
/// Signature: !0*** (99 levels)
fn bench_resolve_deep_chain(c: &mut Criterion) {
    let mut sig = TypeSignature::GenericParamType(0);
    for _ in 1..100 {
        sig = TypeSignature::ptr(sig);
    }
    let args = [TypeSignature::I4];

    c.bench_function("resolve_deep_chain", |b| {
        b.iter(|| {
            let resolved = resolve_type(black_box(&sig), black_box(&args)).unwrap();
            black_box(resolved)
        });
    });
}

/// Benchmark a method signature.
/// Signature: !!0 Method<!!0>(!0, !0[], int32)
fn bench_resolve_method(c: &mut Criterion) {
    let sig = SignatureMethod {
        has_this: true,
        param_count_generic: 1,
        param_count: 3,
        return_type: SignatureParameter::new(TypeSignature::GenericParamMethod(0)),
        params: vec![
            SignatureParameter::new(TypeSignature::GenericParamType(0)),
            SignatureParameter::new(TypeSignature::sz_array(TypeSignature::GenericParamType(0))),
            SignatureParameter::new(TypeSignature::I4),
        ],
        ..Default::default()
    };
    let type_args = [TypeSignature::String];
    let method_args = [TypeSignature::Boolean];

    c.bench_function("resolve_method", |b| {
        b.iter(|| {
            let resolved = resolve_method_with_method_args(
                black_box(&sig),
                black_box(&type_args),
                black_box(&method_args),
            )
            .unwrap();
            black_box(resolved)
        });
    });
}

criterion_group!(
    benches,
    bench_resolve_passthrough,
    bench_resolve_single_var,
    bench_resolve_nested_inst,
    bench_resolve_deep_chain,
    bench_resolve_method,
);
criterion_main!(benches);
