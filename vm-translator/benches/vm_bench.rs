//! Translation throughput benchmarks for the hot parse/emit paths.
//!
//! Run with:
//! ```bash
//! cargo bench --bench vm_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use vm_translator::code_writer::CodeWriter;
use vm_translator::parser::Parser;

const ARITHMETIC_SOURCE: &str = "\
push constant 7
push constant 8
add
push constant 3
sub
eq
";

const CALL_HEAVY_SOURCE: &str = "\
function Main.fibonacci 0
push argument 0
push constant 2
lt
if-goto N_LT_2
goto N_GE_2
label N_LT_2
push argument 0
return
label N_GE_2
push argument 0
push constant 2
sub
call Main.fibonacci 1
push argument 0
push constant 1
sub
call Main.fibonacci 1
add
return
";

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(ARITHMETIC_SOURCE.len() as u64));
    group.bench_function("parse_arithmetic_source", |b| {
        b.iter(|| {
            let parser = Parser::new(black_box(ARITHMETIC_SOURCE));
            for cmd in parser.commands() {
                black_box(cmd.unwrap());
            }
        });
    });

    group.throughput(Throughput::Bytes(CALL_HEAVY_SOURCE.len() as u64));
    group.bench_function("parse_call_heavy_source", |b| {
        b.iter(|| {
            let parser = Parser::new(black_box(CALL_HEAVY_SOURCE));
            for cmd in parser.commands() {
                black_box(cmd.unwrap());
            }
        });
    });

    group.finish();
}

fn bench_code_writer(c: &mut Criterion) {
    let mut group = c.benchmark_group("code_writer");

    group.bench_function("emit_call_heavy_function", |b| {
        b.iter(|| {
            let parser = Parser::new(black_box(CALL_HEAVY_SOURCE));
            let mut writer = CodeWriter::new(Vec::new());
            writer.set_module("Main");
            for cmd in parser.commands() {
                let (cmd, line) = cmd.unwrap();
                writer.write_command(&cmd, line).unwrap();
            }
            black_box(writer.finish().unwrap());
        });
    });

    group.bench_function("emit_bootstrap", |b| {
        b.iter(|| {
            let mut writer = CodeWriter::new(Vec::new());
            writer.write_bootstrap().unwrap();
            black_box(writer.finish().unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parser, bench_code_writer);
criterion_main!(benches);
