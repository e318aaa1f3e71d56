use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use textcoding::compression::{
    analyze, arithmetic, huffman_code, lz78, lzw, CodewordSet, FrequencyTable, TieBreak,
};

fn sample_text(len: usize) -> String {
    let words = ["TO", "BE", "OR", "NOT", "THE", "QUESTION", "WHETHER"];
    let mut text = String::with_capacity(len + 8);
    let mut i = 0;
    while text.len() < len {
        text.push_str(words[(i * 7 + i / 3) % words.len()]);
        text.push(' ');
        i += 1;
    }
    text.truncate(len);
    text
}

fn bench_huffman(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman");
    let text = sample_text(4096);
    let freq = FrequencyTable::from_text(&text).unwrap();

    for policy in [TieBreak::Classic, TieBreak::MinimizeReorder] {
        group.bench_with_input(BenchmarkId::new("build", policy), &freq, |b, freq| {
            b.iter(|| huffman_code(black_box(freq), policy).unwrap())
        });
    }

    let table = huffman_code(&freq, TieBreak::Classic).unwrap().code_table();
    group.bench_function("encode", |b| {
        b.iter(|| table.encode(black_box(&text)).unwrap())
    });
    group.finish();
}

fn bench_dictionary_coders(c: &mut Criterion) {
    let mut group = c.benchmark_group("dictionary");
    let alphabet = lzw::Alphabet::classic();

    for size in [256, 4096] {
        let text = sample_text(size);

        group.bench_with_input(BenchmarkId::new("lzw_compress", size), &text, |b, text| {
            b.iter(|| lzw::compress(black_box(text), &alphabet).unwrap())
        });
        let codes = lzw::compress(&text, &alphabet).unwrap();
        group.bench_with_input(BenchmarkId::new("lzw_decompress", size), &codes, |b, codes| {
            b.iter(|| lzw::decompress(black_box(codes), &alphabet).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("lz78_compress", size), &text, |b, text| {
            b.iter(|| lz78::compress(black_box(text)))
        });
        let tokens = lz78::compress(&text);
        group.bench_with_input(
            BenchmarkId::new("lz78_decompress", size),
            &tokens,
            |b, tokens| b.iter(|| lz78::decompress(black_box(tokens)).unwrap()),
        );
    }
    group.finish();
}

fn bench_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic");
    let table: textcoding::compression::ProbabilityTable =
        "A:0.2,B:0.3,C:0.5".parse().unwrap();
    let message = "CABBACCBAC";
    let value = arithmetic::encode_value(message, &table).unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| arithmetic::encode(black_box(message), &table).unwrap())
    });
    group.bench_function("decode", |b| {
        b.iter(|| arithmetic::decode(black_box(value), &table, Some(message.len())).unwrap())
    });
    group.finish();
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    let prefix: CodewordSet = "0,10,110,1110,11110,11111".parse().unwrap();
    let suffix: CodewordSet = "1,011,01110,1110,10011".parse().unwrap();

    group.bench_function("prefix_code", |b| {
        b.iter(|| analyze(black_box(&prefix)).unwrap())
    });
    group.bench_function("sardinas_patterson", |b| {
        b.iter(|| analyze(black_box(&suffix)).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_huffman,
    bench_dictionary_coders,
    bench_arithmetic,
    bench_analysis
);
criterion_main!(benches);
