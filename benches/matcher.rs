use std::{hint::black_box, sync::Arc};

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use segdict::WordTrie;

fn sample_words(count: usize) -> Vec<String> {
    let stems = [
        "北京", "上海", "大学", "人工", "智能", "计算", "数据", "网络", "中文", "分词",
    ];
    let tails = ["", "系统", "中心", "研究", "服务", "平台"];
    let mut words = Vec::with_capacity(count);
    'outer: loop {
        for stem in &stems {
            for tail in &tails {
                words.push(format!("{stem}{tail}"));
                if words.len() == count {
                    break 'outer;
                }
            }
        }
        // Wrapped the whole grid; pad with numbered variants.
        let i = words.len();
        words.push(format!("词条{i}"));
        if words.len() == count {
            break;
        }
    }
    words
}

fn build_trie(words: &[String]) -> WordTrie {
    let mut trie = WordTrie::new();
    for word in words {
        trie.insert(word);
    }
    trie
}

fn bench_trie_build(c: &mut Criterion) {
    let words = sample_words(4096);
    let mut group = c.benchmark_group("trie_build");

    for &count in &[512usize, 4096usize] {
        let words = words.clone();
        group.bench_function(BenchmarkId::from_parameter(count), move |b| {
            b.iter_batched(
                WordTrie::new,
                |mut trie| {
                    for word in words.iter().take(count) {
                        trie.insert(word);
                    }
                    black_box(trie.len());
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_match_paths(c: &mut Criterion) {
    let words = sample_words(4096);
    let trie = Arc::new(build_trie(&words));
    let hit_text: Vec<char> = "北京大学研究服务".chars().collect();
    let miss_text: Vec<char> = "从未见过的字符串".chars().collect();
    let mut group = c.benchmark_group("trie_match");
    group.throughput(Throughput::Elements(hit_text.len() as u64));

    let exact_trie = Arc::clone(&trie);
    group.bench_function("exact_window", move |b| {
        b.iter(|| {
            black_box(exact_trie.match_range(&hit_text, 0, 2).is_match());
        })
    });

    let miss_trie = Arc::clone(&trie);
    group.bench_function("miss_window", move |b| {
        b.iter(|| {
            black_box(miss_trie.match_range(&miss_text, 0, miss_text.len()).is_unmatch());
        })
    });

    let scan_text: Vec<char> = "北京大学研究服务".chars().collect();
    group.bench_function("chained_advance", move |b| {
        b.iter(|| {
            let mut hit = trie.match_range(&scan_text, 0, 1);
            for i in 1..scan_text.len() {
                hit = hit.advance(&scan_text, i);
            }
            black_box(hit.is_match());
        })
    });

    group.finish();
}

criterion_group!(benches, bench_trie_build, bench_match_paths);
criterion_main!(benches);
