use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use algojudge::{compare_tac, extract_features, generate_tac, Language};

const TWO_SUM_JS: &str = r#"
function twoSum(nums, target) {
  const seen = new Map();
  for (let i = 0; i < nums.length; i++) {
    const need = target - nums[i];
    if (seen.has(need)) {
      return [seen.get(need), i];
    }
    seen.set(nums[i], i);
  }
  return [];
}
"#;

const BINARY_SEARCH_PY: &str = "def search(xs, t):\n    lo = 0\n    hi = len(xs) - 1\n    while lo <= hi:\n        mid = (lo + hi) // 2\n        if xs[mid] == t:\n            return mid\n        if xs[mid] < t:\n            lo = mid + 1\n        else:\n            hi = mid - 1\n    return -1\n";

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_features");
    for (name, code, language) in [
        ("two_sum_js", TWO_SUM_JS, Language::JavaScript),
        ("binary_search_py", BINARY_SEARCH_PY, Language::Python),
    ] {
        group.throughput(Throughput::Bytes(code.len() as u64));
        group.bench_with_input(BenchmarkId::new("ast", name), &code, |b, code| {
            b.iter(|| extract_features(black_box(code), language))
        });
    }
    group.finish();
}

fn bench_tac(c: &mut Criterion) {
    let mut group = c.benchmark_group("tac");
    group.bench_function("generate", |b| {
        b.iter(|| generate_tac(black_box(BINARY_SEARCH_PY), Language::Python))
    });

    let a = generate_tac(BINARY_SEARCH_PY, Language::Python);
    let b_prog = generate_tac(TWO_SUM_JS, Language::JavaScript);
    group.bench_function("compare", |b| {
        b.iter(|| compare_tac(black_box(&a.instructions), black_box(&b_prog.instructions)))
    });
    group.finish();
}

criterion_group!(benches, bench_extract, bench_tac);
criterion_main!(benches);
