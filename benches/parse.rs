use cfx2::{compile, from_str, to_string, Node};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Small deterministic generator so every run sees the same document.
struct Lcg(u64);

impl Lcg {
    fn next_u32(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    fn alphanum(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| {
                let base = if self.next_u32() & 1 == 0 { b'A' } else { b'a' };
                (base + (self.next_u32() % 26) as u8) as char
            })
            .collect()
    }

    fn ascii(&mut self, len: usize) -> String {
        (0..len).map(|_| (32 + (self.next_u32() % 95) as u8) as char).collect()
    }
}

fn huge_document(nodes: usize) -> Node {
    let mut rng = Lcg(0);
    let mut doc = Node::document();
    for _ in 0..nodes {
        let child = doc.add_child(Node::new(&rng.alphanum(15)).with_text(&rng.ascii(31)));
        for _ in 0..3 {
            child
                .set_attrib(&rng.alphanum(7), Some(&rng.ascii(15)))
                .unwrap();
        }
    }
    doc
}

fn user_table(users: usize) -> String {
    let mut text = String::from("Users\n");
    for i in 0..users {
        let role = if i % 3 == 0 { "admin" } else { "user" };
        text.push_str(&format!(
            "  {role}{i}: 'User {i}' (homeDir: '/home/{role}{i}', uid: {i})\n    Settings (shell: '/bin/sh')\n"
        ));
    }
    text
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for size in [100, 1_000, 10_000].iter() {
        let text = to_string(&huge_document(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| from_str(black_box(text)).unwrap());
        });
    }
    group.finish();
}

fn benchmark_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    for size in [100, 1_000, 10_000].iter() {
        let doc = huge_document(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &doc, |b, doc| {
            b.iter(|| to_string(black_box(doc)).unwrap());
        });
    }
    group.finish();
}

fn benchmark_nested_parse(c: &mut Criterion) {
    let text = user_table(1_000);
    c.bench_function("parse_user_table", |b| {
        b.iter(|| from_str(black_box(&text)).unwrap());
    });
}

fn benchmark_queries(c: &mut Criterion) {
    let doc = from_str(&user_table(1_000)).unwrap();
    c.bench_function("query_value", |b| {
        b.iter(|| doc.query_value(black_box("Users/user998.homeDir")));
    });

    let cmd = compile("select admin*, *7").unwrap();
    let users = doc.find_child("Users").unwrap();
    c.bench_function("select", |b| {
        b.iter(|| cmd.select(black_box(users)).count());
    });
}

fn benchmark_clone_and_pack(c: &mut Criterion) {
    let doc = from_str(&user_table(1_000)).unwrap();
    c.bench_function("clone_recursive", |b| {
        b.iter(|| black_box(&doc).clone_node(true));
    });
    c.bench_function("pack", |b| {
        b.iter(|| {
            let mut copy = doc.clone_node(true);
            copy.pack().unwrap();
            copy
        });
    });
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_write,
    benchmark_nested_parse,
    benchmark_queries,
    benchmark_clone_and_pack
);
criterion_main!(benches);
