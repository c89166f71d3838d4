use criterion::{Criterion, black_box, criterion_group, criterion_main};

use kioska::focus::graph::{Direction, FocusGraph, FocusableSection};
use kioska::focus::tree::{ElementTree, Scope, SectionId, TreeBuilder};
use kioska::screens::Action;

const SECTION_IDS: &[&str] = &[
    "espresso", "filter", "tea", "cold", "bakery", "sandwiches", "snacks", "seasonal",
];

/// Synthetic catalog screen far larger than anything the kiosk actually
/// mounts, to keep the per-keypress re-scan honest.
fn large_tree(items_per_section: usize) -> ElementTree {
    let mut b = TreeBuilder::new();
    for &section in SECTION_IDS {
        b.section(SectionId(section));
        for i in 0..items_per_section {
            b.item(format!("{section} item {i}"), Action::None);
        }
    }
    b.section(SectionId("actions"));
    b.item("Review order", Action::None);
    b.item("Start over", Action::None);
    b.build()
}

fn sections() -> Vec<FocusableSection> {
    SECTION_IDS
        .iter()
        .chain(std::iter::once(&"actions"))
        .map(|&id| FocusableSection {
            id: SectionId(id),
            label: format!("Section {id}"),
        })
        .collect()
}

fn bench_candidate_scan(c: &mut Criterion) {
    let tree = large_tree(50);

    c.bench_function("candidate scan (402 elements)", |b| {
        b.iter(|| black_box(&tree).candidates(Scope::Main))
    });
}

fn bench_directional_walk(c: &mut Criterion) {
    let tree = large_tree(50);
    let mut graph = FocusGraph::new();
    graph.register_sections(sections());

    c.bench_function("right-arrow walk (402 elements)", |b| {
        b.iter(|| graph.on_directional_key(black_box(&tree), Direction::Right, false))
    });
}

fn bench_section_jump(c: &mut Criterion) {
    let tree = large_tree(50);
    let mut graph = FocusGraph::new();
    graph.register_sections(sections());
    graph.on_directional_key(&tree, Direction::Right, false);

    c.bench_function("section jump (9 sections x 50 items)", |b| {
        b.iter(|| graph.on_directional_key(black_box(&tree), Direction::Down, false))
    });
}

fn bench_tree_rebuild(c: &mut Criterion) {
    c.bench_function("tree rebuild (402 elements)", |b| {
        b.iter(|| large_tree(black_box(50)))
    });
}

criterion_group!(
    benches,
    bench_candidate_scan,
    bench_directional_walk,
    bench_section_jump,
    bench_tree_rebuild,
);
criterion_main!(benches);
