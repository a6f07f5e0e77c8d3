use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mindflow_renderer::config::Config;
use mindflow_renderer::export::export_svg;
use mindflow_renderer::ir::{DiagramKind, Edge, GraphDocument, Node, ShapeKind};
use mindflow_renderer::layout::{compute_layout, layout_document, resolve_positions};
use mindflow_renderer::render::render_svg;
use mindflow_renderer::viewport::{SurfaceSize, ViewportState};
use std::hint::black_box;

const SHAPES: [ShapeKind; 4] = [
    ShapeKind::Box,
    ShapeKind::Ellipse,
    ShapeKind::Diamond,
    ShapeKind::Circle,
];

/// Root with `topics` children, each with `leaves` children. Nothing is
/// positioned, so every run goes through the fallback layout.
fn mindmap_source(topics: usize, leaves: usize) -> GraphDocument {
    let mut doc = GraphDocument::new("bench", DiagramKind::Mindmap, "Bench");
    doc.nodes.push(Node::new("central", "Benchmark root topic", ShapeKind::Circle));
    for t in 0..topics {
        let topic = format!("t{t}");
        doc.nodes.push(
            Node::new(&topic, &format!("Topic {t} with a label long enough to wrap"), SHAPES[t % 4])
                .with_level(1),
        );
        doc.edges.push(Edge::new("central", &topic));
        for l in 0..leaves {
            let leaf = format!("t{t}l{l}");
            doc.nodes.push(
                Node::new(&leaf, &format!("Leaf {l}\nsecond line"), SHAPES[(t + l) % 4]).with_level(2),
            );
            doc.edges.push(Edge::new(&topic, &leaf));
        }
    }
    doc
}

fn flowchart_source(steps: usize) -> GraphDocument {
    let mut doc = GraphDocument::new("bench", DiagramKind::Flowchart, "Bench");
    for i in 0..steps {
        let shape = if i % 3 == 2 { ShapeKind::Diamond } else { ShapeKind::Box };
        doc.nodes.push(
            Node::new(&format!("n{i}"), &format!("Step {i}: do the next thing"), shape)
                .at(900.0, 100.0 + i as f32 * 160.0),
        );
        if i > 0 {
            let edge = Edge::new(&format!("n{}", i - 1), &format!("n{i}"));
            doc.edges.push(if i % 3 == 0 { edge.with_label("Yes") } else { edge });
        }
    }
    doc
}

fn cases() -> Vec<(&'static str, GraphDocument)> {
    vec![
        ("mindmap_small", mindmap_source(4, 3)),
        ("mindmap_medium", mindmap_source(8, 6)),
        ("mindmap_large", mindmap_source(16, 12)),
        ("flowchart_small", flowchart_source(8)),
        ("flowchart_large", flowchart_source(60)),
    ]
}

fn bench_positions(c: &mut Criterion) {
    let mut group = c.benchmark_group("positions");
    let config = Config::default();
    for (name, doc) in cases() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &doc, |b, doc| {
            b.iter(|| {
                let resolved = resolve_positions(black_box(doc), &config.layout);
                black_box(resolved.positions.len());
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = Config::default();
    for (name, doc) in cases() {
        let positions = resolve_positions(&doc, &config.layout).positions;
        group.bench_with_input(BenchmarkId::from_parameter(name), &doc, |b, doc| {
            b.iter(|| {
                let layout = compute_layout(black_box(doc), &positions, &config.theme, &config.layout);
                black_box(layout.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let config = Config::default();
    let viewport = ViewportState::new(150.0, 50.0, 0.5).expect("finite viewport");
    let surface = SurfaceSize::new(1200.0, 800.0);
    for (name, doc) in cases() {
        let layout = layout_document(&doc, &config.theme, &config.layout);
        group.bench_with_input(BenchmarkId::new("live", name), &layout, |b, layout| {
            b.iter(|| {
                let svg = render_svg(black_box(layout), &viewport, surface, &config);
                black_box(svg.len());
            });
        });
        group.bench_with_input(BenchmarkId::new("export_svg", name), &layout, |b, layout| {
            b.iter(|| {
                let svg = export_svg(black_box(layout), &config);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

#[cfg(feature = "png")]
fn bench_export_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("export_png");
    group.sample_size(10);
    let mut config = Config::default();
    config.render.system_fonts = false;
    let doc = flowchart_source(8);
    let layout = layout_document(&doc, &config.theme, &config.layout);
    group.bench_function("flowchart_small", |b| {
        b.iter(|| {
            let png = mindflow_renderer::export::export_png(black_box(&layout), &config)
                .expect("export failed");
            black_box(png.len());
        });
    });
    group.finish();
}

#[cfg(not(feature = "png"))]
fn bench_export_png(_c: &mut Criterion) {}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_positions, bench_layout, bench_render, bench_export_png
);
criterion_main!(benches);
