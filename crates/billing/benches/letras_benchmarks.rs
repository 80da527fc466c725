use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use facturador_billing::{DesgloseIgv, numero_a_letras};

/// The converter runs on every keystroke of an amount field, so it should
/// stay comfortably in the sub-microsecond range across magnitudes.
fn bench_numero_a_letras(c: &mut Criterion) {
    let mut group = c.benchmark_group("numero_a_letras");
    for monto in [0.0f64, 60.50, 1500.50, 999_999.99, 2_500_000.75] {
        group.bench_with_input(BenchmarkId::from_parameter(monto), &monto, |b, &monto| {
            b.iter(|| numero_a_letras(black_box(monto)).unwrap());
        });
    }
    group.finish();
}

fn bench_desglose_igv(c: &mut Criterion) {
    c.bench_function("desglose_igv/desde_total", |b| {
        b.iter(|| DesgloseIgv::desde_total(black_box(118.0)));
    });

    let importes: Vec<f64> = (1..=50).map(|i| i as f64 * 1.37).collect();
    c.bench_function("desglose_igv/de_importes_totales_50_lineas", |b| {
        b.iter(|| DesgloseIgv::de_importes_totales(importes.iter().copied()));
    });
}

criterion_group!(benches, bench_numero_a_letras, bench_desglose_igv);
criterion_main!(benches);
