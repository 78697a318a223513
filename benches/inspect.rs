use criterion::{criterion_group, criterion_main, Criterion};
use piece_inspect::{
    correspond, Calibration, Comparator, CornerMap, PixelPoint, Sample, SampleBuilder, Template,
    TrainConfig, TrainingRun,
};
use rust_decimal::Decimal;
use std::hint::black_box;

/// A 600x400 piece with a grid of `rows * cols` features, optionally turned
/// a quarter clockwise.
fn make_piece(rows: i64, cols: i64, jitter: i64, turned: bool) -> Sample {
    let place = |p: PixelPoint| {
        if turned {
            PixelPoint::new(400 - p.y, p.x)
        } else {
            p
        }
    };
    let (width, height) = if turned { (400, 600) } else { (600, 400) };
    let corners = CornerMap {
        top_left: PixelPoint::new(0, 0),
        top_right: PixelPoint::new(width, 0),
        bottom_right: PixelPoint::new(width, height),
        bottom_left: PixelPoint::new(0, height),
    };
    let mut builder =
        SampleBuilder::new(corners, Calibration::new(Decimal::new(2, 1), Decimal::new(4, 2)));
    for r in 0..rows {
        for c in 0..cols {
            let x = 40 + c * 520 / cols.max(1) + (r * 7) % 11 + jitter;
            let y = 30 + r * 340 / rows.max(1) + (c * 5) % 13;
            let area = 800 + ((r * 31 + c * 17) % 400) as u64;
            builder = builder.feature(place(PixelPoint::new(x, y)), area);
        }
    }
    builder.build()
}

fn make_template(rows: i64, cols: i64) -> Template {
    let samples: Vec<Sample> = (0..10)
        .map(|i| make_piece(rows, cols, i % 3, false))
        .collect();
    TrainingRun::train(TrainConfig::default(), &samples).unwrap()
}

fn bench_inspect(c: &mut Criterion) {
    for (rows, cols) in [(2, 3), (5, 8)] {
        let template = make_template(rows, cols);
        let upright = make_piece(rows, cols, 1, false);
        let turned = make_piece(rows, cols, 1, true);
        let areas = rows * cols;

        c.bench_function(&format!("correspond_{areas}_areas"), |b| {
            b.iter(|| black_box(correspond(template.areas(), &turned.areas)));
        });

        let comparator = Comparator::default();
        c.bench_function(&format!("evaluate_{areas}_areas_upright"), |b| {
            b.iter(|| black_box(comparator.evaluate(&upright, &template)));
        });
        c.bench_function(&format!("evaluate_{areas}_areas_turned"), |b| {
            b.iter(|| black_box(comparator.evaluate(&turned, &template)));
        });
    }

    let samples: Vec<Sample> = (0..10).map(|i| make_piece(4, 4, i % 3, false)).collect();
    c.bench_function("train_16_areas", |b| {
        b.iter(|| black_box(TrainingRun::train(TrainConfig::default(), &samples).unwrap()));
    });
}

criterion_group!(benches, bench_inspect);
criterion_main!(benches);
