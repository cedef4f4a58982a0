use criterion::{criterion_group, criterion_main, Criterion};
use sqdet::lowlevel::{extract_fields, nms_keep_mask, DefaultActivation, FieldLayout};
use sqdet::{AnchorTable, BoundingBox, Detector, DetectorConfig, PredictionView, TensorShape};
use std::hint::black_box;

// KITTI-sized SqueezeDet output grid
const GRID_H: usize = 22;
const GRID_W: usize = 76;
const PER_CELL: usize = 9;
const CLASSES: usize = 3;
const IMAGE_W: u32 = 1248;
const IMAGE_H: u32 = 384;

const ANCHOR_SHAPES: [(f32, f32); PER_CELL] = [
    (36.0, 37.0),
    (366.0, 174.0),
    (115.0, 59.0),
    (162.0, 87.0),
    (38.0, 90.0),
    (258.0, 173.0),
    (224.0, 108.0),
    (78.0, 170.0),
    (72.0, 43.0),
];

fn make_predictions(batch: usize) -> Vec<f32> {
    let cell_len = PER_CELL * (CLASSES + 5);
    let total = batch * GRID_H * GRID_W * cell_len;
    (0..total)
        .map(|i| {
            let v = ((i * 13) ^ (i / 5 * 7) ^ (i >> 3)) % 113;
            (v as f32 - 56.0) / 14.0
        })
        .collect()
}

fn make_config() -> DetectorConfig {
    let anchors = AnchorTable::from_grid(GRID_W, GRID_H, IMAGE_W, IMAGE_H, &ANCHOR_SHAPES).unwrap();
    DetectorConfig::new(CLASSES, PER_CELL, GRID_H, GRID_W, anchors, IMAGE_W, IMAGE_H)
}

fn bench_decode(c: &mut Criterion) {
    let cell_len = PER_CELL * (CLASSES + 5);
    let single = make_predictions(1);
    let single_view =
        PredictionView::from_slice(&single, TensorShape::new(1, GRID_H, GRID_W, cell_len)).unwrap();
    let batch = make_predictions(8);
    let batch_view =
        PredictionView::from_slice(&batch, TensorShape::new(8, GRID_H, GRID_W, cell_len)).unwrap();

    let detector = Detector::new(make_config()).unwrap();
    c.bench_function("decode_kitti_single", |b| {
        b.iter(|| detector.decode(black_box(single_view)).unwrap())
    });
    c.bench_function("decode_kitti_batch8", |b| {
        b.iter(|| detector.decode(black_box(batch_view)).unwrap())
    });

    #[cfg(feature = "rayon")]
    {
        let parallel = Detector::new(make_config()).unwrap().with_parallel(true);
        c.bench_function("decode_kitti_batch8_par", |b| {
            b.iter(|| parallel.decode(black_box(batch_view)).unwrap())
        });
    }

    let layout = detector.layout();
    c.bench_function("extract_fields_kitti", |b| {
        b.iter(|| extract_fields::<DefaultActivation>(black_box(single_view), &layout).unwrap())
    });
}

fn bench_nms(c: &mut Criterion) {
    let boxes: Vec<BoundingBox> = (0..256)
        .map(|i| {
            let f = i as f32;
            BoundingBox::new(
                (f * 7.3) % 600.0,
                (f * 3.1) % 300.0,
                30.0 + f % 20.0,
                24.0 + f % 9.0,
            )
        })
        .collect();
    c.bench_function("nms_keep_mask_256", |b| {
        b.iter(|| nms_keep_mask(black_box(&boxes), 0.4))
    });
}

criterion_group!(benches, bench_decode, bench_nms);
criterion_main!(benches);
