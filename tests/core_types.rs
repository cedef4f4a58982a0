use sqdet::lowlevel::{extract_fields, FieldLayout, ScalarActivation};
use sqdet::{
    AnchorTable, DecodeError, Detector, DetectorConfig, ErrorKind, PredictionTensor,
    PredictionView, TensorShape,
};

#[test]
fn prediction_view_rejects_zero_dimensions() {
    let data = [0.0f32; 4];
    let err = PredictionView::from_slice(&data, TensorShape::new(1, 0, 2, 2))
        .err()
        .unwrap();
    assert_eq!(
        err,
        DecodeError::InvalidShape {
            shape: [1, 0, 2, 2],
        }
    );
    assert_eq!(err.kind(), ErrorKind::InputShape);
}

#[test]
fn prediction_view_rejects_wrong_buffer_length() {
    let data = [0.0f32; 11];
    let err = PredictionView::from_slice(&data, TensorShape::new(1, 2, 2, 3))
        .err()
        .unwrap();
    assert_eq!(
        err,
        DecodeError::BufferLength {
            expected: 12,
            got: 11,
        }
    );
}

#[test]
fn prediction_view_rejects_short_stride() {
    let data = [0.0f32; 8];
    let err = PredictionView::with_cell_stride(&data, TensorShape::new(1, 2, 2, 3), 2)
        .err()
        .unwrap();
    assert_eq!(
        err,
        DecodeError::InvalidCellStride {
            cell_len: 3,
            stride: 2,
        }
    );
}

#[test]
fn padded_cells_hide_their_padding() {
    // two cells of length 2 padded to 3
    let data = [1.0, 2.0, 99.0, 3.0, 4.0, 99.0];
    let view = PredictionView::with_cell_stride(&data, TensorShape::new(1, 1, 2, 2), 3).unwrap();
    assert_eq!(view.cell(0, 0, 1), Some(&[3.0, 4.0][..]));
    let cells: Vec<&[f32]> = view.cells(0).collect();
    assert_eq!(cells, vec![&[1.0, 2.0][..], &[3.0, 4.0][..]]);
    assert!(view.cell(1, 0, 0).is_none());
}

#[test]
fn image_view_selects_one_batch_item() {
    let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
    let view = PredictionView::from_slice(&data, TensorShape::new(2, 1, 2, 3)).unwrap();
    let second = view.image(1).unwrap();
    assert_eq!(second.batch(), 1);
    assert_eq!(second.as_slice(), &data[6..]);
    assert!(view.image(2).is_none());
}

#[test]
fn nested_input_reports_ragged_cells() {
    let nested = vec![vec![vec![vec![0.0; 6], vec![0.0; 5]]]];
    let err = PredictionTensor::from_nested(&nested).err().unwrap();
    assert_eq!(
        err,
        DecodeError::RaggedInput {
            axis: "cell",
            index: 1,
            expected: 6,
            got: 5,
        }
    );
}

#[test]
fn nested_input_reports_ragged_images() {
    let full = vec![vec![vec![0.0; 2]]; 2];
    let short = vec![vec![vec![0.0; 2]]];
    let err = PredictionTensor::from_nested(&[full, short]).err().unwrap();
    assert_eq!(
        err,
        DecodeError::RaggedInput {
            axis: "image",
            index: 1,
            expected: 2,
            got: 1,
        }
    );
}

#[test]
fn nested_input_reports_ragged_rows() {
    // second image, second row: flattened row index 1 * 2 + 1
    let full = vec![vec![vec![0.0; 2]; 2]; 2];
    let ragged = vec![vec![vec![0.0; 2]; 2], vec![vec![0.0; 2]]];
    let err = PredictionTensor::from_nested(&[full, ragged]).err().unwrap();
    assert_eq!(
        err,
        DecodeError::RaggedInput {
            axis: "row",
            index: 3,
            expected: 2,
            got: 1,
        }
    );
}

#[test]
fn nested_input_flattens_row_major() {
    let nested = vec![vec![
        vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        vec![vec![5.0, 6.0], vec![7.0, 8.0]],
    ]];
    let tensor = PredictionTensor::from_nested(&nested).unwrap();
    assert_eq!(tensor.shape(), TensorShape::new(1, 2, 2, 2));
    assert_eq!(tensor.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
}

#[test]
fn extraction_rejects_cell_length_mismatch() {
    let layout = FieldLayout {
        class_count: 2,
        anchors_per_cell: 1,
        grid_height: 1,
        grid_width: 1,
    };
    let data = [0.0f32; 6];
    let view = PredictionView::from_slice(&data, TensorShape::new(1, 1, 1, 6)).unwrap();
    let err = extract_fields::<ScalarActivation>(view, &layout).err().unwrap();
    assert_eq!(
        err,
        DecodeError::CellLengthMismatch {
            expected: 7,
            got: 6,
        }
    );
}

#[test]
fn detector_rejects_anchor_count_mismatch() {
    let anchors = AnchorTable::from_grid(2, 2, 32, 32, &[(8.0, 8.0)]).unwrap();
    let config = DetectorConfig::new(1, 2, 2, 2, anchors, 32, 32);
    let err = Detector::new(config).err().unwrap();
    assert_eq!(
        err,
        DecodeError::AnchorCountMismatch {
            expected: 8,
            got: 4,
        }
    );
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn detector_rejects_out_of_range_thresholds() {
    let anchors = AnchorTable::from_grid(1, 1, 16, 16, &[(8.0, 8.0)]).unwrap();
    let mut config = DetectorConfig::new(1, 1, 1, 1, anchors, 16, 16);
    config.final_threshold = 1.5;
    let err = Detector::new(config).err().unwrap();
    assert_eq!(
        err,
        DecodeError::InvalidThreshold {
            field: "final_threshold",
            value: 1.5,
        }
    );
}

#[test]
fn anchor_table_rejects_empty_input() {
    let err = AnchorTable::from_flat(&[]).err().unwrap();
    assert_eq!(
        err,
        DecodeError::ZeroField {
            field: "anchor_boxes",
        }
    );
}
