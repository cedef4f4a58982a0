use clap::Parser;
use serde::{Deserialize, Serialize};
use sqdet::{
    AnchorTable, ConfigRecord, Detection, Detections, Detector, DetectorConfig, PredictionTensor,
    PredictionView, TensorShape, DEFAULT_EXP_THRESH, DEFAULT_FINAL_THRESHOLD, DEFAULT_NMS_THRESH,
    DEFAULT_TOP_N_DETECTION,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "SqueezeDet output decoder (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectorConfigJson {
    class_count: u32,
    anchors_per_cell: u32,
    grid_height: u32,
    grid_width: u32,
    anchor_boxes: Vec<f32>,
    anchor_shapes: Vec<[f32; 2]>,
    exp_thresh: f32,
    top_n_detection: u32,
    nms_thresh: f32,
    final_threshold: f32,
    image_width: u32,
    image_height: u32,
}

impl Default for DetectorConfigJson {
    fn default() -> Self {
        Self {
            class_count: 0,
            anchors_per_cell: 0,
            grid_height: 0,
            grid_width: 0,
            anchor_boxes: Vec::new(),
            anchor_shapes: Vec::new(),
            exp_thresh: DEFAULT_EXP_THRESH,
            top_n_detection: DEFAULT_TOP_N_DETECTION as u32,
            nms_thresh: DEFAULT_NMS_THRESH,
            final_threshold: DEFAULT_FINAL_THRESHOLD,
            image_width: 0,
            image_height: 0,
        }
    }
}

impl DetectorConfigJson {
    /// Flat anchors win; otherwise the grid is generated from `anchor_shapes`.
    fn into_config(self) -> Result<DetectorConfig, Box<dyn std::error::Error>> {
        let anchor_boxes = if !self.anchor_boxes.is_empty() {
            self.anchor_boxes
        } else if !self.anchor_shapes.is_empty() {
            let shapes: Vec<(f32, f32)> = self.anchor_shapes.iter().map(|s| (s[0], s[1])).collect();
            AnchorTable::from_grid(
                self.grid_width as usize,
                self.grid_height as usize,
                self.image_width,
                self.image_height,
                &shapes,
            )?
            .to_flat()
        } else {
            return Err("detector.anchor_boxes or detector.anchor_shapes must be set".into());
        };

        let record = ConfigRecord {
            class_count: self.class_count,
            anchors_per_cell: self.anchors_per_cell,
            grid_height: self.grid_height,
            grid_width: self.grid_width,
            anchor_boxes,
            exp_thresh: self.exp_thresh,
            top_n_detection: self.top_n_detection,
            nms_thresh: self.nms_thresh,
            final_threshold: self.final_threshold,
            image_width: self.image_width,
            image_height: self.image_height,
        };
        Ok(DetectorConfig::from_record(&record)?)
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Config {
    input_path: String,
    output_path: Option<String>,
    parallel: bool,
    image_index: Option<usize>,
    detector: DetectorConfigJson,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictionsJson {
    Flat {
        shape: [usize; 4],
        data: Vec<f32>,
        #[serde(default)]
        cell_stride: Option<usize>,
    },
    Nested(Vec<Vec<Vec<Vec<f32>>>>),
}

impl PredictionsJson {
    fn into_tensor(self) -> sqdet::DecodeResult<PredictionTensor> {
        match self {
            PredictionsJson::Flat {
                shape,
                data,
                cell_stride,
            } => {
                let shape = TensorShape::new(shape[0], shape[1], shape[2], shape[3]);
                let stride = cell_stride.unwrap_or(shape.cell_len);
                PredictionTensor::with_cell_stride(data, shape, stride)
            }
            PredictionsJson::Nested(nested) => PredictionTensor::from_nested(&nested),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    class_id: usize,
    score: f32,
    /// `[cx, cy, w, h]` in pixels.
    bbox: [f32; 4],
}

impl From<Detection> for DetectionRecord {
    fn from(value: Detection) -> Self {
        Self {
            class_id: value.class_id,
            score: value.score,
            bbox: value.bbox.to_array(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ImageRecord {
    index: usize,
    detections: Vec<DetectionRecord>,
}

#[derive(Debug, Serialize)]
struct Output {
    images: Vec<ImageRecord>,
}

fn image_record(index: usize, detections: &Detections) -> ImageRecord {
    ImageRecord {
        index,
        detections: detections.iter().map(DetectionRecord::from).collect(),
    }
}

fn decode(
    detector: &Detector,
    view: PredictionView<'_>,
    image_index: Option<usize>,
) -> sqdet::DecodeResult<Vec<ImageRecord>> {
    match image_index {
        Some(index) => {
            let detections = detector.decode_image(view, index)?;
            Ok(vec![image_record(index, &detections)])
        }
        None => Ok(detector
            .decode(view)?
            .iter()
            .enumerate()
            .map(|(index, d)| image_record(index, d))
            .collect()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("sqdet=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.input_path.is_empty() {
        return Err("input_path must be set in the config".into());
    }

    let detector = Detector::new(config.detector.into_config()?)?.with_parallel(config.parallel);

    let input_text = fs::read_to_string(&config.input_path)?;
    let predictions: PredictionsJson = serde_json::from_str(&input_text)?;
    let tensor = predictions.into_tensor()?;
    tracing::info!(
        batch = tensor.shape().batch,
        grid_height = tensor.shape().grid_height,
        grid_width = tensor.shape().grid_width,
        "loaded predictions"
    );

    let images = decode(&detector, tensor.view(), config.image_index)?;
    let json = serde_json::to_string_pretty(&Output { images })?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
