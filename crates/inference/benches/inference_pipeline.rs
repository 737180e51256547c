use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use inference::backend::{BackendOptions, InferenceBackend, ModelShape, OutputVector};
use inference::{
    DetectionPipeline, InferenceEngine, InferenceError, LabelVocabulary, LoadError, PostProcessor,
    decode,
};
use preprocess::InputTensor;
use schema::RawFrame;
use std::path::Path;
use std::sync::Arc;

const NUM_CLASSES: usize = 1001;

/// Mock classifier output with `hits` classes above the default threshold
fn create_mock_output(hits: usize) -> Vec<u8> {
    let mut output: Vec<u8> = (0..NUM_CLASSES).map(|i| (i % 60) as u8).collect();
    for i in 0..hits.min(NUM_CLASSES) {
        output[(i * 37) % NUM_CLASSES] = 255 - (i % 150) as u8;
    }
    output
}

fn create_vocabulary() -> LabelVocabulary {
    LabelVocabulary::from_lines((0..NUM_CLASSES).map(|i| format!("class_{i}")))
}

struct MockBackend {
    output: Vec<u8>,
}

impl InferenceBackend for MockBackend {
    fn load_model(_: &Path, _: BackendOptions) -> Result<Self, LoadError> {
        Ok(Self {
            output: create_mock_output(5),
        })
    }

    fn declared_shape(&self) -> ModelShape {
        ModelShape::new(224, self.output.len())
    }

    fn infer(&mut self, _input: &InputTensor) -> Result<OutputVector, InferenceError> {
        Ok(OutputVector::new(self.output.clone()))
    }
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let labels = create_vocabulary();

    for hits in [0, 3, 50, 500] {
        let output = create_mock_output(hits);
        group.bench_with_input(BenchmarkId::new("top3", hits), &output, |b, output| {
            b.iter(|| decode(black_box(output), &labels, 0.3, 3));
        });
    }

    group.finish();
}

fn benchmark_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");

    let engine = InferenceEngine::from_backend(MockBackend {
        output: create_mock_output(5),
    });
    let mut pipeline = DetectionPipeline::new(
        Arc::new(engine),
        Arc::new(create_vocabulary()),
        PostProcessor::default(),
    )
    .expect("vocabulary matches mock output");

    for (width, height) in [(640, 480), (1280, 720), (1920, 1080)] {
        let frame = RawFrame::solid(width, height, [128, 64, 32]);
        group.bench_with_input(
            BenchmarkId::new("mock_model", format!("{}x{}", width, height)),
            &frame,
            |b, frame| {
                b.iter(|| pipeline.detect(black_box(frame)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_decode, benchmark_detect);
criterion_main!(benches);
