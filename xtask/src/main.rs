use anyhow::{anyhow, bail, Context, Result};
use imconv::kernel::KernelLifecycle;
use imconv::{
    convolve_ft, general_convolution, BoundaryCondition, ConvolveND, FilterSymmetry, Image,
    OneDimensionalFilter, Representation, Sample, SampleVisitor, SeparableConvolutionConfig,
    SeparableConvolutionKernel,
};
use ndarray::{ArrayD, ArrayViewD, IxDyn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const MEAN: f64 = 9563.0;
const NOISE_SIGMA: f64 = 500.0;
const SHAPE: [usize; 3] = [80, 6, 5];
const ITERS: usize = 20;
const TOLERANCE: f64 = 0.05;

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ConsistencyRow {
    case_id: String,
    max_abs: f64,
    rmse: f64,
    relative_mean_difference: f64,
    within_tolerance: bool,
    candidate_ns: f64,
    reference_ns: f64,
    speedup: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConsistencyBundle {
    generated_epoch_seconds: u64,
    shape: Vec<usize>,
    mean: f64,
    noise_sigma: f64,
    seed: u64,
    rows: Vec<ConsistencyRow>,
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("consistency") => {
            let seed = match args.next() {
                Some(s) => s.parse().with_context(|| format!("parsing seed `{s}`"))?,
                None => 0,
            };
            run_consistency(seed)
        }
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- consistency [seed]");
            Ok(())
        }
    }
}

fn run_consistency(seed: u64) -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/consistency/{ts}"));
    fs::create_dir_all(&out_dir).context("creating consistency output directory")?;

    let image = noisy_image(seed);
    let half = sevenths(&[1., 2., 3., 4., 5., 6., 7.]);
    let mut rows = Vec::new();

    // Compact symmetric filters against their explicit form.
    let cases = [
        (
            "even_vs_general",
            FilterSymmetry::Even,
            sevenths(&[1., 2., 3., 4., 5., 6., 7., 6., 5., 4., 3., 2., 1.]),
        ),
        (
            "odd_vs_general",
            FilterSymmetry::Odd,
            sevenths(&[1., 2., 3., 4., 5., 6., 7., -6., -5., -4., -3., -2., -1.]),
        ),
        (
            "d_even_vs_general",
            FilterSymmetry::DEven,
            sevenths(&[1., 2., 3., 4., 5., 6., 7., 7., 6., 5., 4., 3., 2., 1.]),
        ),
        (
            "d_odd_vs_general",
            FilterSymmetry::DOdd,
            sevenths(&[1., 2., 3., 4., 5., 6., 7., -7., -6., -5., -4., -3., -2., -1.]),
        ),
    ];
    for (case_id, symmetry, full) in cases {
        let compact = first_axis_kernel(
            OneDimensionalFilter::new(half.clone()).with_symmetry(symmetry),
            BoundaryCondition::Periodic,
        )?;
        let general = first_axis_kernel(
            OneDimensionalFilter::new(full),
            BoundaryCondition::Periodic,
        )?;
        let candidate = flatten(&compact.run_image(&image)?)?;
        let reference = flatten(&general.run_image(&image)?)?;
        let candidate_ns = time_ns(case_id, || compact.run_image(&image))?;
        let reference_ns = time_ns(case_id, || general.run_image(&image))?;
        rows.push(build_row(case_id, &candidate, &reference, candidate_ns, reference_ns)?);
    }

    // The d-odd filter through the other two engines.
    let d_odd = OneDimensionalFilter::new(half).with_symmetry(FilterSymmetry::DOdd);
    let separable = first_axis_kernel(d_odd.clone(), BoundaryCondition::Periodic)?;
    let reference = flatten(&separable.run_image(&image)?)?;
    let reference_ns = time_ns("separable", || separable.run_image(&image))?;

    let mut impulse = ArrayD::<f64>::zeros(IxDyn(&[19, 1, 1]));
    impulse[[9, 0, 0]] = 1.0;
    let filter = first_axis_kernel(d_odd, BoundaryCondition::AddZeros)?
        .run_image(&Image::from(impulse))
        .map_err(|e| anyhow!("materializing filter: {e}"))?;

    let general = flatten(&general_convolution(&image, &filter, &[BoundaryCondition::Periodic])?)?;
    let general_ns = time_ns("general", || {
        general_convolution(&image, &filter, &[BoundaryCondition::Periodic])
    })?;
    rows.push(build_row(
        "general_vs_separable",
        &general,
        &reference,
        general_ns,
        reference_ns,
    )?);

    let spatial = Representation::Spatial;
    let fourier = flatten(&convolve_ft(&image, &filter, spatial, spatial, spatial)?)?;
    let fourier_ns = time_ns("fourier", || {
        convolve_ft(&image, &filter, spatial, spatial, spatial)
    })?;
    rows.push(build_row(
        "fourier_vs_separable",
        &fourier,
        &reference,
        fourier_ns,
        reference_ns,
    )?);

    let bundle = ConsistencyBundle {
        generated_epoch_seconds: ts,
        shape: SHAPE.to_vec(),
        mean: MEAN,
        noise_sigma: NOISE_SIGMA,
        seed,
        rows,
    };
    let json_path = out_dir.join("consistency.json");
    let json = serde_json::to_string_pretty(&bundle).context("serializing consistency bundle")?;
    fs::write(&json_path, json).with_context(|| format!("writing {}", json_path.display()))?;
    let csv_path = out_dir.join("consistency.csv");
    write_summary_csv(&csv_path, &bundle.rows)?;

    for row in &bundle.rows {
        println!(
            "{:<22} max_abs={:.3e} rel_mean_diff={:.3e} speedup={:.2} ok={}",
            row.case_id,
            row.max_abs,
            row.relative_mean_difference,
            row.speedup,
            row.within_tolerance
        );
    }
    println!("wrote {} and {}", json_path.display(), csv_path.display());
    Ok(())
}

/// `u16` image around `MEAN` with uniform noise of standard deviation `NOISE_SIGMA`.
fn noisy_image(seed: u64) -> Image {
    let mut rng = StdRng::seed_from_u64(seed);
    let half_width = NOISE_SIGMA * 3f64.sqrt();
    let pixels = ArrayD::from_shape_simple_fn(IxDyn(&SHAPE), || {
        (MEAN + rng.random_range(-half_width..half_width))
            .round()
            .clamp(0.0, u16::MAX as f64) as u16
    });
    Image::from(pixels)
}

fn sevenths(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v / 49.0).collect()
}

/// Separable kernel filtering along the first axis only.
fn first_axis_kernel(
    filter: OneDimensionalFilter,
    boundary: BoundaryCondition,
) -> Result<SeparableConvolutionKernel> {
    SeparableConvolutionKernel::try_new(SeparableConvolutionConfig {
        filters: vec![
            filter,
            OneDimensionalFilter::default(),
            OneDimensionalFilter::default(),
        ],
        boundary: vec![boundary],
        process: Vec::new(),
    })
    .map_err(|e| anyhow!("separable kernel config: {e}"))
}

struct RealValues;

impl SampleVisitor for RealValues {
    type Output = Option<Vec<f64>>;

    fn visit<T: Sample>(self, pixels: ArrayViewD<'_, T>) -> Option<Vec<f64>> {
        pixels.iter().map(|v| v.real_value()).collect()
    }
}

fn flatten(image: &Image) -> Result<Vec<f64>> {
    image
        .visit("out", RealValues)?
        .ok_or_else(|| anyhow!("expected a real-valued output, got {:?}", image.data_type()))
}

/// Average wall time of `run` in nanoseconds.
fn time_ns(label: &str, run: impl Fn() -> imconv::Result<Image>) -> Result<f64> {
    let start = Instant::now();
    for _ in 0..ITERS {
        run().map_err(|e| anyhow!("{label}: {e}"))?;
    }
    Ok(start.elapsed().as_nanos() as f64 / ITERS as f64)
}

fn build_row(
    case_id: &str,
    candidate: &[f64],
    reference: &[f64],
    candidate_ns: f64,
    reference_ns: f64,
) -> Result<ConsistencyRow> {
    if candidate.len() != reference.len() || candidate.is_empty() {
        bail!(
            "case {case_id}: outputs differ in size ({} vs {})",
            candidate.len(),
            reference.len()
        );
    }
    let n = candidate.len() as f64;
    let (sum, sum_sq, max_abs) = candidate.iter().zip(reference).fold(
        (0.0, 0.0, 0.0f64),
        |(sum, sum_sq, max_abs), (x, y)| {
            let d = x - y;
            (sum + d, sum_sq + d * d, max_abs.max(d.abs()))
        },
    );
    Ok(ConsistencyRow {
        case_id: case_id.to_string(),
        max_abs,
        rmse: (sum_sq / n).sqrt(),
        relative_mean_difference: sum / n / MEAN,
        within_tolerance: max_abs < TOLERANCE && (sum / n / MEAN).abs() < 1e-6,
        candidate_ns,
        reference_ns,
        speedup: reference_ns / candidate_ns,
    })
}

fn write_summary_csv(path: &Path, rows: &[ConsistencyRow]) -> Result<()> {
    let mut out = String::from(
        "case_id,max_abs,rmse,relative_mean_difference,within_tolerance,candidate_ns,reference_ns,speedup\n",
    );
    for row in rows {
        out.push_str(&format!(
            "{},{:.6e},{:.6e},{:.6e},{},{:.0},{:.0},{:.3}\n",
            row.case_id,
            row.max_abs,
            row.rmse,
            row.relative_mean_difference,
            row.within_tolerance,
            row.candidate_ns,
            row.reference_ns,
            row.speedup
        ));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}
