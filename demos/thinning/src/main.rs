use argh::FromArgs;
use std::path::PathBuf;

use charskel::{
    image::Image,
    imgproc::{morphology, ops, threshold},
    io::functional as F,
    viz::{Figure, Panel},
};

#[derive(FromArgs)]
/// Compare skeletonize with full and partial morphological thinning
struct Args {
    /// path to an input image
    #[argh(
        option,
        short = 'i',
        default = "PathBuf::from(\"CharImage/hangul_4.jpeg\")"
    )]
    image_path: PathBuf,

    /// write the figure to this PNG file
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// upscaling factor of the panels (default: 8)
    #[argh(option, default = "8")]
    scale: usize,

    /// iterations of the partial thinning (default: 25)
    #[argh(option, default = "25")]
    max_iter: usize,

    /// block size of the local threshold (default: 35)
    #[argh(option, default = "35")]
    block_size: usize,

    /// offset of the local threshold (default: 10)
    #[argh(option, default = "10.0")]
    offset: f32,

    /// binarize with the local threshold instead of otsu
    #[argh(switch)]
    adaptive: bool,

    /// do not spawn the rerun viewer
    #[argh(switch)]
    no_viewer: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    // read the image
    let gray = F::read_image_any_gray8(&args.image_path)?;

    // global and local thresholds
    let global_thresh = threshold::otsu_threshold_value(&gray)?;
    let mut binary_global = Image::<bool, 1>::from_size_val(gray.size(), false)?;
    threshold::binarize(&gray, &mut binary_global, global_thresh)?;

    let mut local_thresh = Image::<f32, 1>::from_size_val(gray.size(), 0.0)?;
    threshold::threshold_local(
        &gray,
        &mut local_thresh,
        args.block_size,
        args.offset,
        threshold::LocalThresholdMethod::Gaussian,
    )?;
    let mut binary_adaptive = Image::<bool, 1>::from_size_val(gray.size(), false)?;
    threshold::binarize_local(&gray, &local_thresh, &mut binary_adaptive)?;

    log::info!(
        "otsu threshold {global_thresh}: {} foreground pixels, local threshold: {}",
        ops::count_nonzero(&binary_global),
        ops::count_nonzero(&binary_adaptive)
    );

    let image = if args.adaptive {
        binary_adaptive
    } else {
        binary_global
    };

    let mut skeleton = Image::<bool, 1>::from_size_val(image.size(), false)?;
    let iterations = morphology::skeletonize(&image, &mut skeleton)?;
    log::info!("skeletonize converged after {iterations} iterations");

    let mut thinned = Image::<bool, 1>::from_size_val(image.size(), false)?;
    let iterations = morphology::thin(&image, &mut thinned, None)?;
    log::info!("thin converged after {iterations} iterations");

    let mut thinned_partial = Image::<bool, 1>::from_size_val(image.size(), false)?;
    morphology::thin(&image, &mut thinned_partial, Some(args.max_iter))?;

    let mut figure = Figure::new("thinning", 2, 2);
    figure.add_panel(Panel::new("original", image))?;
    figure.add_panel(Panel::new("skeleton", skeleton))?;
    figure.add_panel(Panel::new("thinned", thinned))?;
    figure.add_panel(Panel::new("partially thinned", thinned_partial))?;

    if let Some(output) = &args.output {
        figure.save(output, args.scale)?;
    }

    if !args.no_viewer {
        figure.show()?;
    }

    Ok(())
}
