use argh::FromArgs;
use std::path::PathBuf;

use charskel::{
    image::Image,
    imgproc::{morphology, ops, threshold},
    io::functional as F,
    viz::{Figure, Panel},
};

#[derive(FromArgs)]
/// Reduce a character to a one pixel wide skeleton
struct Args {
    /// path to an input image
    #[argh(
        option,
        short = 'i',
        default = "PathBuf::from(\"CharImage/Char_31092.jpeg\")"
    )]
    image_path: PathBuf,

    /// write the figure to this PNG file
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// upscaling factor of the panels (default: 8)
    #[argh(option, default = "8")]
    scale: usize,

    /// do not spawn the rerun viewer
    #[argh(switch)]
    no_viewer: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    // read the image
    let gray = F::read_image_any_gray8(&args.image_path)?;

    // binarize with the otsu threshold
    let thresh = threshold::otsu_threshold_value(&gray)?;
    let mut image = Image::<bool, 1>::from_size_val(gray.size(), false)?;
    threshold::binarize(&gray, &mut image, thresh)?;

    // perform skeletonization
    let mut skeleton = Image::<bool, 1>::from_size_val(image.size(), false)?;
    let iterations = morphology::skeletonize(&image, &mut skeleton)?;

    log::info!(
        "otsu threshold {thresh}: {} foreground pixels, skeleton of {} pixels after {iterations} iterations",
        ops::count_nonzero(&image),
        ops::count_nonzero(&skeleton)
    );

    let mut figure = Figure::new("skeletonize", 1, 2);
    figure.add_panel(Panel::new("original", image))?;
    figure.add_panel(Panel::new("skeleton", skeleton))?;

    if let Some(output) = &args.output {
        figure.save(output, args.scale)?;
    }

    if !args.no_viewer {
        figure.show()?;
    }

    Ok(())
}
