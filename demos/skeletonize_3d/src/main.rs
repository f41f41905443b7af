use argh::FromArgs;
use std::path::PathBuf;

use charskel::{
    image::Image,
    imgproc::{morphology, ops, threshold},
    io::functional as F,
    viz::{Figure, Panel},
};

#[derive(FromArgs)]
/// Compare skeletonize with the 3-D thinning of Lee, Kashyap and Chu on a character
struct Args {
    /// path to an input image
    #[argh(
        option,
        short = 'i',
        default = "PathBuf::from(\"CharImage/hangul_882.jpeg\")"
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
    let mut data = Image::<bool, 1>::from_size_val(gray.size(), false)?;
    threshold::binarize(&gray, &mut data, thresh)?;

    let mut skeleton = Image::<bool, 1>::from_size_val(data.size(), false)?;
    morphology::skeletonize(&data, &mut skeleton)?;

    // the mask is thinned as a volume of depth one
    let mut skeleton3d = Image::<bool, 1>::from_size_val(data.size(), false)?;
    morphology::skeletonize_3d(&data, &mut skeleton3d)?;

    log::info!(
        "otsu threshold {thresh}: skeletonize kept {} and skeletonize_3d {} of {} pixels",
        ops::count_nonzero(&skeleton),
        ops::count_nonzero(&skeleton3d),
        ops::count_nonzero(&data)
    );

    let mut figure = Figure::new("skeletonize_3d", 1, 3);
    figure.add_panel(Panel::new("original", data))?;
    figure.add_panel(Panel::new("skeletonize", skeleton))?;
    figure.add_panel(Panel::new("skeletonize_3d", skeleton3d))?;

    if let Some(output) = &args.output {
        figure.save(output, args.scale)?;
    }

    if !args.no_viewer {
        figure.show()?;
    }

    Ok(())
}
