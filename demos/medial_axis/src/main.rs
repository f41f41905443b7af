use argh::FromArgs;
use std::path::PathBuf;

use charskel::{
    image::Image,
    imgproc::{morphology, ops, threshold},
    io::functional as F,
    viz::{Colormap, Figure, Overlay, Panel},
};

#[derive(FromArgs)]
/// Compare the medial axis of a character with other skeletons
struct Args {
    /// path to an input image
    #[argh(
        option,
        short = 'i',
        default = "PathBuf::from(\"CharImage/hangul_32.jpeg\")"
    )]
    image_path: PathBuf,

    /// write the figure to this PNG file
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// upscaling factor of the panels (default: 8)
    #[argh(option, default = "8")]
    scale: usize,

    /// seed of the medial axis tie-break order (default: 0)
    #[argh(option, default = "0")]
    seed: u64,

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
    log::info!(
        "otsu threshold {thresh}, {} foreground pixels",
        ops::count_nonzero(&data)
    );

    // compute the medial axis and the distance transform
    let mut skel = Image::<bool, 1>::from_size_val(data.size(), false)?;
    let mut distance = Image::<f32, 1>::from_size_val(data.size(), 0.0)?;
    morphology::medial_axis(&data, &mut skel, Some(&mut distance), args.seed)?;

    // compare with the other skeletonization algorithms
    let mut skeleton = Image::<bool, 1>::from_size_val(data.size(), false)?;
    morphology::skeletonize(&data, &mut skeleton)?;

    let mut skeleton3d = Image::<bool, 1>::from_size_val(data.size(), false)?;
    morphology::skeletonize_3d(&data, &mut skeleton3d)?;

    // distance to the background for the pixels of the skeleton
    let mut dist_on_skel = Image::<f32, 1>::from_size_val(data.size(), 0.0)?;
    ops::apply_mask(&distance, &skel, &mut dist_on_skel)?;

    log::info!(
        "medial_axis: {}, skeletonize: {}, skeletonize_3d: {} pixels",
        ops::count_nonzero(&skel),
        ops::count_nonzero(&skeleton),
        ops::count_nonzero(&skeleton3d)
    );

    let mut figure = Figure::new("medial_axis", 2, 2);
    figure.add_panel(Panel::new("original", data.clone()))?;
    figure.add_panel(
        Panel::new("medial_axis", dist_on_skel)
            .with_colormap(Colormap::Magma)
            .with_overlay(Overlay::contours(&data, 0.5, [255, 255, 255])?),
    )?;
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
