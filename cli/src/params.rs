use std::path::PathBuf;

use anyhow::Context;
use clap::{crate_version, Arg, ArgMatches, Command};
use imagerec_core::features::PixelLayout;
use imagerec_engine::{ModelFormat, OutputSelection, TractLoader};

pub const DEFAULT_MODEL: &str = "resources/models/resnet18.onnx";
pub const DEFAULT_LABELS: &str = "resources/imagenet1000_clsid.txt";
pub const DEFAULT_IMAGES_DIR: &str = "resources/images";
pub const DEFAULT_IMAGES: [&str; 4] =
    ["timber-wolf.jpg", "snow-leopard.jpg", "cauliflower.jpg", "broccoli.jpg"];

pub fn command() -> Command<'static> {
    Command::new("imagerec")
        .version(crate_version!())
        .about("Classify images against the ImageNet classes")
        .arg(
            Arg::new("model")
                .long("model")
                .takes_value(true)
                .default_value(DEFAULT_MODEL)
                .help("Model file (ONNX) or NNEF archive/directory"),
        )
        .arg(
            Arg::new("labels")
                .long("labels")
                .takes_value(true)
                .default_value(DEFAULT_LABELS)
                .help("Label file, one class per line, optional leading identifier"),
        )
        .arg(
            Arg::new("images_dir")
                .long("images")
                .takes_value(true)
                .default_value(DEFAULT_IMAGES_DIR)
                .help("Directory the image names are resolved against"),
        )
        .arg(Arg::new("image").multiple_values(true).help("Image files to classify"))
        .arg(
            Arg::new("format")
                .long("format")
                .takes_value(true)
                .possible_values(["onnx", "nnef"])
                .help("Model format, guessed from the file name by default"),
        )
        .arg(
            Arg::new("output_node")
                .long("output-node")
                .takes_value(true)
                .help("Name of the score output (last model output by default)"),
        )
        .arg(Arg::new("width").long("width").takes_value(true).default_value("224"))
        .arg(Arg::new("height").long("height").takes_value(true).default_value("224"))
        .arg(
            Arg::new("layout")
                .long("layout")
                .takes_value(true)
                .possible_values(["bgr", "rgba"])
                .default_value("bgr")
                .help("Pixel layout handed to the feature extractor"),
        )
        .arg(
            Arg::new("top")
                .long("top")
                .takes_value(true)
                .default_value("1")
                .help("Also show the k best classes"),
        )
        .arg(
            Arg::new("background")
                .long("background")
                .help("Classify on a worker thread, streaming results back"),
        )
        .arg(Arg::new("no_optimize").long("no-optimize").help("Skip tract optimisation passes"))
        .arg(
            Arg::new("verbosity")
                .short('v')
                .multiple_occurrences(true)
                .help("Sets the level of verbosity"),
        )
}

/// Parsed command line.
#[derive(Debug, Clone)]
pub struct Parameters {
    pub model: PathBuf,
    pub labels: PathBuf,
    pub images_dir: PathBuf,
    pub images: Vec<String>,
    pub loader: TractLoader,
    pub layout: PixelLayout,
    pub top: usize,
    pub background: bool,
}

impl Parameters {
    pub fn from_clap(matches: &ArgMatches) -> anyhow::Result<Parameters> {
        let path = |name: &str| PathBuf::from(matches.value_of(name).unwrap_or_default());
        let number = |name: &str| -> anyhow::Result<usize> {
            let value = matches.value_of(name).unwrap_or_default();
            value.parse().with_context(|| format!("Invalid --{name} value {value:?}"))
        };
        let images = match matches.values_of("image") {
            Some(names) => names.map(String::from).collect(),
            None => DEFAULT_IMAGES.iter().map(|s| s.to_string()).collect(),
        };
        let format = matches.value_of("format").map(|f| f.parse::<ModelFormat>()).transpose()?;
        let output = match matches.value_of("output_node") {
            Some(name) => OutputSelection::Named(name.to_string()),
            None => OutputSelection::Last,
        };
        let loader = TractLoader {
            format,
            width: number("width")?,
            height: number("height")?,
            output,
            optimize: !matches.is_present("no_optimize"),
        };
        let layout = matches
            .value_of("layout")
            .unwrap_or_default()
            .parse::<PixelLayout>()
            .map_err(anyhow::Error::msg)?;
        let top = number("top")?;
        if top == 0 {
            anyhow::bail!("--top must be at least 1");
        }
        Ok(Parameters {
            model: path("model"),
            labels: path("labels"),
            images_dir: path("images_dir"),
            images,
            loader,
            layout,
            top,
            background: matches.is_present("background"),
        })
    }

    pub fn image_paths(&self) -> impl Iterator<Item = (&str, PathBuf)> {
        self.images.iter().map(|name| (name.as_str(), self.images_dir.join(name)))
    }
}
