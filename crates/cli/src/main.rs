use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use geomoir::{BuildConfig, CountryIndex, CountryLocator, IndexFiles, LeafPolicy, load_countries};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Well known places checked after every build.
const SAMPLE_PLACES: &[(&str, f32, f32)] = &[
    ("Oxford", -1.25, 51.7),
    ("Pyongyang", 125.3, 39.0),
    ("Seoul", 126.98, 37.57),
    ("Madrid", -3.68, 40.04),
    ("Lima", -77.03, -12.04),
    ("Zanzibar", 39.32, -6.13),
    ("Vancouver", -123.1, 49.25),
    ("Honolulu", -157.8, 21.3),
    ("Londonderry", -7.31, 54.996),
    ("Donegal", -8.0, 54.917),
];

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build tree and label files from a GeoJSON file of country boundaries
    Build {
        geojson: PathBuf,

        /// JSON build configuration; flags given on the command line win
        #[arg(long)]
        config: Option<PathBuf>,

        /// Depth at which contested cells are resolved [default: 9]
        #[arg(long)]
        max_depth: Option<usize>,

        #[arg(long)]
        leaf_policy: Option<PolicyArg>,

        /// Feature property holding the country name [default: name]
        #[arg(long)]
        name_property: Option<String>,

        #[arg(long, default_value = geomoir::storage::DEFAULT_TREE_FILE)]
        tree_out: PathBuf,

        #[arg(long, default_value = geomoir::storage::DEFAULT_LABELS_FILE)]
        labels_out: PathBuf,
    },
    /// Print the country at a longitude/latitude
    Query {
        #[arg(long, default_value = geomoir::storage::DEFAULT_TREE_FILE)]
        tree: PathBuf,

        #[arg(long, default_value = geomoir::storage::DEFAULT_LABELS_FILE)]
        labels: PathBuf,

        #[arg(allow_negative_numbers = true)]
        lon: f32,

        #[arg(allow_negative_numbers = true)]
        lat: f32,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    Intersecting,
    Covering,
}

impl From<PolicyArg> for LeafPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Intersecting => LeafPolicy::Intersecting,
            PolicyArg::Covering => LeafPolicy::Covering,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geomoir=info,geomoir_cli=info,info".into()),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Build {
            geojson,
            config,
            max_depth,
            leaf_policy,
            name_property,
            tree_out,
            labels_out,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(max_depth) = max_depth {
                config.max_depth = max_depth;
            }
            if let Some(policy) = leaf_policy {
                config.leaf_policy = policy.into();
            }
            if let Some(property) = name_property {
                config.name_property = property;
            }
            if let Err(e) = config.validate() {
                bail!("Invalid build configuration: {}", e);
            }

            build(&geojson, &config, &IndexFiles::new(tree_out, labels_out))
        }
        Command::Query {
            tree,
            labels,
            lon,
            lat,
        } => {
            let locator = IndexFiles::new(&tree, &labels)
                .load()
                .with_context(|| format!("Failed to load {}", tree.display()))?;
            match locator.locate_lon_lat(lon, lat)? {
                Some(name) => println!("{}", name),
                None => println!("(none)"),
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BuildConfig> {
    let Some(path) = path else {
        return Ok(BuildConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    BuildConfig::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn build(geojson: &Path, config: &BuildConfig, files: &IndexFiles) -> anyhow::Result<()> {
    info!("Reading countries from {}", geojson.display());
    let features = load_countries(geojson, &config.name_property)
        .with_context(|| format!("Failed to load {}", geojson.display()))?;

    let index = CountryIndex::new(features);
    info!(
        "Building tree over {} features, max depth {}, {:?} policy",
        index.len(),
        config.max_depth,
        config.leaf_policy
    );

    let output = index.build_tree(config)?;
    let tree_stats = output.tree.stats();
    info!(
        "Built {} leaves ({} forced) and {} internal nodes, depth {}, {} countries",
        tree_stats.leaves,
        output.stats.forced_leaves,
        tree_stats.internal_nodes,
        tree_stats.depth,
        output.labels.len() - 1
    );

    let locator = CountryLocator::new(output.tree, output.labels)?;
    check_sample_places(&locator);

    files.save(locator.tree(), locator.labels())?;
    info!(
        "Wrote {} and {}",
        files.tree_path().display(),
        files.labels_path().display()
    );
    Ok(())
}

fn check_sample_places(locator: &CountryLocator) {
    for &(place, lon, lat) in SAMPLE_PLACES {
        match locator.locate_lon_lat(lon, lat) {
            Ok(Some(country)) => info!("{} ({}, {}) -> {}", place, lon, lat, country),
            Ok(None) => info!("{} ({}, {}) -> (none)", place, lon, lat),
            Err(e) => warn!("{} ({}, {}): {}", place, lon, lat, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_args() {
        let args = Args::try_parse_from([
            "geomoir",
            "build",
            "countries.geojson",
            "--max-depth",
            "6",
            "--leaf-policy",
            "covering",
        ])
        .unwrap();

        match args.command {
            Command::Build {
                geojson,
                max_depth,
                leaf_policy,
                tree_out,
                labels_out,
                ..
            } => {
                assert_eq!(geojson, PathBuf::from("countries.geojson"));
                assert_eq!(max_depth, Some(6));
                assert!(matches!(leaf_policy, Some(PolicyArg::Covering)));
                assert_eq!(tree_out, PathBuf::from("quadtree.dat"));
                assert_eq!(labels_out, PathBuf::from("countries.dat"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_query_negative_coordinates() {
        let args = Args::try_parse_from(["geomoir", "query", "-77.03", "-12.04"]).unwrap();
        match args.command {
            Command::Query { lon, lat, tree, .. } => {
                assert_eq!(lon, -77.03);
                assert_eq!(lat, -12.04);
                assert_eq!(tree, PathBuf::from("quadtree.dat"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_build_writes_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let geojson = dir.path().join("countries.geojson");
        std::fs::write(
            &geojson,
            r#"{
              "type": "FeatureCollection",
              "features": [{
                "type": "Feature",
                "properties": { "name": "Albion" },
                "geometry": {
                  "type": "Polygon",
                  "coordinates": [[[-6.0, 50.0], [2.0, 50.0], [2.0, 56.0], [-6.0, 56.0], [-6.0, 50.0]]]
                }
              }]
            }"#,
        )
        .unwrap();

        let files = IndexFiles::in_dir(dir.path());
        build(&geojson, &BuildConfig::default().with_max_depth(5), &files).unwrap();

        let locator = files.load().unwrap();
        assert_eq!(locator.locate_lon_lat(-1.25, 51.7).unwrap(), Some("Albion"));
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("build.json");
        std::fs::write(&path, r#"{ "max_depth": 3, "leaf_policy": "covering" }"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.leaf_policy, LeafPolicy::Covering);
        assert_eq!(load_config(None).unwrap(), BuildConfig::default());
    }
}
